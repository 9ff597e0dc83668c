use std::sync::Arc;

use arena_core::instrument::{CompositeVisitor, EventRecorder, LoggingVisitor, TimingCollector};
use arena_core::sequence::RecordReport;
use arena_rust::batch::configure_parallelism;
use arena_rust::{plan, ArenaError, BatchRunner, InMemorySink, JsonlFileSink, RecordSink, CONFIG};

const DEMO_LQL: &str = "Stack {
    push(java.lang.String)->java.lang.String
    size()->int
}";

const DEMO_SHEETS: &str = r#"{"sheet": "Hello", "header": "Row 1", "cells": {"A1": {}, "B1": "create", "C1": "Stack"}}
{"sheet": "Hello", "header": "Row 2", "cells": {"A2": {}, "B2": "create", "C2": "java.lang.String", "D2": "'Hello World!'"}}
{"sheet": "Hello", "header": "Row 3", "cells": {"A3": "A2", "B3": "push", "C3": "A1", "D3": "A2"}}
{"sheet": "Hello", "header": "Row 4", "cells": {"A4": 1, "B4": "size", "C4": "A1"}}
{"sheet": "Twice", "header": "Row 1", "cells": {"A1": {}, "B1": "create", "C1": "Stack"}}
{"sheet": "Twice", "header": "Row 2", "cells": {"A2": "'a'", "B2": "push", "C2": "A1", "D2": "'a'"}}
{"sheet": "Twice", "header": "Row 3", "cells": {"A3": "'b'", "B3": "push", "C3": "A1", "D3": "'b'"}}
{"sheet": "Twice", "header": "Row 4", "cells": {"A4": 2, "B4": "size", "C4": "A1"}}
{"sheet": "Twice copy", "header": "Row 1", "cells": {"A1": {}, "B1": "create", "C1": "Stack"}}
{"sheet": "Twice copy", "header": "Row 2", "cells": {"A2": "'a'", "B2": "push", "C2": "A1", "D2": "'a'"}}
{"sheet": "Twice copy", "header": "Row 3", "cells": {"A3": "'b'", "B3": "push", "C3": "A1", "D3": "'b'"}}
{"sheet": "Twice copy", "header": "Row 4", "cells": {"A4": 2, "B4": "size", "C4": "A1"}}"#;

/// Demo: la interfaz Stack contra cada stack del catálogo, con eventos,
/// tiempos y reportes publicados.
async fn run_demo() -> Result<(), ArenaError> {
    let config = CONFIG.clone();
    configure_parallelism(&config);
    println!("[demo] configuración: {}", serde_json::to_string(&config)?);

    let memory = Arc::new(InMemorySink::new());
    let recorder = Arc::new(EventRecorder::new());
    let timings = Arc::new(TimingCollector::new());
    let visitors = Arc::new(CompositeVisitor::new().with(recorder.clone())
                                                   .with(timings.clone())
                                                   .with(Arc::new(LoggingVisitor)));

    for name in ["ArrayStack", "FaultyStack"] {
        let Some(artifact) = arena_adapters::find(name) else {
            eprintln!("[demo] artifact {name} no está en el catálogo");
            continue;
        };
        let batch = plan(DEMO_LQL, None, DEMO_SHEETS, &artifact, "pass-through", 0, &config)?;
        let mut runner = BatchRunner::new(config.clone(), Arc::clone(&batch.evaluator)).with_visitors(Arc::clone(&visitors))
                                                                                        .with_sink(memory.clone());
        if let Some(path) = &config.report_path {
            runner = runner.with_sink(Arc::new(JsonlFileSink::new(path)));
        }
        let outcome = runner.run(batch.jobs).await?;
        println!("[demo] {name}: {} corridas conservadas, {} duplicadas, {} con fallas, {} sin resultado",
                 outcome.records.len(),
                 outcome.duplicates,
                 outcome.failing(),
                 outcome.failures.len());
        for record in &outcome.records {
            let report = RecordReport::from_record(record);
            if let Some(executed) = &record.executed {
                println!("[demo]   {} -> {} trace={} total_ns={}",
                         report.sequence.as_deref().unwrap_or("-"),
                         report.state,
                         recorder.trace(executed.run_id),
                         timings.total_ns(executed.run_id));
            }
        }
    }

    println!("[demo] reportes publicados en {}: {}", memory.name(), memory.len());
    println!("[demo] corridas con eventos: {}, fallas de listeners aisladas: {}",
             recorder.store().len(),
             visitors.isolated_failures());
    Ok(())
}

#[tokio::main]
async fn main() {
    arena_rust::config::init_dotenv();
    env_logger::init();

    if let Err(e) = run_demo().await {
        eprintln!("[demo] {e}");
        std::process::exit(1);
    }
}
