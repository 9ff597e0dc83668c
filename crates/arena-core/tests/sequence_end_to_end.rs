//! Tests de integración: LQL + hoja de estímulos → adaptación → ejecución
//! instrumentada → minimización y reporte.

use std::sync::{Arc, Mutex};

use arena_adapters::find;
use arena_core::adaptation::{AdaptationStrategy, AdaptedImplementation, PassThrough};
use arena_core::engine::SequenceInterpreter;
use arena_core::errors::ListenerFailure;
use arena_core::eval::LiteralEvaluator;
use arena_core::instrument::{CompositeVisitor, EventRecorder, SequenceContext, SequenceVisitor, TimingCollector};
use arena_core::lql::parse_interfaces;
use arena_core::model::{InterfaceSpecification, Value};
use arena_core::oracle::CheckOutcome;
use arena_core::sequence::{minimize, RecordReport, SequenceBuilder, SequenceSpecification, Statement};
use arena_core::sheet::SheetParser;

const LQL: &str = "Stack {\n    push(java.lang.String)->java.lang.String\n    size()->int\n}";

const SHEETS: &str = r#"{"sheet": "Sheet 1", "header": "Row 1", "cells": {"A1": {}, "B1": "create", "C1": "Stack"}}
{"sheet": "Sheet 1", "header": "Row 2", "cells": {"A2": {}, "B2": "create", "C2": "java.lang.String", "D2": "'Hello World!'"}}
{"sheet": "Sheet 1", "header": "Row 3", "cells": {"A3": "A2", "B3": "push", "C3": "A1", "D3": "A2"}}
{"sheet": "Sheet 1", "header": "Row 4", "cells": {"A4": 1, "B4": "size", "C4": "A1"}}
{"sheet": "Sheet 2", "header": "Row 1", "cells": {"A1": {}, "B1": "create", "C1": "Stack"}}
{"sheet": "Sheet 2", "header": "Row 2", "cells": {"A2": "'a'", "B2": "push", "C2": "A1", "D2": "'a'"}}
{"sheet": "Sheet 2", "header": "Row 3", "cells": {"A3": 1, "B3": "size", "C3": "A1"}}
{"sheet": "Sheet 3", "header": "Row 1", "cells": {"A1": {}, "B1": "create", "C1": "Stack"}}
{"sheet": "Sheet 3", "header": "Row 2", "cells": {"A2": "'a'", "B2": "push", "C2": "A1", "D2": "'a'"}}
{"sheet": "Sheet 3", "header": "Row 3", "cells": {"A3": 1, "B3": "size", "C3": "A1"}}"#;

fn stack_interface() -> Arc<InterfaceSpecification> {
    Arc::new(parse_interfaces(LQL).expect("lql").remove(0))
}

fn sequences(interface: &InterfaceSpecification) -> Vec<Arc<SequenceSpecification>> {
    let evaluator = LiteralEvaluator::new();
    let builder = SequenceBuilder::new(interface, &evaluator);
    let sheets = SheetParser::parse(SHEETS).expect("sheets");
    builder.build_all(&sheets)
           .into_iter()
           .map(|s| Arc::new(s.expect("sequence")))
           .collect()
}

fn adapted(interface: &Arc<InterfaceSpecification>, artifact: &str) -> Arc<AdaptedImplementation> {
    let artifact = find(artifact).expect("catalogued");
    Arc::new(PassThrough.adapt(interface, &artifact, 0).expect("adapt").remove(0))
}

#[test]
fn push_then_size_on_array_stack_yields_one() {
    let interface = stack_interface();
    let seqs = sequences(&interface);
    let implementation = adapted(&interface, "ArrayStack");

    let recorder = Arc::new(EventRecorder::new());
    let timings = Arc::new(TimingCollector::new());
    let visitors = CompositeVisitor::new().with(recorder.clone()).with(timings.clone());
    let evaluator = LiteralEvaluator::new();
    let run = SequenceInterpreter::new(&evaluator).execute_sequence(&seqs[1], &implementation, &visitors);

    assert!(run.is_completed());
    assert_eq!(run.value(2), Some(&Value::int(1)));
    assert!(run.check_failures().is_empty());
    assert_eq!(run.outcome(1).map(|o| o.check.clone()), Some(CheckOutcome::Passed));
    assert_eq!(recorder.trace(run.run_id), "SsfsfsfC");
    assert_eq!(timings.timings(run.run_id).len(), 3);
    assert_eq!(visitors.isolated_failures(), 0);
}

#[test]
fn same_as_oracle_and_external_create() {
    let interface = stack_interface();
    let seqs = sequences(&interface);
    let implementation = adapted(&interface, "ArrayStack");
    let evaluator = LiteralEvaluator::new();
    let run = SequenceInterpreter::new(&evaluator).execute_sequence(&seqs[0], &implementation, &CompositeVisitor::new());

    assert!(run.is_completed());
    assert_eq!(run.value(1).and_then(Value::as_str), Some("Hello World!"));
    assert_eq!(run.outcome(2).map(|o| o.check.clone()), Some(CheckOutcome::Passed));
    assert_eq!(run.outcome(3).map(|o| o.check.clone()), Some(CheckOutcome::Passed));

    let report = RecordReport::from_record(&arena_core::sequence::SequenceExecutionRecord::new(Some(seqs[0].clone()),
                                                                                              &implementation.identity())
                                                                                         .with_executed(run));
    assert_eq!(report.state, "completed");
    assert_eq!(report.statements[0].output, serde_json::json!("_INSTANCE_"));
    assert_eq!(report.statements[3].output, serde_json::json!(1));
}

struct Exploding;

impl SequenceVisitor for Exploding {
    fn name(&self) -> &str {
        "exploding"
    }

    fn before_sequence(&self, _ctx: &SequenceContext<'_>) -> Result<(), ListenerFailure> {
        Err(ListenerFailure::new("exploding", "before_sequence", "refused"))
    }

    fn before_statement(&self, _ctx: &SequenceContext<'_>, _index: usize, _statement: &Statement) -> Result<(), ListenerFailure> {
        panic!("listener panic")
    }
}

#[derive(Default)]
struct Seen(Mutex<Vec<usize>>);

impl SequenceVisitor for Seen {
    fn name(&self) -> &str {
        "seen"
    }

    fn before_statement(&self, _ctx: &SequenceContext<'_>, index: usize, _statement: &Statement) -> Result<(), ListenerFailure> {
        self.0.lock().expect("lock").push(index);
        Ok(())
    }
}

#[test]
fn failing_listener_is_isolated_from_run_and_other_listeners() {
    let interface = stack_interface();
    let seqs = sequences(&interface);
    let implementation = adapted(&interface, "ArrayStack");
    let seen = Arc::new(Seen::default());
    let visitors = CompositeVisitor::new().with(Arc::new(Exploding)).with(seen.clone());
    let evaluator = LiteralEvaluator::new();
    let run = SequenceInterpreter::new(&evaluator).execute_sequence(&seqs[1], &implementation, &visitors);

    assert!(run.is_completed());
    assert!(run.value(0).is_some());
    assert_eq!(*seen.0.lock().expect("lock"), vec![0, 1, 2]);
    // before_sequence + un panic por statement
    assert_eq!(visitors.isolated_failures(), 4);
}

#[test]
fn parallel_runs_then_minimize_drops_structural_duplicates() {
    let interface = stack_interface();
    let seqs = sequences(&interface);
    let implementation = adapted(&interface, "ArrayStack");
    let jobs: Vec<_> = seqs.iter().map(|s| (s.clone(), implementation.clone())).collect();
    let evaluator = LiteralEvaluator::new();
    let recorder = Arc::new(EventRecorder::new());
    let visitors = CompositeVisitor::new().with(recorder.clone());

    let records = SequenceInterpreter::new(&evaluator).execute_all(&jobs, &visitors);
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.executed.as_ref().is_some_and(|e| e.is_completed())));
    assert_eq!(recorder.store().len(), 3);

    let kept = minimize(records);
    let names: Vec<&str> = kept.iter().filter_map(|r| r.sequence.as_ref()).map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Sheet 1", "Sheet 2"]);
}

#[test]
fn sequences_behave_the_same_on_different_stacks() {
    let interface = stack_interface();
    let seqs = sequences(&interface);
    let evaluator = LiteralEvaluator::new();
    let interpreter = SequenceInterpreter::new(&evaluator);
    for artifact in ["ArrayStack", "FaultyStack"] {
        let implementation = adapted(&interface, artifact);
        let run = interpreter.execute_sequence(&seqs[0], &implementation, &CompositeVisitor::new());
        assert!(run.is_completed(), "{artifact}: {:?}", run.state);
        assert!(run.check_failures().is_empty(), "{artifact}");
    }
}
