use std::process::exit;
use std::sync::Arc;

use arena_core::adaptation::strategy_by_name;
use arena_core::constants::DEFAULT_ADAPTER_LIMIT;
use arena_core::engine::{CheckPolicy, InterpreterConfig, SequenceInterpreter};
use arena_core::eval::{ExpressionEvaluator, LiteralEvaluator, TypeResolutionContext};
use arena_core::instrument::{CompositeVisitor, LoggingVisitor};
use arena_core::lql::parse_lql;
use arena_core::model::InterfaceSpecification;
use arena_core::sequence::{oracle_report, RecordReport, SequenceBuilder, SequenceExecutionRecord, SequenceSpecification};
use arena_core::sheet::SheetParser;
use log::{error, info, warn};

const USAGE: &str = "Uso:
  arena-cli list
  arena-cli run --lql <FILE> --sheet <FILE> --artifact <NAME> [--interface <NAME>] [--strategy <pass-through|signature>]
                [--variant <N>] [--limit <N>] [--max <N>] [--abort-on-mismatch]
  arena-cli oracle --lql <FILE> --sheet <FILE> [--interface <NAME>]";

#[derive(Debug, Default)]
struct RunArgs {
    lql: Option<String>,
    sheet: Option<String>,
    artifact: Option<String>,
    interface: Option<String>,
    strategy: Option<String>,
    variant: i64,
    limit: Option<usize>,
    max: Option<usize>,
    abort_on_mismatch: bool,
}

/// Valor numérico de una opción; ausente o no numérico es un error de uso.
fn numeric<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    let text = value.ok_or_else(|| format!("{flag} requiere un valor"))?;
    text.parse().map_err(|_| format!("{flag}: valor no numérico {text:?}"))
}

fn parse_args(args: &[String]) -> Result<RunArgs, String> {
    let mut out = RunArgs::default();
    let mut i = 0;
    while i < args.len() {
        let value = args.get(i + 1).cloned();
        match args[i].as_str() {
            "--lql" => out.lql = value,
            "--sheet" => out.sheet = value,
            "--artifact" => out.artifact = value,
            "--interface" => out.interface = value,
            "--strategy" => out.strategy = value,
            "--variant" => out.variant = numeric("--variant", value)?,
            "--limit" => out.limit = Some(numeric("--limit", value)?),
            "--max" => out.max = Some(numeric("--max", value)?),
            "--abort-on-mismatch" => {
                out.abort_on_mismatch = true;
                i += 1;
                continue;
            }
            other => warn!("argumento ignorado: {other}"),
        }
        i += 2;
    }
    Ok(out)
}

fn read(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[arena] no se pudo leer {path}: {e}");
            exit(3);
        }
    }
}

/// Interfaz elegida (por nombre o la primera del documento).
fn load_interface(path: &str, name: Option<&str>) -> InterfaceSpecification {
    let doc = match parse_lql(&read(path)) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("[arena] {path}: {e}");
            exit(3);
        }
    };
    if !doc.filters.is_empty() {
        info!("filtros ignorados: {:?}", doc.filters);
    }
    let found = match name {
        Some(n) => doc.interface(n).cloned(),
        None => doc.interfaces.first().cloned(),
    };
    found.unwrap_or_else(|| {
             eprintln!("[arena] interfaz no encontrada en {path}");
             exit(3);
         })
}

/// Secuencias construidas; las hojas inválidas se reportan y se saltean.
fn load_sequences(path: &str, interface: &InterfaceSpecification, evaluator: &dyn ExpressionEvaluator) -> Vec<Arc<SequenceSpecification>> {
    let builder = SequenceBuilder::new(interface, evaluator);
    let mut out = Vec::new();
    for parsed in SheetParser::parse_each(&read(path)) {
        match parsed.map_err(|e| e.to_string()).and_then(|sheet| builder.build(&sheet).map_err(|e| e.to_string())) {
            Ok(seq) => out.push(Arc::new(seq)),
            Err(e) => error!("hoja descartada: {e}"),
        }
    }
    out
}

fn cmd_list() {
    for artifact in arena_adapters::catalog() {
        println!("{}", arena_adapters::describe(artifact.as_ref()));
    }
}

fn cmd_oracle(args: &RunArgs) {
    let (Some(lql), Some(sheet)) = (args.lql.as_deref(), args.sheet.as_deref()) else {
        eprintln!("{USAGE}");
        exit(2);
    };
    let interface = load_interface(lql, args.interface.as_deref());
    let evaluator = LiteralEvaluator::new();
    for seq in load_sequences(sheet, &interface, &evaluator) {
        println!("{}", serde_json::json!({ "sequence": seq.name, "oracle": oracle_report(&seq) }));
    }
}

fn cmd_run(args: &RunArgs) -> i32 {
    let (Some(lql), Some(sheet), Some(name)) = (args.lql.as_deref(), args.sheet.as_deref(), args.artifact.as_deref()) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let Some(artifact) = arena_adapters::find(name) else {
        eprintln!("[arena] artifact desconocido: {name} (ver `arena-cli list`)");
        return 4;
    };
    let interface = Arc::new(load_interface(lql, args.interface.as_deref()));

    let strategy = match strategy_by_name(args.strategy.as_deref().unwrap_or("pass-through"),
                                          args.limit.unwrap_or(DEFAULT_ADAPTER_LIMIT))
    {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[arena] {e}");
            return 2;
        }
    };
    let implementations = match strategy.adapt(&interface, &artifact, args.variant) {
        Ok(list) => list,
        Err(e) => {
            eprintln!("[arena] {} no se adapta a {}: {e}", artifact.name(), interface.name);
            return 4;
        }
    };

    let mut evaluator = LiteralEvaluator::new();
    evaluator.set_type_resolution_context(TypeResolutionContext::default().with_alias(&interface.name, artifact.name())
                                                                          .with_known(artifact.name()));
    let sequences = load_sequences(sheet, &interface, &evaluator);
    let config = InterpreterConfig { check_policy: if args.abort_on_mismatch {
                                         CheckPolicy::AbortOnMismatch
                                     } else {
                                         CheckPolicy::RecordOnly
                                     },
                                     max_statements: args.max };
    let interpreter = SequenceInterpreter::with_config(&evaluator, config);
    let visitors = CompositeVisitor::new().with(Arc::new(LoggingVisitor));

    let jobs: Vec<_> = sequences.iter()
                                .flat_map(|s| implementations.iter().map(move |i| (Arc::clone(s), Arc::new(i.clone()))))
                                .collect();
    let records: Vec<SequenceExecutionRecord> = interpreter.execute_all(&jobs, &visitors);
    let mut failing = 0usize;
    for record in &records {
        let report = RecordReport::from_record(record);
        if report.state != "completed" || report.check_failures > 0 {
            failing += 1;
        }
        println!("{}", report.to_json());
    }
    info!("{} corridas, {} con fallas", records.len(), failing);
    if failing > 0 {
        1
    } else {
        0
    }
}

fn main() {
    // Cargar .env si existe (RUST_LOG, ARENA_*)
    let _ = dotenvy::dotenv();
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(command) = args.get(1) else {
        eprintln!("{USAGE}");
        exit(2);
    };
    let rest = match parse_args(&args[2..]) {
        Ok(rest) => rest,
        Err(e) => {
            eprintln!("[arena] {e}\n{USAGE}");
            exit(2);
        }
    };
    match command.as_str() {
        "list" => cmd_list(),
        "run" => exit(cmd_run(&rest)),
        "oracle" => cmd_oracle(&rest),
        _ => {
            eprintln!("{USAGE}");
            exit(2);
        }
    }
}
