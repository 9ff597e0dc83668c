//! Ejecución por lotes: LQL + hojas + artifact → corridas acotadas en
//! tiempo → minimización → publicación.
//!
//! Cada corrida se ejecuta en `spawn_blocking` bajo `tokio::time::timeout`.
//! Un semáforo limita las corridas concurrentes a `ArenaConfig::workers`.
//! Una corrida que excede el tiempo se reporta como `timed_out`; su hilo no
//! se interrumpe y sigue hasta terminar por su cuenta.

use std::sync::Arc;

use arena_core::adaptation::{strategy_by_name, AdaptedImplementation};
use arena_core::errors::CoreEngineError;
use arena_core::engine::SequenceInterpreter;
use arena_core::eval::{ExpressionEvaluator, LiteralEvaluator, TypeResolutionContext};
use arena_core::instrument::CompositeVisitor;
use arena_core::lql::parse_lql;
use arena_core::model::{Artifact, InterfaceSpecification};
use arena_core::sequence::{minimize, RecordReport, SequenceBuilder, SequenceExecutionRecord, SequenceSpecification};
use arena_core::sheet::SheetParser;
use indexmap::IndexMap;
use log::{debug, error, info, warn};
use tokio::sync::Semaphore;

use crate::config::ArenaConfig;
use crate::errors::ArenaError;
use crate::reporting::RecordSink;

/// Estado con el que se publican las corridas que exceden el tiempo.
pub const TIMED_OUT: &str = "timed_out";

#[derive(Debug, Clone)]
pub struct BatchJob {
    pub sequence: Arc<SequenceSpecification>,
    pub implementation: Arc<AdaptedImplementation>,
}

/// Trabajos listos para ejecutar, con el evaluador ya configurado para el
/// artifact elegido.
pub struct BatchPlan {
    pub interface: Arc<InterfaceSpecification>,
    pub evaluator: Arc<dyn ExpressionEvaluator>,
    pub jobs: Vec<BatchJob>,
    /// Hojas que no pudieron parsearse o construirse.
    pub rejected: Vec<ArenaError>,
}

impl std::fmt::Debug for BatchPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchPlan")
         .field("interface", &self.interface.name)
         .field("jobs", &self.jobs.len())
         .field("rejected", &self.rejected)
         .finish()
    }
}

/// Parsea el LQL y las hojas, adapta el artifact y arma el producto
/// secuencias × implementaciones.
pub fn plan(lql: &str,
            interface: Option<&str>,
            sheets: &str,
            artifact: &Arc<dyn Artifact>,
            strategy: &str,
            variant: i64,
            config: &ArenaConfig)
            -> Result<BatchPlan, ArenaError> {
    let doc = parse_lql(lql).map_err(CoreEngineError::from)?;
    let chosen = match interface {
        Some(name) => doc.interface(name).cloned(),
        None => doc.interfaces.first().cloned(),
    };
    let interface = chosen.ok_or_else(|| ArenaError::Config(format!("interfaz no encontrada: {}", interface.unwrap_or("-"))))?;
    let interface = Arc::new(interface);

    let strategy = strategy_by_name(strategy, config.adapter_limit).map_err(CoreEngineError::from)?;
    let implementations = strategy.adapt(&interface, artifact, variant).map_err(CoreEngineError::from)?;
    info!("{} adaptado a {}: {} implementación(es)", artifact.name(), interface.name, implementations.len());

    let evaluator = LiteralEvaluator::with_context(TypeResolutionContext::default().with_alias(&interface.name, artifact.name())
                                                                                    .with_known(artifact.name()));
    let mut sequences = Vec::new();
    let mut rejected = Vec::new();
    {
        let builder = SequenceBuilder::new(&interface, &evaluator);
        for parsed in SheetParser::parse_each(sheets) {
            let built = parsed.map_err(CoreEngineError::from)
                              .and_then(|sheet| builder.build(&sheet).map_err(CoreEngineError::from));
            match built {
                Ok(seq) => sequences.push(Arc::new(seq)),
                Err(e) => {
                    warn!("hoja descartada: {e}");
                    rejected.push(ArenaError::Core(e));
                }
            }
        }
    }

    let implementations: Vec<Arc<AdaptedImplementation>> = implementations.into_iter().map(Arc::new).collect();
    let jobs = sequences.iter()
                        .flat_map(|s| {
                            implementations.iter().map(move |i| BatchJob { sequence: Arc::clone(s),
                                                                           implementation: Arc::clone(i) })
                        })
                        .collect();
    Ok(BatchPlan { interface,
                   evaluator: Arc::new(evaluator),
                   jobs,
                   rejected })
}

/// Resultado de un lote.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Registros ejecutados que sobrevivieron a la minimización, agrupados
    /// por implementación.
    pub records: Vec<SequenceExecutionRecord>,
    /// Corridas sin resultado (tiempo agotado o tarea abortada).
    pub failures: Vec<ArenaError>,
    /// Registros descartados por duplicados estructurales.
    pub duplicates: usize,
    /// Publicaciones que algún sink rechazó.
    pub publish_failures: usize,
}

impl BatchOutcome {
    /// Corridas terminadas con falla o con desvíos del oráculo.
    pub fn failing(&self) -> usize {
        self.records
            .iter()
            .filter(|r| !r.executed.as_ref().is_some_and(|e| e.is_completed() && e.check_failures().is_empty()))
            .count()
    }
}

pub struct BatchRunner {
    config: ArenaConfig,
    evaluator: Arc<dyn ExpressionEvaluator>,
    visitors: Arc<CompositeVisitor>,
    sinks: Vec<Arc<dyn RecordSink>>,
}

impl BatchRunner {
    pub fn new(config: ArenaConfig, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self { config,
               evaluator,
               visitors: Arc::new(CompositeVisitor::new()),
               sinks: Vec::new() }
    }

    pub fn with_visitors(mut self, visitors: Arc<CompositeVisitor>) -> Self {
        self.visitors = visitors;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub async fn run(&self, jobs: Vec<BatchJob>) -> Result<BatchOutcome, ArenaError> {
        let total = jobs.len();
        let semaphore = Arc::new(Semaphore::new(self.config.effective_workers()));
        let timeout = self.config.sequence_timeout();
        let timeout_ms = self.config.sequence_timeout_ms;

        let mut handles = Vec::with_capacity(total);
        for job in jobs {
            let permit = Arc::clone(&semaphore).acquire_owned()
                                               .await
                                               .map_err(|e| ArenaError::Internal(e.to_string()))?;
            let evaluator = Arc::clone(&self.evaluator);
            let visitors = Arc::clone(&self.visitors);
            let interpreter_config = self.config.interpreter_config();
            handles.push(tokio::spawn(async move {
                let sequence = Arc::clone(&job.sequence);
                let implementation = Arc::clone(&job.implementation);
                let task = tokio::task::spawn_blocking(move || {
                    SequenceInterpreter::with_config(evaluator.as_ref(), interpreter_config).execute_sequence(&sequence,
                                                                                                              &implementation,
                                                                                                              &visitors)
                });
                let result = tokio::time::timeout(timeout, task).await;
                drop(permit);
                (job, result)
            }));
        }

        let mut executed = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut unfinished = Vec::new();
        for handle in handles {
            let (job, result) = handle.await.map_err(|e| ArenaError::Internal(e.to_string()))?;
            let record = SequenceExecutionRecord::new(Some(Arc::clone(&job.sequence)), &job.implementation.identity());
            match result {
                Ok(Ok(run)) => executed.push(record.with_executed(run)),
                Ok(Err(join)) => {
                    error!("corrida abortada: {} en {}: {join}", job.sequence.name, record.implementation);
                    failures.push(ArenaError::Internal(join.to_string()));
                }
                Err(_) => {
                    warn!("tiempo agotado: {} en {} ({timeout_ms} ms)", job.sequence.name, record.implementation);
                    failures.push(ArenaError::Timeout { sequence: job.sequence.name.clone(),
                                                        implementation: record.implementation.clone(),
                                                        timeout_ms });
                    unfinished.push(record);
                }
            }
        }

        let before = executed.len();
        let records = minimize_per_implementation(executed);
        let duplicates = before - records.len();
        debug!("lote: {total} corridas, {} conservadas, {duplicates} duplicadas, {} fallidas",
               records.len(),
               failures.len());

        let mut reports: Vec<RecordReport> = records.iter().map(RecordReport::from_record).collect();
        reports.extend(unfinished.iter().map(|r| {
                                              let mut report = RecordReport::from_record(r);
                                              report.state = TIMED_OUT.to_string();
                                              report
                                          }));
        let publish_failures = self.publish(&reports).await;

        Ok(BatchOutcome { records,
                          failures,
                          duplicates,
                          publish_failures })
    }

    async fn publish(&self, reports: &[RecordReport]) -> usize {
        let mut failed = 0;
        for sink in &self.sinks {
            for report in reports {
                if let Err(e) = sink.publish(report).await {
                    error!("sink {} rechazó un reporte: {e}", sink.name());
                    failed += 1;
                }
            }
            if let Err(e) = sink.flush().await {
                error!("sink {} no pudo vaciarse: {e}", sink.name());
                failed += 1;
            }
        }
        failed
    }
}

/// Minimiza dentro de cada implementación: la misma secuencia sobre dos
/// implementaciones distintas no es un duplicado.
fn minimize_per_implementation(records: Vec<SequenceExecutionRecord>) -> Vec<SequenceExecutionRecord> {
    let mut groups: IndexMap<String, Vec<SequenceExecutionRecord>> = IndexMap::new();
    for record in records {
        groups.entry(record.implementation.clone()).or_default().push(record);
    }
    groups.into_values().flat_map(minimize).collect()
}

/// Fija el tamaño del pool global de rayon usado por
/// `SequenceInterpreter::execute_all`. Sólo tiene efecto la primera vez.
pub fn configure_parallelism(config: &ArenaConfig) {
    let threads = config.effective_workers();
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
        Ok(()) => debug!("pool de rayon con {threads} hilos"),
        Err(e) => debug!("pool de rayon ya inicializado: {e}"),
    }
}
