//! Listeners incluidos: registro de eventos, tiempos por statement y log.

use dashmap::DashMap;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use super::visitor::{SequenceContext, SequenceVisitor};
use crate::engine::RunState;
use crate::errors::ListenerFailure;
use crate::event::{SequenceEvent, SequenceEventKind, SharedEventStore};
use crate::oracle::CheckOutcome;
use crate::sequence::{ExecutedInvocations, Statement, StatementOutcome};

/// Traduce los hooks a `SequenceEvent`s, un stream por `run_id`.
#[derive(Debug, Default)]
pub struct EventRecorder {
    store: Arc<SharedEventStore>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: Arc<SharedEventStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<SharedEventStore> {
        self.store.clone()
    }

    pub fn events(&self, run_id: Uuid) -> Vec<SequenceEvent> {
        self.store.events(run_id)
    }

    /// Códigos de los eventos de una corrida (`"SsfC"`, ...).
    pub fn trace(&self, run_id: Uuid) -> String {
        self.events(run_id).iter().map(|e| e.kind.code()).collect()
    }
}

impl SequenceVisitor for EventRecorder {
    fn name(&self) -> &str {
        "event-recorder"
    }

    fn before_sequence(&self, ctx: &SequenceContext<'_>) -> Result<(), ListenerFailure> {
        self.store.append(ctx.run_id,
                          SequenceEventKind::SequenceStarted { sequence: ctx.sequence.to_string(),
                                                               implementation: ctx.implementation.to_string(),
                                                               statement_count: ctx.statement_count });
        Ok(())
    }

    fn before_statement(&self, ctx: &SequenceContext<'_>, index: usize, statement: &Statement) -> Result<(), ListenerFailure> {
        self.store.append(ctx.run_id,
                          SequenceEventKind::StatementStarted { index,
                                                                operation: statement.operation.clone() });
        Ok(())
    }

    fn after_statement(&self, ctx: &SequenceContext<'_>, _statement: &Statement, outcome: &StatementOutcome) -> Result<(), ListenerFailure> {
        let kind = match &outcome.result {
            Ok(v) => SequenceEventKind::StatementFinished { index: outcome.index,
                                                            output: v.to_json(),
                                                            elapsed_ns: outcome.elapsed_ns },
            Err(e) if e.is_artifact_failure() => SequenceEventKind::StatementFailed { index: outcome.index,
                                                                                     error: e.to_string() },
            Err(e) => SequenceEventKind::StatementRejected { index: outcome.index,
                                                             error: e.to_string() },
        };
        self.store.append(ctx.run_id, kind);
        if let CheckOutcome::Failed(f) = &outcome.check {
            self.store.append(ctx.run_id,
                              SequenceEventKind::CheckFailed { index: f.index,
                                                               expected: f.expected.to_json(),
                                                               actual: f.actual.to_json() });
        }
        Ok(())
    }

    fn after_sequence(&self, ctx: &SequenceContext<'_>, executed: &ExecutedInvocations) -> Result<(), ListenerFailure> {
        let kind = match &executed.state {
            RunState::Completed => SequenceEventKind::SequenceCompleted { executed: executed.outcomes.len(),
                                                                          total_elapsed_ns: executed.total_elapsed_ns() },
            RunState::Failed { statement, cause } => SequenceEventKind::SequenceFailed { statement: *statement,
                                                                                          cause: cause.to_string() },
            other => {
                return Err(ListenerFailure::new(self.name(),
                                                "after_sequence",
                                                &format!("run ended in non-terminal state {}", other.label())))
            }
        };
        self.store.append(ctx.run_id, kind);
        Ok(())
    }
}

/// Duraciones por statement, agrupadas por corrida.
#[derive(Debug, Default)]
pub struct TimingCollector {
    timings: DashMap<Uuid, Vec<(usize, u64)>>,
}

impl TimingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(índice, nanosegundos)` en orden de ejecución.
    pub fn timings(&self, run_id: Uuid) -> Vec<(usize, u64)> {
        self.timings.get(&run_id).map(|v| v.clone()).unwrap_or_default()
    }

    pub fn total_ns(&self, run_id: Uuid) -> u64 {
        self.timings(run_id).iter().map(|(_, ns)| ns).sum()
    }

    pub fn runs(&self) -> usize {
        self.timings.len()
    }
}

impl SequenceVisitor for TimingCollector {
    fn name(&self) -> &str {
        "timing-collector"
    }

    fn after_statement(&self, ctx: &SequenceContext<'_>, _statement: &Statement, outcome: &StatementOutcome) -> Result<(), ListenerFailure> {
        self.timings.entry(ctx.run_id).or_default().push((outcome.index, outcome.elapsed_ns));
        Ok(())
    }
}

/// Traza de hooks con `log::debug!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingVisitor;

impl SequenceVisitor for LoggingVisitor {
    fn name(&self) -> &str {
        "logging"
    }

    fn before_sequence(&self, ctx: &SequenceContext<'_>) -> Result<(), ListenerFailure> {
        debug!("[{}] start {} on {} ({} statements)", ctx.run_id, ctx.sequence, ctx.implementation, ctx.statement_count);
        Ok(())
    }

    fn before_statement(&self, ctx: &SequenceContext<'_>, index: usize, statement: &Statement) -> Result<(), ListenerFailure> {
        debug!("[{}] ${index} = {statement}", ctx.run_id);
        Ok(())
    }

    fn after_statement(&self, ctx: &SequenceContext<'_>, _statement: &Statement, outcome: &StatementOutcome) -> Result<(), ListenerFailure> {
        match &outcome.result {
            Ok(v) => debug!("[{}] ${} -> {} ({} ns, {})", ctx.run_id, outcome.index, v, outcome.elapsed_ns, outcome.check.label()),
            Err(e) => debug!("[{}] ${} failed: {}", ctx.run_id, outcome.index, e),
        }
        Ok(())
    }

    fn after_sequence(&self, ctx: &SequenceContext<'_>, executed: &ExecutedInvocations) -> Result<(), ListenerFailure> {
        debug!("[{}] {} {}", ctx.run_id, ctx.sequence, executed.state.label());
        Ok(())
    }
}
