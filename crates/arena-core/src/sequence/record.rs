//! Resultados de ejecución: `ExecutedInvocations` por corrida y
//! `SequenceExecutionRecord` por par (secuencia, implementación).

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::specification::SequenceSpecification;
use crate::engine::RunState;
use crate::errors::InvocationFailure;
use crate::model::Value;
use crate::oracle::{CheckFailure, CheckOutcome};

/// Resultado de un statement ejecutado.
#[derive(Debug, Clone)]
pub struct StatementOutcome {
    pub index: usize,
    pub result: Result<Value, InvocationFailure>,
    /// Duración medida de la invocación, en nanosegundos.
    pub elapsed_ns: u64,
    pub check: CheckOutcome,
}

/// Log ordenado de una corrida; una entrada por statement ejecutado.
#[derive(Debug, Clone)]
pub struct ExecutedInvocations {
    pub run_id: Uuid,
    pub state: RunState,
    pub outcomes: Vec<StatementOutcome>,
    pub started_at: DateTime<Utc>,
}

impl ExecutedInvocations {
    pub(crate) fn new(run_id: Uuid) -> Self {
        Self { run_id,
               state: RunState::NotStarted,
               outcomes: Vec::new(),
               started_at: Utc::now() }
    }

    pub fn outcome(&self, index: usize) -> Option<&StatementOutcome> {
        self.outcomes.get(index)
    }

    pub fn value(&self, index: usize) -> Option<&Value> {
        self.outcome(index).and_then(|o| o.result.as_ref().ok())
    }

    pub fn check_failures(&self) -> Vec<&CheckFailure> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.check {
                CheckOutcome::Failed(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, RunState::Completed)
    }

    pub fn total_elapsed_ns(&self) -> u64 {
        self.outcomes.iter().map(|o| o.elapsed_ns).sum()
    }
}

/// Secuencia + implementación + (tras ejecutar) su log.
#[derive(Debug, Clone)]
pub struct SequenceExecutionRecord {
    /// `None` cuando el registro no tiene una secuencia asociada (p.ej. una
    /// hoja que no pudo construirse); nunca se considera duplicado.
    pub sequence: Option<Arc<SequenceSpecification>>,
    /// Identidad de la `AdaptedImplementation`.
    pub implementation: String,
    pub executed: Option<ExecutedInvocations>,
}

impl SequenceExecutionRecord {
    pub fn new(sequence: Option<Arc<SequenceSpecification>>, implementation: &str) -> Self {
        Self { sequence,
               implementation: implementation.to_string(),
               executed: None }
    }

    pub fn with_executed(mut self, executed: ExecutedInvocations) -> Self {
        self.executed = Some(executed);
        self
    }
}
