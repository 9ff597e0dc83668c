use uuid::Uuid;

use crate::errors::ListenerFailure;
use crate::sequence::{ExecutedInvocations, Statement, StatementOutcome};

/// Datos de la corrida visibles para los listeners.
#[derive(Debug, Clone, Copy)]
pub struct SequenceContext<'a> {
    pub run_id: Uuid,
    pub sequence: &'a str,
    /// Identidad de la implementación adaptada.
    pub implementation: &'a str,
    pub statement_count: usize,
}

/// Hooks de una corrida. Todos son opcionales; un `Err` o un panic en un
/// listener no afecta a la corrida ni a los demás listeners.
pub trait SequenceVisitor: Send + Sync {
    fn name(&self) -> &str;

    fn before_sequence(&self, _ctx: &SequenceContext<'_>) -> Result<(), ListenerFailure> {
        Ok(())
    }

    fn before_statement(&self, _ctx: &SequenceContext<'_>, _index: usize, _statement: &Statement) -> Result<(), ListenerFailure> {
        Ok(())
    }

    fn after_statement(&self,
                       _ctx: &SequenceContext<'_>,
                       _statement: &Statement,
                       _outcome: &StatementOutcome)
                       -> Result<(), ListenerFailure> {
        Ok(())
    }

    fn after_sequence(&self, _ctx: &SequenceContext<'_>, _executed: &ExecutedInvocations) -> Result<(), ListenerFailure> {
        Ok(())
    }
}
