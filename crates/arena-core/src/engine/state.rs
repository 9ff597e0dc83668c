//! Estado de una corrida de secuencia.
//!
//! Las transiciones válidas son:
//! - `NotStarted` -> `Running { statement: 0 }`
//! - `Running { i }` -> `Running { i + 1 }`
//! - `Running { i }` -> `Completed` (tras el último statement)
//! - `Running { i }` -> `Failed { statement: i, .. }`
//!
//! No se permiten reversiones ni saltos de statements.

use std::fmt;

use crate::errors::InvocationFailure;
use crate::oracle::CheckFailure;

#[derive(Debug, Clone, PartialEq)]
pub enum FailureCause {
    Invocation(InvocationFailure),
    /// Sólo con `CheckPolicy::AbortOnMismatch`.
    CheckMismatch(CheckFailure),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Invocation(e) => write!(f, "{e}"),
            FailureCause::CheckMismatch(c) => write!(f, "check mismatch at {c}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    NotStarted,
    Running { statement: usize },
    Completed,
    Failed { statement: usize, cause: FailureCause },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            RunState::NotStarted => "not_started",
            RunState::Running { .. } => "running",
            RunState::Completed => "completed",
            RunState::Failed { .. } => "failed",
        }
    }

    /// Avanza al statement `next`; sólo acepta el siguiente índice.
    pub(crate) fn advance(&mut self, next: usize) -> bool {
        let ok = match self {
            RunState::NotStarted => next == 0,
            RunState::Running { statement } => next == *statement + 1,
            _ => false,
        };
        if ok {
            *self = RunState::Running { statement: next };
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_strictly_in_order() {
        let mut st = RunState::NotStarted;
        assert!(!st.advance(1));
        assert!(st.advance(0));
        assert!(st.advance(1));
        assert!(!st.advance(3));
        assert_eq!(st, RunState::Running { statement: 1 });
        st = RunState::Completed;
        assert!(!st.advance(2));
        assert!(st.is_terminal());
    }
}
