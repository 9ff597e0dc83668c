//! Tipos de evento de una corrida de secuencia y estructura `SequenceEvent`.
//!
//! Rol:
//! - Cada corrida del intérprete puede emitir eventos (vía `EventRecorder`)
//!   a un store append-only indexado por `run_id`.
//! - Los eventos permiten reconstruir qué statements se ejecutaron, cuáles
//!   fallaron y qué chequeos no coincidieron, sin acceder al intérprete.
//! - `SequenceEventKind` es el contrato observable del motor.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SequenceEventKind {
    /// Primer evento de un `run_id`.
    SequenceStarted {
        sequence: String,
        implementation: String,
        statement_count: usize,
    },
    StatementStarted { index: usize, operation: String },
    /// El statement produjo un valor (o void).
    StatementFinished {
        index: usize,
        output: serde_json::Value,
        elapsed_ns: u64,
    },
    /// El artifact falló (falla lanzada o panic).
    StatementFailed { index: usize, error: String },
    /// El motor no pudo preparar la invocación: receptor, binding,
    /// conversión, evaluación o presupuesto. El artifact no se ejecutó.
    StatementRejected { index: usize, error: String },
    /// El valor obtenido no coincide con el oráculo. No detiene la corrida
    /// salvo con `CheckPolicy::AbortOnMismatch`.
    CheckFailed {
        index: usize,
        expected: serde_json::Value,
        actual: serde_json::Value,
    },
    /// Cierre exitoso; `executed` = statements ejecutados.
    SequenceCompleted { executed: usize, total_elapsed_ns: u64 },
    SequenceFailed { statement: usize, cause: String },
}

impl SequenceEventKind {
    /// Letra corta para trazas compactas (`S`, `s`, `f`, `x`, `r`, `!`, `C`, `F`).
    pub fn code(&self) -> &'static str {
        match self {
            SequenceEventKind::SequenceStarted { .. } => "S",
            SequenceEventKind::StatementStarted { .. } => "s",
            SequenceEventKind::StatementFinished { .. } => "f",
            SequenceEventKind::StatementFailed { .. } => "x",
            SequenceEventKind::StatementRejected { .. } => "r",
            SequenceEventKind::CheckFailed { .. } => "!",
            SequenceEventKind::SequenceCompleted { .. } => "C",
            SequenceEventKind::SequenceFailed { .. } => "F",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceEvent {
    pub seq: u64, // orden de append dentro del run
    pub run_id: Uuid,
    pub kind: SequenceEventKind,
    pub ts: DateTime<Utc>,
}
