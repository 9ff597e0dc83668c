//! Errores del core.
//!
//! Dos familias conviven aquí:
//! - Fallas locales de un intento (resolución, adaptación, parseo de hojas o
//!   de LQL, construcción de statements): se devuelven al caller con contexto
//!   suficiente (operación, candidatos, hoja/fila) para ser accionables.
//! - Fallas de ejecución (`InvocationFailure`, `ListenerFailure`): son datos
//!   del resultado de una corrida, no errores internos del motor.

use thiserror::Error;

use crate::model::{Fault, MemberKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionFailure {
    #[error("no {kind} matches {name}{declared}; candidates: {candidates:?}")]
    NoMatch {
        kind: MemberKind,
        name: String,
        declared: String,
        candidates: Vec<String>,
    },
    #[error("ambiguous {kind} {name}{declared}; equally specific: {tied:?}")]
    Ambiguous {
        kind: MemberKind,
        name: String,
        declared: String,
        tied: Vec<String>,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdaptationError {
    #[error("operation {operation} cannot be adapted: {source}")]
    Resolution {
        operation: String,
        #[source]
        source: ResolutionFailure,
    },
    #[error("variant {requested} out of range ({available} available)")]
    VariantOutOfRange { requested: i64, available: usize },
    #[error("no candidate member for operation {operation}")]
    NoCandidates { operation: String },
    #[error("unknown adaptation strategy: {0}")]
    UnknownStrategy(String),
}

/// Registro malformado en una hoja de estímulos.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed record at line {line} (sheet: {sheet:?}, header: {header:?}): {reason}")]
pub struct ParseFailure {
    pub line: usize,
    pub sheet: Option<String>,
    pub header: Option<String>,
    pub reason: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("interface specification, line {line}: {reason}")]
pub struct LqlError {
    pub line: usize,
    pub reason: String,
}

/// Fila de hoja que no puede traducirse a un statement.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("sheet {sheet}, row {row}: {reason}")]
    Row { sheet: String, row: String, reason: String },
    #[error("sheet {sheet}, row {row}: {source}")]
    Resolution {
        sheet: String,
        row: String,
        #[source]
        source: ResolutionFailure,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("unsupported expression: {0}")]
    Unsupported(String),
    #[error("invalid expression {expression}: {reason}")]
    Invalid { expression: String, reason: String },
    #[error("unknown type: {0}")]
    UnknownType(String),
}

/// Falla de un statement durante la ejecución de una secuencia.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvocationFailure {
    /// El artifact lanzó una falla.
    #[error("artifact threw {0}")]
    Fault(Fault),
    /// El código del artifact hizo panic.
    #[error("artifact panicked: {0}")]
    Panicked(String),
    #[error("statement {statement}: invalid target ({reason})")]
    InvalidTarget { statement: usize, reason: String },
    #[error("statement {statement}: no usable binding ({reason})")]
    Binding { statement: usize, reason: String },
    #[error("statement {statement}: {reason}")]
    Coercion { statement: usize, reason: String },
    #[error("evaluation failed: {0}")]
    Evaluation(EvalError),
    #[error("statement budget of {limit} exceeded")]
    BudgetExceeded { limit: usize },
}

impl InvocationFailure {
    /// `true` si falló el código del artifact (falla lanzada o panic). El
    /// resto son fallas del motor: el artifact nunca llegó a ejecutarse.
    pub fn is_artifact_failure(&self) -> bool {
        matches!(self, InvocationFailure::Fault(_) | InvocationFailure::Panicked(_))
    }
}

/// Un listener de instrumentación falló; se loguea y se descarta.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("listener {listener} failed in {hook}: {message}")]
pub struct ListenerFailure {
    pub listener: String,
    pub hook: String,
    pub message: String,
}

impl ListenerFailure {
    pub fn new(listener: &str, hook: &str, message: &str) -> Self {
        Self { listener: listener.to_string(),
               hook: hook.to_string(),
               message: message.to_string() }
    }
}

/// Errores agregados del motor.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreEngineError {
    #[error(transparent)] Resolution(#[from] ResolutionFailure),
    #[error(transparent)] Adaptation(#[from] AdaptationError),
    #[error(transparent)] Parse(#[from] ParseFailure),
    #[error(transparent)] Lql(#[from] LqlError),
    #[error(transparent)] Build(#[from] BuildError),
    #[error(transparent)] Eval(#[from] EvalError),
    #[error("internal: {0}")] Internal(String),
}
