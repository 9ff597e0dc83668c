//! Statements: los pasos de una secuencia.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::OP_EVAL;
use crate::model::{TypeDescriptor, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Construye una instancia (de la interfaz bajo prueba o de un tipo JDK).
    Create,
    /// Invoca una operación de la interfaz sobre el resultado de otro statement.
    Invoke,
    /// Lee o escribe un campo concreto del artifact.
    FieldAccess,
    /// Evalúa una expresión embebida.
    Eval,
}

/// Entrada de un statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "input", content = "of", rename_all = "snake_case")]
pub enum Input {
    Literal(Value),
    /// Valor producido por el statement con ese índice.
    Ref(usize),
    /// Expresión que se evalúa al ejecutar.
    Expr(String),
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Literal(v) => write!(f, "{v}"),
            Input::Ref(i) => write!(f, "${i}"),
            Input::Expr(e) => write!(f, "#{{{e}}}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub kind: StatementKind,
    /// Statement cuyo resultado es el receptor (ninguno para create/eval).
    pub target: Option<usize>,
    /// Nombre de operación, campo o tipo creado.
    pub operation: String,
    pub inputs: Vec<Input>,
    /// Slot de la interfaz ligado (sólo statements sobre la interfaz).
    pub slot: Option<usize>,
    /// Tipo estático del resultado.
    pub result_type: TypeDescriptor,
}

impl Statement {
    pub fn create(type_name: &str, slot: Option<usize>, inputs: Vec<Input>, result_type: TypeDescriptor) -> Self {
        Self { kind: StatementKind::Create,
               target: None,
               operation: type_name.to_string(),
               inputs,
               slot,
               result_type }
    }

    pub fn invoke(target: usize, operation: &str, slot: usize, inputs: Vec<Input>, result_type: TypeDescriptor) -> Self {
        Self { kind: StatementKind::Invoke,
               target: Some(target),
               operation: operation.to_string(),
               inputs,
               slot: Some(slot),
               result_type }
    }

    pub fn field(target: usize, name: &str, value: Option<Input>) -> Self {
        Self { kind: StatementKind::FieldAccess,
               target: Some(target),
               operation: name.to_string(),
               inputs: value.into_iter().collect(),
               slot: None,
               result_type: TypeDescriptor::object() }
    }

    pub fn eval(expression: &str, result_type: TypeDescriptor) -> Self {
        Self { kind: StatementKind::Eval,
               target: None,
               operation: OP_EVAL.to_string(),
               inputs: vec![Input::Expr(expression.to_string())],
               slot: None,
               result_type }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.inputs.iter().map(|i| i.to_string()).collect();
        match (self.kind, self.target) {
            (StatementKind::Create, _) => write!(f, "new {}({})", self.operation, args.join(", ")),
            (StatementKind::Eval, _) => write!(f, "{}", args.join("")),
            (_, Some(t)) => write!(f, "${t}.{}({})", self.operation, args.join(", ")),
            (_, None) => write!(f, "{}({})", self.operation, args.join(", ")),
        }
    }
}
