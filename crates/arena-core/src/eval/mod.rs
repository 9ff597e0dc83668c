//! Evaluador de expresiones embebidas.
//!
//! Las celdas de una hoja pueden contener expresiones en lugar de literales
//! JSON (`'Hello'`, `10L`, `[1, 2]`, `$eval` de una fila). El motor sólo
//! depende de este contrato estrecho; `LiteralEvaluator` es la
//! implementación por defecto y no ejecuta código arbitrario.

mod literal;

use indexmap::IndexMap;

use crate::errors::EvalError;
use crate::model::{TypeDescriptor, Value};

pub use literal::LiteralEvaluator;

/// Contexto para resolver nombres de tipo durante la evaluación.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeResolutionContext {
    /// Nombre visible → nombre efectivo (p.ej. interfaz → artifact).
    pub aliases: IndexMap<String, String>,
    /// Tipos no JDK que se aceptan tal cual.
    pub known: Vec<String>,
}

impl TypeResolutionContext {
    pub fn with_alias(mut self, from: &str, to: &str) -> Self {
        self.aliases.insert(from.to_string(), to.to_string());
        self
    }

    pub fn with_known(mut self, name: &str) -> Self {
        if !self.known.iter().any(|k| k == name) {
            self.known.push(name.to_string());
        }
        self
    }
}

pub trait ExpressionEvaluator: Send + Sync {
    /// Evalúa una expresión a un valor.
    fn eval(&self, expression: &str) -> Result<Value, EvalError>;

    /// Reemplaza el contexto de resolución de tipos.
    fn set_type_resolution_context(&mut self, ctx: TypeResolutionContext);

    /// Resuelve un nombre de tipo visible en el contexto actual.
    fn resolve_type(&self, name: &str) -> Result<TypeDescriptor, EvalError>;
}
