//! Capacidad de introspección e invocación sobre un artifact candidato.
//!
//! Un `Artifact` es la clase concreta que se intenta adaptar a una interfaz.
//! Expone sus constructores, métodos y campos como descriptores
//! estructurales (consumidos read-only por el resolver) y sabe construir
//! instancias. Las instancias (`Instance`) reciben invocaciones por índice de
//! miembro, nunca por nombre: la resolución ya ocurrió durante la adaptación.
//!
//! El motor nunca muta un `Artifact`; se comparte como `Arc<dyn Artifact>`
//! entre corridas concurrentes. Cada corrida crea sus propias instancias.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::member::MemberDescriptor;
use super::value::Value;

/// Falla lanzada por el código del artifact (equivalente a una excepción).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    /// Clase de la falla, p.ej. `java.util.EmptyStackException`.
    pub kind: String,
    pub message: String,
}

impl Fault {
    pub fn new(kind: &str, message: &str) -> Self {
        Self { kind: kind.to_string(),
               message: message.to_string() }
    }

    pub fn illegal_argument(message: &str) -> Self {
        Self::new("java.lang.IllegalArgumentException", message)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Fault {}

/// Instancia viva de un artifact.
pub trait Instance: Send {
    fn class_name(&self) -> &str;

    /// Invoca el método `method` (índice en `Artifact::methods`). Los
    /// argumentos ya vienen convertidos a los tipos concretos del método.
    ///
    /// Durante la llamada el receptor está tomado: si un argumento es el
    /// mismo objeto, `ObjectRef::with_instance` sobre él devuelve una falla.
    fn invoke(&mut self, method: usize, args: Vec<Value>) -> Result<Value, Fault>;

    /// Lee el campo `field` (índice en `Artifact::fields`).
    fn get_field(&self, field: usize) -> Result<Value, Fault>;

    /// Escribe el campo `field`.
    fn set_field(&mut self, field: usize, value: Value) -> Result<(), Fault>;
}

/// Artifact adaptable.
pub trait Artifact: Send + Sync {
    /// Nombre (calificado o simple) de la clase.
    fn name(&self) -> &str;

    fn constructors(&self) -> &[MemberDescriptor];

    fn methods(&self) -> &[MemberDescriptor];

    fn fields(&self) -> &[MemberDescriptor];

    /// Supertipos directos declarados (superclase e interfaces).
    fn supertypes(&self) -> &[String] {
        &[]
    }

    /// Construye una instancia con el constructor `constructor`.
    fn construct(&self, constructor: usize, args: Vec<Value>) -> Result<Box<dyn Instance>, Fault>;
}

impl fmt::Debug for dyn Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
         .field("name", &self.name())
         .field("constructors", &self.constructors().len())
         .field("methods", &self.methods().len())
         .field("fields", &self.fields().len())
         .finish()
    }
}
