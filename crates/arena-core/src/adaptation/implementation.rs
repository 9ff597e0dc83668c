//! `AdaptedImplementation`: vínculo inmutable entre los slots de una
//! interfaz y los miembros concretos de un artifact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::errors::AdaptationError;
use crate::model::{Artifact, InterfaceSpecification, MemberDescriptor, TypeDescriptor};

/// Miembro concreto asignado a un slot de operación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "binding", content = "index", rename_all = "snake_case")]
pub enum Binding {
    Initializer(usize),
    Method(usize),
    FieldRead(usize),
    FieldWrite(usize),
}

#[derive(Clone)]
pub struct AdaptedImplementation {
    interface: Arc<InterfaceSpecification>,
    artifact: Arc<dyn Artifact>,
    strategy: String,
    variant: usize,
    bindings: Vec<Binding>,
}

impl AdaptedImplementation {
    /// Invariante: un binding por operación, en el mismo orden.
    pub fn new(interface: Arc<InterfaceSpecification>,
               artifact: Arc<dyn Artifact>,
               strategy: &str,
               variant: usize,
               bindings: Vec<Binding>)
               -> Result<Self, AdaptationError> {
        if bindings.len() != interface.len() {
            return Err(AdaptationError::NoCandidates { operation: format!("{} ({} of {} slots bound)",
                                                                          interface.name,
                                                                          bindings.len(),
                                                                          interface.len()) });
        }
        Ok(Self { interface,
                  artifact,
                  strategy: strategy.to_string(),
                  variant,
                  bindings })
    }

    pub fn interface(&self) -> &Arc<InterfaceSpecification> {
        &self.interface
    }

    pub fn artifact(&self) -> &Arc<dyn Artifact> {
        &self.artifact
    }

    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    pub fn variant(&self) -> usize {
        self.variant
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn binding(&self, slot: usize) -> Option<Binding> {
        self.bindings.get(slot).copied()
    }

    /// Identidad estable usada en registros y reportes.
    pub fn identity(&self) -> String {
        format!("{}:{}#{}", self.artifact.name(), self.strategy, self.variant)
    }

    /// Miembro concreto ligado a `slot`.
    pub fn member(&self, slot: usize) -> Option<&MemberDescriptor> {
        match self.binding(slot)? {
            Binding::Initializer(i) => self.artifact.constructors().get(i),
            Binding::Method(i) => self.artifact.methods().get(i),
            Binding::FieldRead(i) | Binding::FieldWrite(i) => self.artifact.fields().get(i),
        }
    }

    /// Tipos concretos que espera el miembro ligado a `slot`.
    pub fn parameter_types(&self, slot: usize) -> Option<Vec<TypeDescriptor>> {
        let member = self.member(slot)?;
        match self.binding(slot)? {
            Binding::FieldRead(_) => Some(Vec::new()),
            Binding::FieldWrite(_) => Some(vec![member.value_type.clone()]),
            _ => Some(member.params.clone()),
        }
    }
}

impl fmt::Debug for AdaptedImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptedImplementation")
         .field("interface", &self.interface.name)
         .field("artifact", &self.artifact.name())
         .field("strategy", &self.strategy)
         .field("variant", &self.variant)
         .field("bindings", &self.bindings)
         .finish()
    }
}
