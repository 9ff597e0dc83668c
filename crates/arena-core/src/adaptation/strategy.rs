//! Contrato de estrategias de adaptación y utilidades compartidas.

use std::sync::Arc;

use super::implementation::{AdaptedImplementation, Binding};
use super::pass_through::PassThrough;
use super::signature::SignatureMatching;
use crate::errors::{AdaptationError, ResolutionFailure};
use crate::model::{Artifact, InterfaceSpecification, MemberKind, Operation, TypeDescriptor, TypeHierarchy};
use crate::resolve::MemberResolver;

/// Estrategia de adaptación.
///
/// `variant` = `-1` pide todas las variantes aplicables; `k >= 0` pide la
/// k-ésima. Las estrategias no tienen estado ni efectos: sólo introspectan
/// el artifact.
pub trait AdaptationStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn adapt(&self,
             interface: &Arc<InterfaceSpecification>,
             artifact: &Arc<dyn Artifact>,
             variant: i64)
             -> Result<Vec<AdaptedImplementation>, AdaptationError>;
}

/// Estrategia por nombre (`pass` | `pass-through` | `signature`).
pub fn strategy_by_name(name: &str, limit: usize) -> Result<Box<dyn AdaptationStrategy>, AdaptationError> {
    match name {
        "pass" | "pass-through" | "passthrough" => Ok(Box::new(PassThrough)),
        "signature" | "signature-matching" => Ok(Box::new(SignatureMatching::new(limit))),
        other => Err(AdaptationError::UnknownStrategy(other.to_string())),
    }
}

/// Jerarquía JDK extendida con los supertipos declarados del artifact.
pub(crate) fn hierarchy_for(artifact: &dyn Artifact) -> TypeHierarchy {
    let mut h = TypeHierarchy::jdk();
    h.register(artifact.name(), artifact.supertypes().iter().cloned());
    h
}

/// Tipos declarados de la operación, reemplazando referencias a la propia
/// interfaz por el artifact que la implementa.
pub(crate) fn declared_types(interface: &InterfaceSpecification, artifact: &dyn Artifact, op: &Operation) -> Vec<TypeDescriptor> {
    op.params.iter().map(|t| substitute(t, &interface.name, artifact.name())).collect()
}

pub(crate) fn substitute(t: &TypeDescriptor, interface: &str, artifact: &str) -> TypeDescriptor {
    match t {
        TypeDescriptor::Reference(name) if name == interface => TypeDescriptor::Reference(artifact.to_string()),
        TypeDescriptor::Array(elem) => TypeDescriptor::Array(Box::new(substitute(elem, interface, artifact))),
        other => other.clone(),
    }
}

fn wrap(op: &Operation, source: ResolutionFailure) -> AdaptationError {
    AdaptationError::Resolution { operation: op.name.clone(),
                                  source }
}

/// Inicializador contra constructores (regla de ambigüedad del resolver).
pub(crate) fn bind_initializer(resolver: &MemberResolver<'_>,
                               artifact: &dyn Artifact,
                               op: &Operation,
                               declared: &[TypeDescriptor])
                               -> Result<Binding, AdaptationError> {
    resolver.resolve(MemberKind::Constructor, &op.name, declared, artifact.constructors())
            .map(|r| Binding::Initializer(r.index))
            .map_err(|e| wrap(op, e))
}

/// Operación contra métodos del mismo nombre; si no hay método elegible se
/// intenta un campo del mismo nombre (lectura sin argumentos, escritura con
/// uno). Una ambigüedad entre métodos nunca cae a campos.
pub(crate) fn bind_by_name(resolver: &MemberResolver<'_>,
                           artifact: &dyn Artifact,
                           op: &Operation,
                           declared: &[TypeDescriptor])
                           -> Result<Binding, AdaptationError> {
    match resolver.resolve(MemberKind::Method, &op.name, declared, artifact.methods()) {
        Ok(r) => Ok(Binding::Method(r.index)),
        Err(err @ ResolutionFailure::Ambiguous { .. }) => Err(wrap(op, err)),
        Err(method_err) => match (declared.len(), resolver.resolve(MemberKind::Field, &op.name, declared, artifact.fields())) {
            (0, Ok(r)) => Ok(Binding::FieldRead(r.index)),
            (1, Ok(r)) => Ok(Binding::FieldWrite(r.index)),
            _ => Err(wrap(op, method_err)),
        },
    }
}
