//! Descriptores estructurales de miembros concretos (constructores, métodos,
//! campos) tal como los expone un `Artifact`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::{format_params, TypeDescriptor};
use crate::constants::INITIALIZER_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Constructor,
    Method,
    Field,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberKind::Constructor => "constructor",
            MemberKind::Method => "method",
            MemberKind::Field => "field",
        };
        f.write_str(s)
    }
}

/// Firma resoluble: lo mínimo que el `MemberResolver` necesita de un
/// candidato. La implementan los miembros concretos y las operaciones de
/// interfaz.
pub trait Signature {
    fn member_kind(&self) -> MemberKind;
    fn member_name(&self) -> &str;
    fn parameter_types(&self) -> &[TypeDescriptor];
    /// Tipo de retorno (métodos), tipo del campo (campos) o tipo construido.
    fn value_type(&self) -> &TypeDescriptor;

    fn describe(&self) -> String {
        match self.member_kind() {
            MemberKind::Field => format!("{}: {}", self.member_name(), self.value_type()),
            _ => format!("{}{}", self.member_name(), format_params(self.parameter_types())),
        }
    }
}

/// Miembro concreto de un artifact.
///
/// Para campos `params` está vacío y `value_type` es el tipo del campo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    pub kind: MemberKind,
    pub name: String,
    pub params: Vec<TypeDescriptor>,
    pub value_type: TypeDescriptor,
}

impl MemberDescriptor {
    pub fn constructor(owner: &str, params: Vec<TypeDescriptor>) -> Self {
        Self { kind: MemberKind::Constructor,
               name: INITIALIZER_NAME.to_string(),
               params,
               value_type: TypeDescriptor::Reference(owner.to_string()) }
    }

    pub fn method(name: &str, params: Vec<TypeDescriptor>, return_type: TypeDescriptor) -> Self {
        Self { kind: MemberKind::Method,
               name: name.to_string(),
               params,
               value_type: return_type }
    }

    pub fn field(name: &str, field_type: TypeDescriptor) -> Self {
        Self { kind: MemberKind::Field,
               name: name.to_string(),
               params: Vec::new(),
               value_type: field_type }
    }
}

impl Signature for MemberDescriptor {
    fn member_kind(&self) -> MemberKind {
        self.kind
    }
    fn member_name(&self) -> &str {
        &self.name
    }
    fn parameter_types(&self) -> &[TypeDescriptor] {
        &self.params
    }
    fn value_type(&self) -> &TypeDescriptor {
        &self.value_type
    }
}
