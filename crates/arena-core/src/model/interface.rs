//! Especificación de interfaz: el contrato abstracto al que se adaptan los
//! artifacts.
//!
//! Una `InterfaceSpecification` es inmutable una vez construida y se comparte
//! (vía `Arc`) entre todos los intentos de adaptación. El orden de las
//! operaciones define los slots de una `AdaptedImplementation`.

use serde::{Deserialize, Serialize};

use super::member::{MemberKind, Signature};
use super::types::TypeDescriptor;
use crate::constants::INITIALIZER_NAME;

/// Operación abstracta de una interfaz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    pub params: Vec<TypeDescriptor>,
    pub return_type: TypeDescriptor,
    /// `true` para inicializadores (constructores).
    pub initializer: bool,
}

impl Operation {
    pub fn new(name: &str, params: Vec<TypeDescriptor>, return_type: TypeDescriptor) -> Self {
        Self { name: name.to_string(),
               params,
               return_type,
               initializer: false }
    }

    pub fn initializer(interface: &str, params: Vec<TypeDescriptor>) -> Self {
        Self { name: interface.to_string(),
               params,
               return_type: TypeDescriptor::Reference(interface.to_string()),
               initializer: true }
    }

    /// Forma textual LQL: `push(java.lang.String)->void`.
    pub fn to_lql(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        if self.initializer {
            format!("{}({})", self.name, params.join(","))
        } else {
            format!("{}({})->{}", self.name, params.join(","), self.return_type)
        }
    }
}

impl Signature for Operation {
    fn member_kind(&self) -> MemberKind {
        if self.initializer {
            MemberKind::Constructor
        } else {
            MemberKind::Method
        }
    }
    fn member_name(&self) -> &str {
        &self.name
    }
    fn parameter_types(&self) -> &[TypeDescriptor] {
        &self.params
    }
    fn value_type(&self) -> &TypeDescriptor {
        &self.return_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceSpecification {
    pub name: String,
    operations: Vec<Operation>,
}

impl InterfaceSpecification {
    /// Construye la especificación. Operaciones llamadas como la interfaz (o
    /// `<init>`) se marcan como inicializadores; si no hay ninguno se agrega
    /// un inicializador sin argumentos como primera operación.
    pub fn new(name: &str, operations: Vec<Operation>) -> Self {
        let mut ops: Vec<Operation> = operations.into_iter()
                                                .map(|mut op| {
                                                    if op.name == name || op.name == INITIALIZER_NAME {
                                                        op.initializer = true;
                                                        op.name = name.to_string();
                                                        op.return_type = TypeDescriptor::Reference(name.to_string());
                                                    }
                                                    op
                                                })
                                                .collect();
        if !ops.iter().any(|op| op.initializer) {
            ops.insert(0, Operation::initializer(name, Vec::new()));
        }
        Self { name: name.to_string(),
               operations: ops }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn operation(&self, slot: usize) -> Option<&Operation> {
        self.operations.get(slot)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Slots de inicializadores, en orden de declaración.
    pub fn initializer_slots(&self) -> Vec<usize> {
        self.operations.iter().enumerate().filter(|(_, op)| op.initializer).map(|(i, _)| i).collect()
    }

    /// Serializa de vuelta a LQL.
    pub fn to_lql(&self) -> String {
        let mut out = format!("{} {{\n", self.name);
        for op in &self.operations {
            out.push_str("    ");
            out.push_str(&op.to_lql());
            out.push('\n');
        }
        out.push('}');
        out
    }
}
