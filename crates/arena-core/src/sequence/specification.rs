//! `SequenceSpecification`: lista nombrada de statements + oráculo.

use serde_json::json;

use super::statement::Statement;
use crate::constants::ENGINE_VERSION;
use crate::hashing::hash_value;
use crate::oracle::Oracle;

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceSpecification {
    pub name: String,
    /// Interfaz contra la que se construyeron los statements.
    pub interface: String,
    pub statements: Vec<Statement>,
    pub oracle: Oracle,
}

impl SequenceSpecification {
    pub fn new(name: &str, interface: &str, statements: Vec<Statement>, oracle: Oracle) -> Self {
        Self { name: name.to_string(),
               interface: interface.to_string(),
               statements,
               oracle }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Igualdad estructural: misma lista de statements (kinds, targets,
    /// nombres, entradas). El nombre y el oráculo no participan.
    pub fn structurally_equal(&self, other: &SequenceSpecification) -> bool {
        self.statements == other.statements
    }

    /// Fingerprint estable (blake3 sobre JSON canónico) de la estructura.
    pub fn fingerprint(&self) -> String {
        let statements = serde_json::to_value(&self.statements).unwrap_or(serde_json::Value::Null);
        hash_value(&json!({
            "engine_version": ENGINE_VERSION,
            "interface": self.interface,
            "statements": statements,
        }))
    }

    /// Forma textual, un statement por línea.
    pub fn render(&self) -> String {
        self.statements
            .iter()
            .enumerate()
            .map(|(i, s)| format!("${i} = {s}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TypeDescriptor, Value};
    use crate::sequence::Input;

    fn stack_sequence(name: &str) -> SequenceSpecification {
        SequenceSpecification::new(name,
                                   "Stack",
                                   vec![Statement::create("Stack", Some(0), vec![], TypeDescriptor::Reference("Stack".into())),
                                        Statement::invoke(0, "push", 1, vec![Input::Literal(Value::string("a"))], TypeDescriptor::Void)],
                                   Oracle::new())
    }

    #[test]
    fn structural_equality_ignores_name_and_fingerprint_is_stable() {
        let a = stack_sequence("one");
        let b = stack_sequence("two");
        assert!(a.structurally_equal(&b));
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
        assert_eq!(a.render(), "$0 = new Stack()\n$1 = $0.push(\"a\")");
    }
}
