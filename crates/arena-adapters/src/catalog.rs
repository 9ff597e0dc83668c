//! Catálogo de artifacts de ejemplo por nombre.

use arena_core::model::{Artifact, MemberDescriptor, Signature};
use log::debug;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::artifacts::{account, array_stack, calculator, faulty_stack, linked_stack};

const NAMES: [&str; 5] = ["ArrayStack", "LinkedStack", "Calculator", "Account", "FaultyStack"];

pub fn names() -> Vec<&'static str> {
    NAMES.to_vec()
}

/// Todos los artifacts, en el orden de `names()`.
pub fn catalog() -> Vec<Arc<dyn Artifact>> {
    NAMES.iter().filter_map(|n| find(n)).collect()
}

/// Artifact por nombre simple (`ArrayStack`) o calificado
/// (`samples.ArrayStack`).
pub fn find(name: &str) -> Option<Arc<dyn Artifact>> {
    let simple = name.rsplit('.').next().unwrap_or(name);
    let artifact: Arc<dyn Artifact> = match simple {
        "ArrayStack" => Arc::new(array_stack()),
        "LinkedStack" => Arc::new(linked_stack()),
        "Calculator" => Arc::new(calculator()),
        "Account" => Arc::new(account()),
        "FaultyStack" => Arc::new(faulty_stack()),
        _ => {
            debug!("catalog: unknown artifact {name}");
            return None;
        }
    };
    Some(artifact)
}

/// Descripción JSON de los miembros de un artifact.
pub fn describe(artifact: &dyn Artifact) -> Value {
    let members = |list: &[MemberDescriptor]| -> Vec<String> { list.iter().map(|m| m.describe()).collect() };
    json!({
        "name": artifact.name(),
        "supertypes": artifact.supertypes(),
        "constructors": members(artifact.constructors()),
        "methods": members(artifact.methods()),
        "fields": members(artifact.fields()),
    })
}
