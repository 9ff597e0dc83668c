//! Fingerprints blake3 en hex. Todo hash del motor pasa por aquí.

use blake3::Hasher;
use serde_json::Value;

use super::canonical_json::to_canonical_json;

pub fn hash_str(input: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(input.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Hashea un `Value` JSON sobre su forma canónica (claves ordenadas), de modo
/// que el orden de inserción no altera el resultado.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}
