//! arena-adapters: artifacts de ejemplo listos para adaptar.
//!
//! Este crate provee:
//! - Artifacts concretos declarados con `NativeArtifact` (tablas de registro
//!   explícitas): pilas con nombres distintos, una calculadora con
//!   sobrecargas, una cuenta con campos y una pila que falla a propósito.
//! - Un catálogo por nombre (`catalog::find`) usado por la CLI y los tests.
//!
//! Nota: el core no conoce ninguno de estos tipos; sólo ve `dyn Artifact`.

pub mod artifacts;
pub mod catalog;

pub use catalog::{catalog, describe, find, names};
