//! Estrategias de adaptación: producen `AdaptedImplementation`s que ligan
//! cada operación de una interfaz a un miembro concreto de un artifact.
//!
//! La adaptación es atómica: si una operación no se puede ligar, el intento
//! completo falla y no se devuelven implementaciones parciales.

mod implementation;
mod pass_through;
mod signature;
mod strategy;

pub use implementation::{AdaptedImplementation, Binding};
pub use pass_through::PassThrough;
pub use signature::SignatureMatching;
pub use strategy::{strategy_by_name, AdaptationStrategy};
