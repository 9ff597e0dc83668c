//! Resolución de miembros: asignabilidad de tipos y selección de sobrecargas.

pub mod assign;
mod resolver;

pub use assign::{conversion_cost, more_specific, widening_steps};
pub use resolver::{MemberResolver, Resolution};
