//! Asignabilidad entre tipos y su costo en pasos de widening.
//!
//! `conversion_cost(from, to)` devuelve `None` si un valor declarado como
//! `from` no puede pasarse donde se espera `to`; si puede, devuelve la
//! cantidad de pasos de conversión:
//! - identidad: 0
//! - widening numérico: un paso por eslabón en
//!   `byte → short → int → long → float → double`; `char → int` cuenta 1
//! - boxing / unboxing: 1, más el widening posterior
//! - widening de referencias: distancia en la `TypeHierarchy`
//! - `null` hacia cualquier no primitivo: 0

use crate::model::{PrimitiveKind, TypeDescriptor, TypeHierarchy};

/// Pasos de widening primitivo de `from` a `to`.
pub fn widening_steps(from: PrimitiveKind, to: PrimitiveKind) -> Option<u32> {
    if from == to {
        return Some(0);
    }
    match (from, to) {
        (PrimitiveKind::Char, _) => {
            let target = to.numeric_rank()?;
            let int_rank = PrimitiveKind::Int.numeric_rank()?;
            (target >= int_rank).then(|| target - int_rank + 1)
        }
        _ => {
            let a = from.numeric_rank()?;
            let b = to.numeric_rank()?;
            (b > a).then(|| b - a)
        }
    }
}

pub fn conversion_cost(hierarchy: &TypeHierarchy, from: &TypeDescriptor, to: &TypeDescriptor) -> Option<u32> {
    if from == to {
        return Some(0);
    }
    match (from, to) {
        (TypeDescriptor::Void, _) | (_, TypeDescriptor::Void) => None,
        (TypeDescriptor::Null, TypeDescriptor::Primitive(_)) => None,
        (TypeDescriptor::Null, _) => Some(0),
        (TypeDescriptor::Primitive(a), TypeDescriptor::Primitive(b)) => widening_steps(*a, *b),
        // boxing (sin widening previo, como en Java)
        (TypeDescriptor::Primitive(a), TypeDescriptor::Boxed(b)) => (a == b).then_some(1),
        (TypeDescriptor::Primitive(a), TypeDescriptor::Reference(name)) => {
            hierarchy.distance(a.boxed_name(), name).map(|d| d + 1)
        }
        // unboxing seguido de widening
        (TypeDescriptor::Boxed(a), TypeDescriptor::Primitive(b)) => widening_steps(*a, *b).map(|w| w + 1),
        (TypeDescriptor::Boxed(_), TypeDescriptor::Boxed(_)) => None,
        (TypeDescriptor::Boxed(a), TypeDescriptor::Reference(name)) => hierarchy.distance(a.boxed_name(), name),
        (TypeDescriptor::Reference(a), TypeDescriptor::Reference(b)) => hierarchy.distance(a, b),
        (TypeDescriptor::Reference(a), TypeDescriptor::Boxed(b)) => (a == b.boxed_name()).then_some(0),
        (TypeDescriptor::Array(a), TypeDescriptor::Array(b)) => match (a.as_ref(), b.as_ref()) {
            // arrays de primitivos sólo por identidad (ya cubierta arriba)
            (TypeDescriptor::Primitive(_), _) | (_, TypeDescriptor::Primitive(_)) => None,
            (ea, eb) => conversion_cost(hierarchy, ea, eb),
        },
        (TypeDescriptor::Array(_), TypeDescriptor::Reference(name)) => {
            matches!(name.as_str(), "java.lang.Object" | "java.lang.Cloneable" | "java.io.Serializable").then_some(1)
        }
        _ => None,
    }
}

/// `true` si todos los parámetros de `a` son asignables a los de `b`
/// (misma aridad). Define "más específico".
pub fn more_specific(hierarchy: &TypeHierarchy, a: &[TypeDescriptor], b: &[TypeDescriptor]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| conversion_cost(hierarchy, x, y).is_some())
}
