//! Jerarquía de tipos de referencia.
//!
//! Mapea un nombre de tipo a sus supertipos directos (superclase primero,
//! luego interfaces). Un tipo sin supertipos registrados tiene como único
//! supertipo implícito a `java.lang.Object`. La distancia entre dos tipos es
//! la cantidad mínima de aristas (BFS) y es el costo de widening de
//! referencias que usa el resolver.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::constants::OBJECT_TYPE;

#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    supertypes: HashMap<String, Vec<String>>,
}

impl TypeHierarchy {
    /// Jerarquía vacía (todo tipo desciende directamente de `Object`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Jerarquía con los tipos básicos del JDK más usados en firmas.
    pub fn jdk() -> Self {
        let mut h = Self::new();
        let serializable = "java.io.Serializable";
        let comparable = "java.lang.Comparable";
        h.register("java.lang.String", [OBJECT_TYPE, "java.lang.CharSequence", comparable, serializable]);
        h.register("java.lang.Number", [OBJECT_TYPE, serializable]);
        for boxed in ["java.lang.Byte", "java.lang.Short", "java.lang.Integer", "java.lang.Long", "java.lang.Float", "java.lang.Double"] {
            h.register(boxed, ["java.lang.Number", comparable]);
        }
        h.register("java.lang.Boolean", [OBJECT_TYPE, serializable, comparable]);
        h.register("java.lang.Character", [OBJECT_TYPE, serializable, comparable]);
        h.register("java.util.Collection", ["java.lang.Iterable"]);
        h.register("java.util.List", ["java.util.Collection"]);
        h.register("java.util.Set", ["java.util.Collection"]);
        h.register("java.util.Queue", ["java.util.Collection"]);
        h.register("java.util.Deque", ["java.util.Queue"]);
        h.register("java.util.AbstractCollection", [OBJECT_TYPE, "java.util.Collection"]);
        h.register("java.util.AbstractList", ["java.util.AbstractCollection", "java.util.List"]);
        h.register("java.util.ArrayList", ["java.util.AbstractList", "java.util.List"]);
        h.register("java.util.Vector", ["java.util.AbstractList", "java.util.List"]);
        h.register("java.util.Stack", ["java.util.Vector"]);
        h.register("java.util.LinkedList", ["java.util.AbstractList", "java.util.Deque"]);
        h
    }

    /// Registra (o extiende) los supertipos directos de `name`.
    pub fn register<I, S>(&mut self, name: &str, supertypes: I)
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        let entry = self.supertypes.entry(name.to_string()).or_default();
        for s in supertypes {
            let s = s.into();
            if s != name && !entry.contains(&s) {
                entry.push(s);
            }
        }
    }

    /// Supertipos directos (con `Object` implícito).
    pub fn direct_supertypes(&self, name: &str) -> Vec<&str> {
        if name == OBJECT_TYPE {
            return Vec::new();
        }
        match self.supertypes.get(name) {
            Some(list) if !list.is_empty() => list.iter().map(String::as_str).collect(),
            _ => vec![OBJECT_TYPE],
        }
    }

    /// Distancia mínima de `from` a `to` subiendo por la jerarquía, o `None`
    /// si `to` no es supertipo de `from`.
    pub fn distance(&self, from: &str, to: &str) -> Option<u32> {
        if from == to {
            return Some(0);
        }
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&str, u32)> = VecDeque::new();
        queue.push_back((from, 0));
        seen.insert(from);
        while let Some((current, depth)) = queue.pop_front() {
            for sup in self.direct_supertypes(current) {
                if sup == to {
                    return Some(depth + 1);
                }
                if seen.insert(sup) {
                    queue.push_back((sup, depth + 1));
                }
            }
        }
        None
    }

    pub fn is_subtype(&self, from: &str, to: &str) -> bool {
        self.distance(from, to).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_widens_to_object_and_char_sequence() {
        let h = TypeHierarchy::jdk();
        assert_eq!(h.distance("java.lang.String", "java.lang.Object"), Some(1));
        assert_eq!(h.distance("java.lang.String", "java.lang.CharSequence"), Some(1));
        assert_eq!(h.distance("java.lang.Integer", "java.lang.Object"), Some(2));
        assert_eq!(h.distance("java.lang.Object", "java.lang.String"), None);
    }

    #[test]
    fn unknown_types_descend_from_object() {
        let mut h = TypeHierarchy::jdk();
        assert_eq!(h.distance("ArrayStack", "java.lang.Object"), Some(1));
        h.register("ArrayStack", ["java.util.Collection"]);
        assert_eq!(h.distance("ArrayStack", "java.lang.Iterable"), Some(2));
        assert_eq!(h.distance("ArrayStack", "java.lang.Object"), Some(3));
    }
}
