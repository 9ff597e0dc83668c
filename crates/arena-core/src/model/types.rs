//! Descriptores de tipo.
//!
//! Un `TypeDescriptor` describe el tipo declarado de un parámetro, retorno o
//! campo. Los nombres se normalizan al parsear: los tipos simples de
//! `java.lang` se califican (`String` → `java.lang.String`), los boxed se
//! reconocen por ambos nombres y los argumentos genéricos se descartan
//! (`java.util.List<String>` → `java.util.List`).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{OBJECT_TYPE, STRING_TYPE};

/// Tipos primitivos soportados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [PrimitiveKind::Boolean,
                                         PrimitiveKind::Byte,
                                         PrimitiveKind::Short,
                                         PrimitiveKind::Char,
                                         PrimitiveKind::Int,
                                         PrimitiveKind::Long,
                                         PrimitiveKind::Float,
                                         PrimitiveKind::Double];

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Nombre calificado del tipo boxed equivalente.
    pub fn boxed_name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java.lang.Boolean",
            PrimitiveKind::Byte => "java.lang.Byte",
            PrimitiveKind::Short => "java.lang.Short",
            PrimitiveKind::Char => "java.lang.Character",
            PrimitiveKind::Int => "java.lang.Integer",
            PrimitiveKind::Long => "java.lang.Long",
            PrimitiveKind::Float => "java.lang.Float",
            PrimitiveKind::Double => "java.lang.Double",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Acepta el nombre calificado o el simple (`Integer`).
    pub fn from_boxed_name(name: &str) -> Option<Self> {
        Self::ALL.iter()
                 .copied()
                 .find(|k| k.boxed_name() == name || k.boxed_name().rsplit('.').next() == Some(name))
    }

    /// Posición en la cadena de promoción `byte → short → int → long → float
    /// → double`. `char` y `boolean` no forman parte de ella.
    pub(crate) fn numeric_rank(&self) -> Option<u32> {
        match self {
            PrimitiveKind::Byte => Some(0),
            PrimitiveKind::Short => Some(1),
            PrimitiveKind::Int => Some(2),
            PrimitiveKind::Long => Some(3),
            PrimitiveKind::Float => Some(4),
            PrimitiveKind::Double => Some(5),
            PrimitiveKind::Boolean | PrimitiveKind::Char => None,
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Int | PrimitiveKind::Long)
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, PrimitiveKind::Float | PrimitiveKind::Double)
    }
}

/// Tipo declarado de un parámetro, retorno o campo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "lowercase")]
pub enum TypeDescriptor {
    Void,
    /// Tipo del literal `null`; asignable a cualquier no primitivo.
    Null,
    Primitive(PrimitiveKind),
    Boxed(PrimitiveKind),
    Reference(String),
    Array(Box<TypeDescriptor>),
}

/// Tipos de `java.lang` que se aceptan por nombre simple.
const JAVA_LANG_SIMPLE: [&str; 7] = ["Object", "String", "CharSequence", "Number", "Comparable", "Iterable", "Cloneable"];

impl TypeDescriptor {
    /// Parsea un nombre de tipo (`int`, `Integer`, `java.lang.String`,
    /// `Object[]`, `java.util.Map<String, List<Integer>>`, `void`).
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        if let Some(elem) = trimmed.strip_suffix("[]") {
            return TypeDescriptor::Array(Box::new(TypeDescriptor::parse(elem)));
        }
        if let Some(elem) = trimmed.strip_suffix("...") {
            return TypeDescriptor::Array(Box::new(TypeDescriptor::parse(elem)));
        }
        let erased = match trimmed.find('<') {
            Some(pos) => trimmed[..pos].trim(),
            None => trimmed,
        };
        match erased {
            "" | "void" => TypeDescriptor::Void,
            "null" => TypeDescriptor::Null,
            _ => {
                if let Some(kind) = PrimitiveKind::from_name(erased) {
                    TypeDescriptor::Primitive(kind)
                } else if let Some(kind) = PrimitiveKind::from_boxed_name(erased) {
                    TypeDescriptor::Boxed(kind)
                } else if JAVA_LANG_SIMPLE.contains(&erased) {
                    TypeDescriptor::Reference(format!("java.lang.{erased}"))
                } else {
                    TypeDescriptor::Reference(erased.to_string())
                }
            }
        }
    }

    pub fn object() -> Self {
        TypeDescriptor::Reference(OBJECT_TYPE.to_string())
    }

    pub fn string() -> Self {
        TypeDescriptor::Reference(STRING_TYPE.to_string())
    }

    pub fn int() -> Self {
        TypeDescriptor::Primitive(PrimitiveKind::Int)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeDescriptor::Primitive(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeDescriptor::Void)
    }

    /// Nombre usado en la jerarquía de referencias (boxed y referencias).
    pub fn reference_name(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Reference(name) => Some(name),
            TypeDescriptor::Boxed(kind) => Some(kind.boxed_name()),
            _ => None,
        }
    }

    /// Kind primitivo subyacente (propio o del boxed).
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            TypeDescriptor::Primitive(kind) | TypeDescriptor::Boxed(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Void => write!(f, "void"),
            TypeDescriptor::Null => write!(f, "null"),
            TypeDescriptor::Primitive(kind) => write!(f, "{}", kind.name()),
            TypeDescriptor::Boxed(kind) => write!(f, "{}", kind.boxed_name()),
            TypeDescriptor::Reference(name) => write!(f, "{name}"),
            TypeDescriptor::Array(elem) => write!(f, "{elem}[]"),
        }
    }
}

/// Formatea una lista de tipos como `(a, b, c)`.
pub fn format_params(params: &[TypeDescriptor]) -> String {
    let names: Vec<String> = params.iter().map(|t| t.to_string()).collect();
    format!("({})", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_java_lang_names() {
        assert_eq!(TypeDescriptor::parse("String"), TypeDescriptor::string());
        assert_eq!(TypeDescriptor::parse("java.lang.String"), TypeDescriptor::string());
        assert_eq!(TypeDescriptor::parse("Integer"), TypeDescriptor::Boxed(PrimitiveKind::Int));
        assert_eq!(TypeDescriptor::parse("java.lang.Character"), TypeDescriptor::Boxed(PrimitiveKind::Char));
        assert_eq!(TypeDescriptor::parse("short"), TypeDescriptor::Primitive(PrimitiveKind::Short));
        assert_eq!(TypeDescriptor::parse("Stack"), TypeDescriptor::Reference("Stack".into()));
    }

    #[test]
    fn parse_erases_generics_and_handles_arrays() {
        assert_eq!(TypeDescriptor::parse("java.util.Map<String, java.util.List<Integer>>"),
                   TypeDescriptor::Reference("java.util.Map".into()));
        assert_eq!(TypeDescriptor::parse("int[]"),
                   TypeDescriptor::Array(Box::new(TypeDescriptor::Primitive(PrimitiveKind::Int))));
        assert_eq!(TypeDescriptor::parse("void"), TypeDescriptor::Void);
        assert_eq!(TypeDescriptor::parse("Object[]").to_string(), "java.lang.Object[]");
    }
}
