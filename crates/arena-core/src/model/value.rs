//! Valores de runtime intercambiados entre statements.
//!
//! Un `Value` lleva un `Payload` y un tag de tipo declarado. El tag se usa
//! para resolver sobrecargas al construir statements y para serializar de
//! vuelta a un registro; el payload es lo que recibe el artifact.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::json;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, TryLockError};

use super::artifact::{Fault, Instance};
use super::types::{PrimitiveKind, TypeDescriptor};
use crate::constants::{MARK_INSTANCE, STRING_TYPE};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Referencia compartida a una instancia viva de un artifact. La igualdad es
/// por identidad.
#[derive(Clone)]
pub struct ObjectRef {
    id: u64,
    class_name: Arc<str>,
    inner: Arc<Mutex<Box<dyn Instance>>>,
}

impl ObjectRef {
    pub fn new(instance: Box<dyn Instance>) -> Self {
        let class_name: Arc<str> = Arc::from(instance.class_name());
        Self { id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
               class_name,
               inner: Arc::new(Mutex::new(instance)) }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Ejecuta `f` con acceso exclusivo a la instancia. Una instancia cuyo
    /// lock quedó envenenado por un panic previo ya no es utilizable.
    ///
    /// No bloquea: si la instancia ya está en uso (una llamada que recibe
    /// a su propio receptor como argumento y vuelve a entrar) se devuelve
    /// una falla `IllegalState` en vez de esperar al lock.
    pub fn with_instance<R>(&self, f: impl FnOnce(&mut dyn Instance) -> R) -> Result<R, Fault> {
        let mut guard = match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                return Err(Fault::new("IllegalState", &format!("instance {} is already in use", self)));
            }
            Err(TryLockError::Poisoned(_)) => {
                return Err(Fault::new("IllegalState", &format!("instance {} is poisoned", self)));
            }
        };
        Ok(f(guard.as_mut()))
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({}#{})", self.class_name, self.id)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class_name, self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Resultado de una operación `void`.
    Void,
    Null,
    Bool(bool),
    Char(char),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    Object(ObjectRef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub payload: Payload,
    pub type_tag: TypeDescriptor,
}

impl Value {
    pub fn new(payload: Payload, type_tag: TypeDescriptor) -> Self {
        Self { payload, type_tag }
    }

    pub fn void() -> Self {
        Self::new(Payload::Void, TypeDescriptor::Void)
    }

    pub fn null() -> Self {
        Self::new(Payload::Null, TypeDescriptor::Null)
    }

    pub fn bool(b: bool) -> Self {
        Self::new(Payload::Bool(b), TypeDescriptor::Primitive(PrimitiveKind::Boolean))
    }

    pub fn char(c: char) -> Self {
        Self::new(Payload::Char(c), TypeDescriptor::Primitive(PrimitiveKind::Char))
    }

    pub fn int(i: i64) -> Self {
        Self::new(Payload::Int(i), TypeDescriptor::Primitive(PrimitiveKind::Int))
    }

    pub fn long(i: i64) -> Self {
        Self::new(Payload::Int(i), TypeDescriptor::Primitive(PrimitiveKind::Long))
    }

    pub fn double(f: f64) -> Self {
        Self::new(Payload::Float(f), TypeDescriptor::Primitive(PrimitiveKind::Double))
    }

    pub fn float(f: f32) -> Self {
        Self::new(Payload::Float(f as f64), TypeDescriptor::Primitive(PrimitiveKind::Float))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::new(Payload::Str(s.into()), TypeDescriptor::string())
    }

    pub fn array(items: Vec<Value>, element: TypeDescriptor) -> Self {
        Self::new(Payload::Array(items), TypeDescriptor::Array(Box::new(element)))
    }

    pub fn object(obj: ObjectRef) -> Self {
        let tag = TypeDescriptor::Reference(obj.class_name().to_string());
        Self::new(Payload::Object(obj), tag)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.payload, Payload::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.payload {
            Payload::Int(i) => Some(i),
            Payload::Char(c) => Some(c as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.payload {
            Payload::Int(i) => Some(i as f64),
            Payload::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.payload {
            Payload::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            Payload::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match &self.payload {
            Payload::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Convierte el valor al tipo concreto de un parámetro: widening
    /// numérico, boxing/unboxing y `null` para no primitivos. Devuelve el
    /// motivo del rechazo cuando la conversión no es legal.
    pub fn coerce_to(&self, target: &TypeDescriptor) -> Result<Value, String> {
        let reject = || Err(format!("cannot convert {} ({}) to {}", self, self.type_tag, target));
        match target {
            TypeDescriptor::Void => reject(),
            TypeDescriptor::Null => match self.payload {
                Payload::Null => Ok(self.clone()),
                _ => reject(),
            },
            TypeDescriptor::Boxed(_) if self.is_null() => Ok(Value::new(Payload::Null, target.clone())),
            TypeDescriptor::Primitive(kind) | TypeDescriptor::Boxed(kind) => match coerce_primitive(*kind, &self.payload) {
                Some(payload) => Ok(Value::new(payload, target.clone())),
                None => reject(),
            },
            TypeDescriptor::Reference(name) => match &self.payload {
                Payload::Null => Ok(Value::new(Payload::Null, target.clone())),
                Payload::Str(_) => Ok(self.clone()),
                Payload::Void => reject(),
                _ if name == STRING_TYPE => reject(),
                // boxing implícito al pasar un primitivo como referencia
                _ => match &self.type_tag {
                    TypeDescriptor::Primitive(kind) => Ok(Value::new(self.payload.clone(), TypeDescriptor::Boxed(*kind))),
                    _ => Ok(self.clone()),
                },
            },
            TypeDescriptor::Array(elem) => match &self.payload {
                Payload::Null => Ok(Value::new(Payload::Null, target.clone())),
                Payload::Array(items) => {
                    let converted = items.iter().map(|v| v.coerce_to(elem)).collect::<Result<Vec<_>, _>>()?;
                    Ok(Value::new(Payload::Array(converted), target.clone()))
                }
                _ => reject(),
            },
        }
    }

    /// Comparación estructural usada por el oráculo: los números se comparan
    /// por valor entre enteros y flotantes, los objetos por identidad.
    pub fn matches(&self, expected: &Value) -> bool {
        match (&self.payload, &expected.payload) {
            (Payload::Int(a), Payload::Int(b)) => a == b,
            (Payload::Int(_) | Payload::Float(_), Payload::Int(_) | Payload::Float(_)) => self.as_f64() == expected.as_f64(),
            (Payload::Char(c), Payload::Str(s)) | (Payload::Str(s), Payload::Char(c)) => {
                let mut chars = s.chars();
                chars.next() == Some(*c) && chars.next().is_none()
            }
            (Payload::Void | Payload::Null, Payload::Void | Payload::Null) => true,
            (Payload::Array(a), Payload::Array(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.matches(y)),
            (a, b) => a == b,
        }
    }

    /// Representación JSON usada en reportes y fingerprints.
    pub fn to_json(&self) -> serde_json::Value {
        match &self.payload {
            Payload::Void | Payload::Null => serde_json::Value::Null,
            Payload::Bool(b) => json!(b),
            Payload::Char(c) => json!(c.to_string()),
            Payload::Int(i) => json!(i),
            Payload::Float(f) => serde_json::Number::from_f64(*f).map(serde_json::Value::Number)
                                                                   .unwrap_or_else(|| json!(f.to_string())),
            Payload::Str(s) => json!(s),
            Payload::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Payload::Object(_) => json!(MARK_INSTANCE),
        }
    }
}

fn coerce_primitive(kind: PrimitiveKind, payload: &Payload) -> Option<Payload> {
    match (kind, payload) {
        (PrimitiveKind::Boolean, Payload::Bool(b)) => Some(Payload::Bool(*b)),
        (PrimitiveKind::Char, Payload::Char(c)) => Some(Payload::Char(*c)),
        (PrimitiveKind::Char, Payload::Str(s)) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Payload::Char(c)),
                _ => None,
            }
        }
        (PrimitiveKind::Int | PrimitiveKind::Long, Payload::Char(c)) => Some(Payload::Int(*c as i64)),
        (PrimitiveKind::Float, Payload::Char(c)) => Some(Payload::Float(*c as u32 as f32 as f64)),
        (PrimitiveKind::Double, Payload::Char(c)) => Some(Payload::Float(*c as u32 as f64)),
        (k, Payload::Int(i)) if k.is_integral() => in_range(k, *i).then_some(Payload::Int(*i)),
        (PrimitiveKind::Float, Payload::Int(i)) => Some(Payload::Float((*i as f32) as f64)),
        (PrimitiveKind::Double, Payload::Int(i)) => Some(Payload::Float(*i as f64)),
        (PrimitiveKind::Float, Payload::Float(f)) => Some(Payload::Float((*f as f32) as f64)),
        (PrimitiveKind::Double, Payload::Float(f)) => Some(Payload::Float(*f)),
        _ => None,
    }
}

fn in_range(kind: PrimitiveKind, i: i64) -> bool {
    match kind {
        PrimitiveKind::Byte => i8::try_from(i).is_ok(),
        PrimitiveKind::Short => i16::try_from(i).is_ok(),
        PrimitiveKind::Int => i32::try_from(i).is_ok(),
        _ => true,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Void => write!(f, "void"),
            Payload::Object(o) => write!(f, "{o}"),
            _ => write!(f, "{}", self.to_json()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("Value", 2)?;
        st.serialize_field("type", &self.type_tag.to_string())?;
        st.serialize_field("value", &self.to_json())?;
        st.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_widening_and_boxing_on_coercion() {
        let short = Value::new(Payload::Int(7), TypeDescriptor::Primitive(PrimitiveKind::Short));
        let widened = short.coerce_to(&TypeDescriptor::int()).expect("short -> int");
        assert_eq!(widened.type_tag, TypeDescriptor::int());
        let boxed = Value::int(3).coerce_to(&TypeDescriptor::object()).expect("int -> Object");
        assert_eq!(boxed.type_tag, TypeDescriptor::Boxed(PrimitiveKind::Int));
        let dbl = Value::int(2).coerce_to(&TypeDescriptor::Primitive(PrimitiveKind::Double)).expect("int -> double");
        assert_eq!(dbl.as_f64(), Some(2.0));
    }

    #[test]
    fn illegal_coercions_are_rejected() {
        assert!(Value::int(300).coerce_to(&TypeDescriptor::Primitive(PrimitiveKind::Byte)).is_err());
        assert!(Value::null().coerce_to(&TypeDescriptor::int()).is_err());
        assert!(Value::int(1).coerce_to(&TypeDescriptor::string()).is_err());
        assert!(Value::double(1.5).coerce_to(&TypeDescriptor::int()).is_err());
    }

    struct Mirror(i64);

    impl Instance for Mirror {
        fn class_name(&self) -> &str {
            "Mirror"
        }

        fn invoke(&mut self, _method: usize, args: Vec<Value>) -> Result<Value, Fault> {
            match args.first().and_then(Value::as_object) {
                Some(other) => other.with_instance(|inst| inst.get_field(0))?,
                None => Ok(Value::int(self.0)),
            }
        }

        fn get_field(&self, _field: usize) -> Result<Value, Fault> {
            Ok(Value::int(self.0))
        }

        fn set_field(&mut self, _field: usize, value: Value) -> Result<(), Fault> {
            self.0 = value.as_i64().unwrap_or(0);
            Ok(())
        }
    }

    #[test]
    fn receiver_passed_to_itself_faults_instead_of_blocking() {
        let cell = ObjectRef::new(Box::new(Mirror(5)));
        let other = ObjectRef::new(Box::new(Mirror(9)));

        let read = cell.with_instance(|inst| inst.invoke(0, vec![Value::object(other.clone())])).expect("lock");
        assert_eq!(read, Ok(Value::int(9)));

        let own = cell.with_instance(|inst| inst.invoke(0, vec![Value::object(cell.clone())])).expect("outer lock");
        let fault = own.expect_err("re-entrant use");
        assert_eq!(fault.kind, "IllegalState");
        assert!(fault.message.contains("already in use"), "{fault}");

        // el lock externo se liberó: la instancia sigue usable
        assert_eq!(cell.with_instance(|inst| inst.get_field(0)).expect("lock"), Ok(Value::int(5)));
    }

    #[test]
    fn matches_compares_numbers_by_value() {
        assert!(Value::int(1).matches(&Value::double(1.0)));
        assert!(Value::char('a').matches(&Value::string("a")));
        assert!(!Value::int(1).matches(&Value::int(2)));
        assert!(Value::void().matches(&Value::null()));
    }
}
