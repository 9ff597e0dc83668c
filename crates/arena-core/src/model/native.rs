//! `NativeArtifact`: implementación de `Artifact` basada en una tabla de
//! registro explícita.
//!
//! Rust no tiene reflexión en runtime; en su lugar cada artifact declara sus
//! miembros (nombre + tipos) junto a la closure que los implementa sobre un
//! estado `S`. El orden de registro es el orden de declaración que usa el
//! resolver para desempatar.
//!
//! ```ignore
//! let artifact = NativeArtifact::<Vec<Value>>::builder("ArrayStack")
//!     .constructor(&[], |_| Ok(Vec::new()))
//!     .method("size", &[], "int", |s, _| Ok(Value::int(s.len() as i64)))
//!     .build();
//! ```

use std::sync::Arc;

use super::artifact::{Artifact, Fault, Instance};
use super::member::MemberDescriptor;
use super::types::TypeDescriptor;
use super::value::Value;

type CtorFn<S> = Box<dyn Fn(&[Value]) -> Result<S, Fault> + Send + Sync>;
type MethodFn<S> = Box<dyn Fn(&mut S, &[Value]) -> Result<Value, Fault> + Send + Sync>;
type GetterFn<S> = Box<dyn Fn(&S) -> Value + Send + Sync>;
type SetterFn<S> = Box<dyn Fn(&mut S, Value) -> Result<(), Fault> + Send + Sync>;

struct NativeTable<S> {
    constructors: Vec<CtorFn<S>>,
    methods: Vec<MethodFn<S>>,
    getters: Vec<GetterFn<S>>,
    setters: Vec<Option<SetterFn<S>>>,
}

pub struct NativeArtifact<S> {
    name: String,
    supertypes: Vec<String>,
    constructors: Vec<MemberDescriptor>,
    methods: Vec<MemberDescriptor>,
    fields: Vec<MemberDescriptor>,
    table: Arc<NativeTable<S>>,
}

impl<S: Send + 'static> NativeArtifact<S> {
    pub fn builder(name: &str) -> NativeArtifactBuilder<S> {
        NativeArtifactBuilder { name: name.to_string(),
                                supertypes: Vec::new(),
                                constructors: Vec::new(),
                                methods: Vec::new(),
                                fields: Vec::new(),
                                table: NativeTable { constructors: Vec::new(),
                                                     methods: Vec::new(),
                                                     getters: Vec::new(),
                                                     setters: Vec::new() } }
    }
}

pub struct NativeArtifactBuilder<S> {
    name: String,
    supertypes: Vec<String>,
    constructors: Vec<MemberDescriptor>,
    methods: Vec<MemberDescriptor>,
    fields: Vec<MemberDescriptor>,
    table: NativeTable<S>,
}

fn parse_all(types: &[&str]) -> Vec<TypeDescriptor> {
    types.iter().map(|t| TypeDescriptor::parse(t)).collect()
}

impl<S: Send + 'static> NativeArtifactBuilder<S> {
    pub fn supertype(mut self, name: &str) -> Self {
        self.supertypes.push(name.to_string());
        self
    }

    pub fn constructor<F>(mut self, params: &[&str], f: F) -> Self
        where F: Fn(&[Value]) -> Result<S, Fault> + Send + Sync + 'static
    {
        self.constructors.push(MemberDescriptor::constructor(&self.name, parse_all(params)));
        self.table.constructors.push(Box::new(f));
        self
    }

    pub fn method<F>(mut self, name: &str, params: &[&str], return_type: &str, f: F) -> Self
        where F: Fn(&mut S, &[Value]) -> Result<Value, Fault> + Send + Sync + 'static
    {
        self.methods.push(MemberDescriptor::method(name, parse_all(params), TypeDescriptor::parse(return_type)));
        self.table.methods.push(Box::new(f));
        self
    }

    pub fn field<G, W>(mut self, name: &str, field_type: &str, get: G, set: W) -> Self
        where G: Fn(&S) -> Value + Send + Sync + 'static,
              W: Fn(&mut S, Value) -> Result<(), Fault> + Send + Sync + 'static
    {
        self.fields.push(MemberDescriptor::field(name, TypeDescriptor::parse(field_type)));
        self.table.getters.push(Box::new(get));
        self.table.setters.push(Some(Box::new(set)));
        self
    }

    /// Campo `final`: escribirlo produce una falla `IllegalAccess`.
    pub fn read_only_field<G>(mut self, name: &str, field_type: &str, get: G) -> Self
        where G: Fn(&S) -> Value + Send + Sync + 'static
    {
        self.fields.push(MemberDescriptor::field(name, TypeDescriptor::parse(field_type)));
        self.table.getters.push(Box::new(get));
        self.table.setters.push(None);
        self
    }

    pub fn build(self) -> NativeArtifact<S> {
        NativeArtifact { name: self.name,
                         supertypes: self.supertypes,
                         constructors: self.constructors,
                         methods: self.methods,
                         fields: self.fields,
                         table: Arc::new(self.table) }
    }
}

struct NativeInstance<S> {
    class_name: String,
    state: S,
    table: Arc<NativeTable<S>>,
}

fn no_such_member(kind: &str, index: usize, class: &str) -> Fault {
    Fault::new("java.lang.NoSuchMethodError", &format!("{kind} #{index} not declared by {class}"))
}

impl<S: Send + 'static> Instance for NativeInstance<S> {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn invoke(&mut self, method: usize, args: Vec<Value>) -> Result<Value, Fault> {
        let f = self.table
                    .methods
                    .get(method)
                    .ok_or_else(|| no_such_member("method", method, &self.class_name))?;
        f(&mut self.state, &args)
    }

    fn get_field(&self, field: usize) -> Result<Value, Fault> {
        let g = self.table
                    .getters
                    .get(field)
                    .ok_or_else(|| no_such_member("field", field, &self.class_name))?;
        Ok(g(&self.state))
    }

    fn set_field(&mut self, field: usize, value: Value) -> Result<(), Fault> {
        match self.table.setters.get(field) {
            Some(Some(set)) => set(&mut self.state, value),
            Some(None) => Err(Fault::new("java.lang.IllegalAccessException", &format!("field #{field} is final"))),
            None => Err(no_such_member("field", field, &self.class_name)),
        }
    }
}

impl<S: Send + 'static> Artifact for NativeArtifact<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn constructors(&self) -> &[MemberDescriptor] {
        &self.constructors
    }

    fn methods(&self) -> &[MemberDescriptor] {
        &self.methods
    }

    fn fields(&self) -> &[MemberDescriptor] {
        &self.fields
    }

    fn supertypes(&self) -> &[String] {
        &self.supertypes
    }

    fn construct(&self, constructor: usize, args: Vec<Value>) -> Result<Box<dyn Instance>, Fault> {
        let f = self.table
                    .constructors
                    .get(constructor)
                    .ok_or_else(|| no_such_member("constructor", constructor, &self.name))?;
        let state = f(&args)?;
        Ok(Box::new(NativeInstance { class_name: self.name.clone(),
                                     state,
                                     table: Arc::clone(&self.table) }))
    }
}
