//! `ArrayStack`: pila sobre `Vec` con la API clásica `push/pop/peek/size`.

use arena_core::model::{Fault, NativeArtifact, Value};

use super::{arg, empty_stack, int_arg};

pub fn array_stack() -> NativeArtifact<Vec<Value>> {
    NativeArtifact::<Vec<Value>>::builder("ArrayStack").supertype("java.lang.Iterable")
                                                       .constructor(&[], |_| Ok(Vec::new()))
                                                       .constructor(&["int"], |args| {
                                                           let capacity = int_arg(args, 0)?;
                                                           let capacity = usize::try_from(capacity)
                                                               .map_err(|_| Fault::illegal_argument(&format!("Illegal Capacity: {capacity}")))?;
                                                           Ok(Vec::with_capacity(capacity))
                                                       })
                                                       .method("push", &["java.lang.Object"], "java.lang.Object", |s, args| {
                                                           let item = arg(args, 0)?.clone();
                                                           s.push(item.clone());
                                                           Ok(item)
                                                       })
                                                       .method("pop", &[], "java.lang.Object", |s, _| s.pop().ok_or_else(empty_stack))
                                                       .method("peek", &[], "java.lang.Object", |s, _| s.last().cloned().ok_or_else(empty_stack))
                                                       .method("size", &[], "int", |s, _| Ok(Value::int(s.len() as i64)))
                                                       .method("isEmpty", &[], "boolean", |s, _| Ok(Value::bool(s.is_empty())))
                                                       .build()
}
