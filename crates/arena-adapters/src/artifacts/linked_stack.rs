//! `LinkedStack`: misma semántica de pila con otros nombres; sólo se adapta
//! por firma.

use arena_core::model::{NativeArtifact, Value};
use std::collections::VecDeque;

use super::{arg, empty_stack};

pub fn linked_stack() -> NativeArtifact<VecDeque<Value>> {
    NativeArtifact::<VecDeque<Value>>::builder("LinkedStack").supertype("java.util.Deque")
                                                             .constructor(&[], |_| Ok(VecDeque::new()))
                                                             .method("addFirst", &["java.lang.Object"], "java.lang.Object", |s, args| {
                                                                 let item = arg(args, 0)?.clone();
                                                                 s.push_front(item.clone());
                                                                 Ok(item)
                                                             })
                                                             .method("removeFirst", &[], "java.lang.Object", |s, _| s.pop_front().ok_or_else(empty_stack))
                                                             .method("peekFirst", &[], "java.lang.Object", |s, _| {
                                                                 Ok(s.front().cloned().unwrap_or_else(Value::null))
                                                             })
                                                             .method("length", &[], "int", |s, _| Ok(Value::int(s.len() as i64)))
                                                             .read_only_field("count", "int", |s| Value::int(s.len() as i64))
                                                             .build()
}
