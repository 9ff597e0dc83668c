//! `FaultyStack`: pila que lanza una falla con `"fail"` y hace panic con
//! `"panic"`. Sirve para ejercitar el aislamiento de fallas del intérprete.

use arena_core::model::{Fault, NativeArtifact, Value};

use super::arg;

pub fn faulty_stack() -> NativeArtifact<Vec<Value>> {
    NativeArtifact::<Vec<Value>>::builder("FaultyStack").constructor(&[], |_| Ok(Vec::new()))
                                                        .method("push", &["java.lang.Object"], "java.lang.Object", |s, args| {
                                                            let item = arg(args, 0)?.clone();
                                                            match item.as_str() {
                                                                Some("fail") => Err(Fault::new("java.lang.IllegalStateException", "refusing 'fail'")),
                                                                Some("panic") => panic!("FaultyStack cannot hold 'panic'"),
                                                                _ => {
                                                                    s.push(item.clone());
                                                                    Ok(item)
                                                                }
                                                            }
                                                        })
                                                        .method("size", &[], "int", |s, _| Ok(Value::int(s.len() as i64)))
                                                        .build()
}
