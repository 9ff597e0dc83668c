//! `Calculator`: sobrecargas numéricas y un par de métodos ambiguos a
//! propósito (`combine`).

use arena_core::model::{Fault, NativeArtifact, Value};

use super::{arg, int_arg};

fn float_arg(args: &[Value], i: usize) -> Result<f64, Fault> {
    let v = arg(args, i)?;
    v.as_f64()
     .ok_or_else(|| Fault::illegal_argument(&format!("argument #{i} is not numeric: {v}")))
}

fn text(v: &Value) -> String {
    match v.as_str() {
        Some(s) => s.to_string(),
        None => v.to_string(),
    }
}

pub fn calculator() -> NativeArtifact<()> {
    NativeArtifact::<()>::builder("Calculator").constructor(&[], |_| Ok(()))
                                               .method("add", &["int", "int"], "int", |_, a| {
                                                   Ok(Value::int(int_arg(a, 0)?.wrapping_add(int_arg(a, 1)?) as i32 as i64))
                                               })
                                               .method("add", &["long", "long"], "long", |_, a| {
                                                   Ok(Value::long(int_arg(a, 0)?.wrapping_add(int_arg(a, 1)?)))
                                               })
                                               .method("add", &["double", "double"], "double", |_, a| {
                                                   Ok(Value::double(float_arg(a, 0)? + float_arg(a, 1)?))
                                               })
                                               .method("sub", &["int", "int"], "int", |_, a| {
                                                   Ok(Value::int(int_arg(a, 0)?.wrapping_sub(int_arg(a, 1)?) as i32 as i64))
                                               })
                                               .method("mul", &["int", "int"], "int", |_, a| {
                                                   Ok(Value::int(int_arg(a, 0)?.wrapping_mul(int_arg(a, 1)?) as i32 as i64))
                                               })
                                               .method("div", &["int", "int"], "int", |_, a| {
                                                   let d = int_arg(a, 1)?;
                                                   if d == 0 {
                                                       return Err(Fault::new("java.lang.ArithmeticException", "/ by zero"));
                                                   }
                                                   Ok(Value::int(int_arg(a, 0)? / d))
                                               })
                                               .method("combine", &["java.lang.Object", "java.lang.String"], "java.lang.String", |_, a| {
                                                   Ok(Value::string(format!("{}+{}", text(arg(a, 0)?), text(arg(a, 1)?))))
                                               })
                                               .method("combine", &["java.lang.String", "java.lang.Object"], "java.lang.String", |_, a| {
                                                   Ok(Value::string(format!("{}-{}", text(arg(a, 0)?), text(arg(a, 1)?))))
                                               })
                                               .build()
}
