//! Artifacts de ejemplo.

mod account;
mod array_stack;
mod calculator;
mod faulty_stack;
mod linked_stack;

pub use account::account;
pub use array_stack::array_stack;
pub use calculator::calculator;
pub use faulty_stack::faulty_stack;
pub use linked_stack::linked_stack;

use arena_core::model::{Fault, Value};

/// Argumento `i`; la aridad ya fue validada al resolver, pero un artifact
/// no confía en su llamador.
pub(crate) fn arg(args: &[Value], i: usize) -> Result<&Value, Fault> {
    args.get(i)
        .ok_or_else(|| Fault::illegal_argument(&format!("missing argument #{i}")))
}

pub(crate) fn int_arg(args: &[Value], i: usize) -> Result<i64, Fault> {
    let v = arg(args, i)?;
    v.as_i64()
     .ok_or_else(|| Fault::illegal_argument(&format!("argument #{i} is not integral: {v}")))
}

pub(crate) fn empty_stack() -> Fault {
    Fault::new("java.util.EmptyStackException", "stack is empty")
}
