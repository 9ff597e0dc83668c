//! Motor de ejecución de secuencias.
//!
//! Provee el intérprete, su configuración y la máquina de estados de una
//! corrida.

mod interpreter;
mod state;

pub use interpreter::{CheckPolicy, InterpreterConfig, SequenceInterpreter};
pub use state::{FailureCause, RunState};
