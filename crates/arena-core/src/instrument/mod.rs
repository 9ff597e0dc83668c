//! Instrumentación de corridas: hooks de visitor, broadcast aislado a
//! listeners independientes y medición de tiempos.

mod composite;
mod listeners;
mod stopwatch;
mod visitor;

use std::any::Any;

pub use composite::CompositeVisitor;
pub use listeners::{EventRecorder, LoggingVisitor, TimingCollector};
pub use stopwatch::{ScopedMeasurement, Stopwatch, TimedRunner};
pub use visitor::{SequenceContext, SequenceVisitor};

/// Mensaje legible de un payload de panic.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
