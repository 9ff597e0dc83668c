//! `CompositeVisitor`: reparte cada hook a todos sus listeners.
//!
//! Cada llamada a un listener se protege por separado: un `Err` o un panic
//! se loguea con `warn!`, se cuenta y se descarta. Los demás listeners
//! reciben el hook igual y la corrida continúa.

use log::warn;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::panic_message;
use super::visitor::{SequenceContext, SequenceVisitor};
use crate::errors::ListenerFailure;
use crate::sequence::{ExecutedInvocations, Statement, StatementOutcome};

#[derive(Default)]
pub struct CompositeVisitor {
    listeners: Vec<Arc<dyn SequenceVisitor>>,
    isolated: AtomicUsize,
}

impl CompositeVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, listener: Arc<dyn SequenceVisitor>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn add(&mut self, listener: Arc<dyn SequenceVisitor>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Fallas de listeners aisladas desde la creación.
    pub fn isolated_failures(&self) -> usize {
        self.isolated.load(Ordering::Relaxed)
    }

    pub fn before_sequence(&self, ctx: &SequenceContext<'_>) {
        self.dispatch("before_sequence", |l| l.before_sequence(ctx));
    }

    pub fn before_statement(&self, ctx: &SequenceContext<'_>, index: usize, statement: &Statement) {
        self.dispatch("before_statement", |l| l.before_statement(ctx, index, statement));
    }

    pub fn after_statement(&self, ctx: &SequenceContext<'_>, statement: &Statement, outcome: &StatementOutcome) {
        self.dispatch("after_statement", |l| l.after_statement(ctx, statement, outcome));
    }

    pub fn after_sequence(&self, ctx: &SequenceContext<'_>, executed: &ExecutedInvocations) {
        self.dispatch("after_sequence", |l| l.after_sequence(ctx, executed));
    }

    fn dispatch<F>(&self, hook: &str, call: F)
        where F: Fn(&dyn SequenceVisitor) -> Result<(), ListenerFailure>
    {
        for listener in &self.listeners {
            let failure = match catch_unwind(AssertUnwindSafe(|| call(listener.as_ref()))) {
                Ok(Ok(())) => continue,
                Ok(Err(failure)) => failure,
                Err(payload) => ListenerFailure::new(listener.name(), hook, &panic_message(payload.as_ref())),
            };
            self.isolated.fetch_add(1, Ordering::Relaxed);
            warn!("{failure}");
        }
    }
}

impl std::fmt::Debug for CompositeVisitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.listeners.iter().map(|l| l.name()).collect();
        f.debug_struct("CompositeVisitor").field("listeners", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct Failing;
    impl SequenceVisitor for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn before_sequence(&self, _ctx: &SequenceContext<'_>) -> Result<(), ListenerFailure> {
            Err(ListenerFailure::new("failing", "before_sequence", "nope"))
        }
        fn before_statement(&self, _: &SequenceContext<'_>, _: usize, _: &Statement) -> Result<(), ListenerFailure> {
            panic!("listener blew up")
        }
    }

    #[derive(Default)]
    struct Counting(Mutex<Vec<String>>);
    impl SequenceVisitor for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        fn before_sequence(&self, ctx: &SequenceContext<'_>) -> Result<(), ListenerFailure> {
            self.0.lock().expect("lock").push(format!("seq:{}", ctx.sequence));
            Ok(())
        }
        fn before_statement(&self, _: &SequenceContext<'_>, index: usize, _: &Statement) -> Result<(), ListenerFailure> {
            self.0.lock().expect("lock").push(format!("st:{index}"));
            Ok(())
        }
    }

    #[test]
    fn failing_listener_does_not_block_others() {
        let counting = Arc::new(Counting::default());
        let composite = CompositeVisitor::new().with(Arc::new(Failing)).with(counting.clone());
        let ctx = SequenceContext { run_id: Uuid::new_v4(),
                                    sequence: "S",
                                    implementation: "impl",
                                    statement_count: 1 };
        let st = Statement::eval("1", crate::model::TypeDescriptor::int());
        composite.before_sequence(&ctx);
        composite.before_statement(&ctx, 0, &st);
        assert_eq!(composite.isolated_failures(), 2);
        assert_eq!(*counting.0.lock().expect("lock"), vec!["seq:S".to_string(), "st:0".to_string()]);
    }
}
