//! `SequenceInterpreter`: ejecuta una lista de statements contra una
//! `AdaptedImplementation`.
//!
//! Rol en el flujo:
//! - Cada corrida tiene su propio `run_id`, sus propias instancias y su log
//!   (`ExecutedInvocations`). Nada mutable se comparte entre corridas.
//! - Por statement: `before_statement`, resolución de receptor y entradas,
//!   conversión a los tipos concretos del miembro ligado, invocación medida
//!   (`TimedRunner`), chequeo de oráculo y `after_statement`.
//! - Una falla de invocación cierra la corrida en `Failed`; lo ya
//!   registrado se conserva. `InvocationFailure::is_artifact_failure`
//!   separa las del artifact (falla o panic) de las del motor.
//! - Los desvíos del oráculo se registran; `CheckPolicy` decide si cortan.

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use uuid::Uuid;

use super::state::{FailureCause, RunState};
use crate::adaptation::{AdaptedImplementation, Binding};
use crate::errors::InvocationFailure;
use crate::eval::ExpressionEvaluator;
use crate::instrument::{panic_message, CompositeVisitor, SequenceContext, TimedRunner};
use crate::model::{ObjectRef, PrimitiveKind, TypeDescriptor, Value};
use crate::oracle::{CheckOutcome, Oracle};
use crate::sequence::{ExecutedInvocations, Input, SequenceExecutionRecord, SequenceSpecification, Statement, StatementKind,
                      StatementOutcome};

/// Qué hacer ante un valor que no coincide con el oráculo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckPolicy {
    /// Registrar y seguir.
    #[default]
    RecordOnly,
    /// Registrar y cerrar la corrida en `Failed`.
    AbortOnMismatch,
}

impl CheckPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "record" | "record_only" | "record-only" => Some(CheckPolicy::RecordOnly),
            "abort" | "abort_on_mismatch" | "abort-on-mismatch" => Some(CheckPolicy::AbortOnMismatch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub check_policy: CheckPolicy,
    /// Máximo de statements por corrida (`None` = sin límite).
    pub max_statements: Option<usize>,
}

pub struct SequenceInterpreter<'e> {
    config: InterpreterConfig,
    evaluator: &'e dyn ExpressionEvaluator,
}

impl<'e> SequenceInterpreter<'e> {
    pub fn new(evaluator: &'e dyn ExpressionEvaluator) -> Self {
        Self { config: InterpreterConfig::default(),
               evaluator }
    }

    pub fn with_config(evaluator: &'e dyn ExpressionEvaluator, config: InterpreterConfig) -> Self {
        Self { config, evaluator }
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    pub fn execute(&self,
                   statements: &[Statement],
                   implementation: &AdaptedImplementation,
                   oracle: &Oracle,
                   visitors: &CompositeVisitor)
                   -> ExecutedInvocations {
        self.run("sequence", statements, implementation, oracle, visitors)
    }

    pub fn execute_sequence(&self,
                            sequence: &SequenceSpecification,
                            implementation: &AdaptedImplementation,
                            visitors: &CompositeVisitor)
                            -> ExecutedInvocations {
        self.run(&sequence.name, &sequence.statements, implementation, &sequence.oracle, visitors)
    }

    /// Ejecuta varios pares (secuencia, implementación) en paralelo. El
    /// resultado conserva el orden de `jobs`.
    pub fn execute_all(&self,
                       jobs: &[(Arc<SequenceSpecification>, Arc<AdaptedImplementation>)],
                       visitors: &CompositeVisitor)
                       -> Vec<SequenceExecutionRecord> {
        jobs.par_iter()
            .map(|(sequence, implementation)| {
                let executed = self.execute_sequence(sequence, implementation, visitors);
                SequenceExecutionRecord::new(Some(Arc::clone(sequence)), &implementation.identity()).with_executed(executed)
            })
            .collect()
    }

    fn run(&self,
           name: &str,
           statements: &[Statement],
           implementation: &AdaptedImplementation,
           oracle: &Oracle,
           visitors: &CompositeVisitor)
           -> ExecutedInvocations {
        let run_id = Uuid::new_v4();
        let identity = implementation.identity();
        let ctx = SequenceContext { run_id,
                                    sequence: name,
                                    implementation: &identity,
                                    statement_count: statements.len() };
        let mut executed = ExecutedInvocations::new(run_id);
        let mut produced: Vec<Option<Value>> = Vec::with_capacity(statements.len());
        let runner = TimedRunner::new();

        visitors.before_sequence(&ctx);
        for (index, statement) in statements.iter().enumerate() {
            if let Some(limit) = self.config.max_statements.filter(|limit| index >= *limit) {
                executed.state = RunState::Failed { statement: index,
                                                    cause: FailureCause::Invocation(InvocationFailure::BudgetExceeded { limit }) };
                break;
            }
            if !executed.state.advance(index) {
                warn!("run {run_id}: refusing out-of-order statement {index} in state {}", executed.state.label());
                break;
            }
            visitors.before_statement(&ctx, index, statement);

            let result = runner.run(|| {
                                   catch_unwind(AssertUnwindSafe(|| self.step(index, statement, implementation, &produced)))
                                       .unwrap_or_else(|payload| Err(InvocationFailure::Panicked(panic_message(payload.as_ref()))))
                               });
            let check = match &result {
                Ok(value) => oracle.check(index, value, &produced),
                Err(_) => CheckOutcome::Skipped,
            };
            produced.push(result.as_ref().ok().cloned());
            let outcome = StatementOutcome { index,
                                             result,
                                             elapsed_ns: runner.elapsed_ns(),
                                             check };
            visitors.after_statement(&ctx, statement, &outcome);

            let cause = match (&outcome.result, &outcome.check) {
                (Err(failure), _) => Some(FailureCause::Invocation(failure.clone())),
                (_, CheckOutcome::Failed(mismatch)) if self.config.check_policy == CheckPolicy::AbortOnMismatch => {
                    Some(FailureCause::CheckMismatch(mismatch.clone()))
                }
                _ => None,
            };
            executed.outcomes.push(outcome);
            if let Some(cause) = cause {
                debug!("run {run_id}: {name} on {identity} failed at statement {index}: {cause}");
                executed.state = RunState::Failed { statement: index, cause };
                break;
            }
        }
        if !executed.state.is_terminal() {
            executed.state = RunState::Completed;
        }
        visitors.after_sequence(&ctx, &executed);
        executed
    }

    fn step(&self,
            index: usize,
            statement: &Statement,
            implementation: &AdaptedImplementation,
            produced: &[Option<Value>])
            -> Result<Value, InvocationFailure> {
        match statement.kind {
            StatementKind::Eval => match statement.inputs.first() {
                Some(Input::Expr(code)) => self.evaluator.eval(code).map_err(InvocationFailure::Evaluation),
                _ => Err(binding_error(index, "eval statement without expression")),
            },
            StatementKind::Create => match statement.slot {
                Some(slot) => {
                    let Some(Binding::Initializer(ctor)) = implementation.binding(slot) else {
                        return Err(binding_error(index, &format!("slot {slot} is not bound to a constructor")));
                    };
                    let args = self.arguments(index, statement, implementation, slot, produced)?;
                    let instance = implementation.artifact()
                                                 .construct(ctor, args)
                                                 .map_err(InvocationFailure::Fault)?;
                    Ok(Value::object(ObjectRef::new(instance)))
                }
                None => self.external_create(index, statement, produced),
            },
            StatementKind::Invoke => {
                let slot = statement.slot
                                    .ok_or_else(|| binding_error(index, &format!("{} has no interface slot", statement.operation)))?;
                let target = target_object(index, statement, produced)?;
                let binding = implementation.binding(slot)
                                            .ok_or_else(|| binding_error(index, &format!("slot {slot} is not bound")))?;
                let mut args = self.arguments(index, statement, implementation, slot, produced)?;
                let result = match binding {
                    Binding::Method(method) => target.with_instance(|inst| inst.invoke(method, args)),
                    Binding::FieldRead(field) => target.with_instance(|inst| inst.get_field(field)),
                    Binding::FieldWrite(field) => {
                        let value = args.pop().ok_or_else(|| binding_error(index, "field write without value"))?;
                        target.with_instance(|inst| inst.set_field(field, value).map(|_| Value::void()))
                    }
                    Binding::Initializer(_) => {
                        return Err(binding_error(index, &format!("{} is bound to a constructor", statement.operation)));
                    }
                };
                result.and_then(|r| r).map_err(InvocationFailure::Fault)
            }
            StatementKind::FieldAccess => {
                let target = target_object(index, statement, produced)?;
                let fields = implementation.artifact().fields();
                let field = fields.iter()
                                  .position(|f| f.name == statement.operation)
                                  .ok_or_else(|| {
                                      binding_error(index,
                                                    &format!("{} declares no field {}", implementation.artifact().name(), statement.operation))
                                  })?;
                match statement.inputs.first() {
                    None => target.with_instance(|inst| inst.get_field(field))
                                  .and_then(|r| r)
                                  .map_err(InvocationFailure::Fault),
                    Some(input) => {
                        let value = self.resolve_input(index, input, produced)?
                                        .coerce_to(&fields[field].value_type)
                                        .map_err(|reason| coercion_error(index, reason))?;
                        target.with_instance(|inst| inst.set_field(field, value))
                              .and_then(|r| r)
                              .map(|_| Value::void())
                              .map_err(InvocationFailure::Fault)
                    }
                }
            }
        }
    }

    /// Entradas resueltas y convertidas a los tipos concretos del slot.
    fn arguments(&self,
                 index: usize,
                 statement: &Statement,
                 implementation: &AdaptedImplementation,
                 slot: usize,
                 produced: &[Option<Value>])
                 -> Result<Vec<Value>, InvocationFailure> {
        let params = implementation.parameter_types(slot)
                                   .ok_or_else(|| binding_error(index, &format!("slot {slot} is not bound")))?;
        if params.len() != statement.inputs.len() {
            return Err(binding_error(index,
                                     &format!("{} expects {} arguments, statement has {}",
                                              statement.operation,
                                              params.len(),
                                              statement.inputs.len())));
        }
        statement.inputs
                 .iter()
                 .zip(&params)
                 .map(|(input, param)| {
                     self.resolve_input(index, input, produced)?
                         .coerce_to(param)
                         .map_err(|reason| coercion_error(index, reason))
                 })
                 .collect()
    }

    fn resolve_input(&self, index: usize, input: &Input, produced: &[Option<Value>]) -> Result<Value, InvocationFailure> {
        match input {
            Input::Literal(value) => Ok(value.clone()),
            Input::Ref(other) => produced.get(*other).and_then(Option::as_ref).cloned().ok_or_else(|| {
                                                                                        InvocationFailure::InvalidTarget {
                                                                                            statement: index,
                                                                                            reason: format!("${other} produced no value"),
                                                                                        }
                                                                                    }),
            Input::Expr(code) => self.evaluator.eval(code).map_err(InvocationFailure::Evaluation),
        }
    }

    /// `create` de un tipo ajeno a la interfaz (`java.lang.String 'x'`): el
    /// valor es el argumento convertido al tipo pedido, o su valor por defecto.
    fn external_create(&self, index: usize, statement: &Statement, produced: &[Option<Value>]) -> Result<Value, InvocationFailure> {
        match statement.inputs.as_slice() {
            [] => Ok(default_value(&statement.result_type)),
            [input] => self.resolve_input(index, input, produced)?
                           .coerce_to(&statement.result_type)
                           .map_err(|reason| coercion_error(index, reason)),
            more => Err(binding_error(index,
                                      &format!("cannot create {} from {} arguments", statement.operation, more.len()))),
        }
    }
}

fn target_object(index: usize, statement: &Statement, produced: &[Option<Value>]) -> Result<ObjectRef, InvocationFailure> {
    let target = statement.target.ok_or_else(|| InvocationFailure::InvalidTarget { statement: index,
                                                                                  reason: "missing receiver".into() })?;
    let value = produced.get(target)
                        .and_then(Option::as_ref)
                        .ok_or_else(|| InvocationFailure::InvalidTarget { statement: index,
                                                                          reason: format!("${target} produced no value") })?;
    value.as_object().cloned().ok_or_else(|| InvocationFailure::InvalidTarget { statement: index,
                                                                              reason: format!("${target} is not an object ({value})") })
}

fn default_value(ty: &TypeDescriptor) -> Value {
    match ty {
        TypeDescriptor::Primitive(PrimitiveKind::Boolean) => Value::bool(false),
        TypeDescriptor::Primitive(PrimitiveKind::Char) => Value::char('\0'),
        TypeDescriptor::Primitive(_) => Value::int(0).coerce_to(ty).unwrap_or_else(|_| Value::int(0)),
        TypeDescriptor::Array(elem) => Value::array(Vec::new(), (**elem).clone()),
        t if *t == TypeDescriptor::string() => Value::string(""),
        _ => Value::null(),
    }
}

fn binding_error(statement: usize, reason: &str) -> InvocationFailure {
    InvocationFailure::Binding { statement,
                                 reason: reason.to_string() }
}

fn coercion_error(statement: usize, reason: String) -> InvocationFailure {
    InvocationFailure::Coercion { statement, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptation::{AdaptationStrategy, PassThrough};
    use crate::eval::LiteralEvaluator;
    use crate::event::SequenceEventKind;
    use crate::instrument::EventRecorder;
    use crate::model::{Artifact, Fault, InterfaceSpecification, NativeArtifact, Operation};

    fn counter_interface() -> Arc<InterfaceSpecification> {
        Arc::new(InterfaceSpecification::new("Counter",
                                             vec![Operation::new("inc", vec![], TypeDescriptor::int()),
                                                  Operation::new("fail", vec![], TypeDescriptor::Void)]))
    }

    fn counter_impl() -> AdaptedImplementation {
        let artifact: Arc<dyn Artifact> =
            Arc::new(NativeArtifact::<i64>::builder("Counter").constructor(&[], |_| Ok(0))
                                                              .method("inc", &[], "int", |s, _| {
                                                                  *s += 1;
                                                                  Ok(Value::int(*s))
                                                              })
                                                              .method("fail", &[], "void", |_, _| Err(Fault::new("Boom", "always")))
                                                              .build());
        PassThrough.adapt(&counter_interface(), &artifact, 0)
                   .expect("adapt")
                   .remove(0)
    }

    fn create() -> Statement {
        Statement::create("Counter", Some(0), vec![], TypeDescriptor::Reference("Counter".into()))
    }

    fn inc() -> Statement {
        Statement::invoke(0, "inc", 1, vec![], TypeDescriptor::int())
    }

    #[test]
    fn records_each_statement_and_completes() {
        let evaluator = LiteralEvaluator::new();
        let interpreter = SequenceInterpreter::new(&evaluator);
        let oracle = Oracle::new().expect(2, Value::int(2));
        let run = interpreter.execute(&[create(), inc(), inc()], &counter_impl(), &oracle, &CompositeVisitor::new());
        assert!(run.is_completed());
        assert_eq!(run.outcomes.len(), 3);
        assert_eq!(run.value(2), Some(&Value::int(2)));
        assert_eq!(run.outcome(2).map(|o| o.check.clone()), Some(CheckOutcome::Passed));
    }

    #[test]
    fn fault_stops_run_and_keeps_previous_outcomes() {
        let evaluator = LiteralEvaluator::new();
        let interpreter = SequenceInterpreter::new(&evaluator);
        let statements = vec![create(), Statement::invoke(0, "fail", 2, vec![], TypeDescriptor::Void), inc()];
        let run = interpreter.execute(&statements, &counter_impl(), &Oracle::new(), &CompositeVisitor::new());
        assert_eq!(run.outcomes.len(), 2);
        assert!(matches!(run.state,
                         RunState::Failed { statement: 1, cause: FailureCause::Invocation(InvocationFailure::Fault(ref f)) } if f.kind == "Boom"));
    }

    #[test]
    fn mismatch_policy_decides_continuation() {
        let evaluator = LiteralEvaluator::new();
        let oracle = Oracle::new().expect(1, Value::int(7));
        let statements = vec![create(), inc(), inc()];

        let lenient = SequenceInterpreter::new(&evaluator);
        let run = lenient.execute(&statements, &counter_impl(), &oracle, &CompositeVisitor::new());
        assert!(run.is_completed());
        assert_eq!(run.check_failures().len(), 1);

        let strict = SequenceInterpreter::with_config(&evaluator,
                                                      InterpreterConfig { check_policy: CheckPolicy::AbortOnMismatch,
                                                                          max_statements: None });
        let run = strict.execute(&statements, &counter_impl(), &oracle, &CompositeVisitor::new());
        assert_eq!(run.outcomes.len(), 2);
        assert!(matches!(run.state, RunState::Failed { statement: 1, cause: FailureCause::CheckMismatch(_) }));
    }

    #[test]
    fn statement_budget_is_enforced() {
        let evaluator = LiteralEvaluator::new();
        let interpreter = SequenceInterpreter::with_config(&evaluator,
                                                           InterpreterConfig { check_policy: CheckPolicy::RecordOnly,
                                                                               max_statements: Some(2) });
        let run = interpreter.execute(&[create(), inc(), inc()], &counter_impl(), &Oracle::new(), &CompositeVisitor::new());
        assert_eq!(run.outcomes.len(), 2);
        assert!(matches!(run.state,
                         RunState::Failed { statement: 2, cause: FailureCause::Invocation(InvocationFailure::BudgetExceeded { limit: 2 }) }));
    }

    #[test]
    fn external_create_and_invalid_receiver() {
        let evaluator = LiteralEvaluator::new();
        let interpreter = SequenceInterpreter::new(&evaluator);
        let statements = vec![Statement::create("java.lang.String", None, vec![Input::Literal(Value::string("x"))], TypeDescriptor::string()),
                              Statement::invoke(0, "inc", 1, vec![], TypeDescriptor::int())];
        let run = interpreter.execute(&statements, &counter_impl(), &Oracle::new(), &CompositeVisitor::new());
        assert_eq!(run.value(0).and_then(Value::as_str), Some("x"));
        assert!(matches!(run.state,
                         RunState::Failed { statement: 1, cause: FailureCause::Invocation(InvocationFailure::InvalidTarget { .. }) }));
    }

    #[test]
    fn engine_errors_are_recorded_apart_from_artifact_faults() {
        let evaluator = LiteralEvaluator::new();
        let interpreter = SequenceInterpreter::new(&evaluator);
        let recorder = Arc::new(EventRecorder::new());
        let visitors = CompositeVisitor::new().with(recorder.clone());

        let thrown = interpreter.execute(&[create(), Statement::invoke(0, "fail", 2, vec![], TypeDescriptor::Void)],
                                         &counter_impl(),
                                         &Oracle::new(),
                                         &visitors);
        assert_eq!(recorder.trace(thrown.run_id), "SsfsxF");

        let not_an_object = vec![Statement::create("java.lang.String", None, vec![Input::Literal(Value::string("x"))], TypeDescriptor::string()),
                                 inc()];
        let rejected = interpreter.execute(&not_an_object, &counter_impl(), &Oracle::new(), &visitors);
        assert_eq!(recorder.trace(rejected.run_id), "SsfsrF");
        assert!(matches!(recorder.events(rejected.run_id)[3].kind,
                         SequenceEventKind::StatementRejected { index: 1, .. }));
    }

    #[test]
    fn char_argument_reaches_a_double_parameter() {
        let interface = Arc::new(InterfaceSpecification::new("Acc",
                                                             vec![Operation::new("add",
                                                                                 vec![TypeDescriptor::Primitive(PrimitiveKind::Char)],
                                                                                 TypeDescriptor::Primitive(PrimitiveKind::Double))]));
        let artifact: Arc<dyn Artifact> =
            Arc::new(NativeArtifact::<f64>::builder("Acc").constructor(&[], |_| Ok(0.0))
                                                          .method("add", &["double"], "double", |s, args| {
                                                              *s += args.first().and_then(Value::as_f64).unwrap_or(0.0);
                                                              Ok(Value::double(*s))
                                                          })
                                                          .build());
        let implementation = PassThrough.adapt(&interface, &artifact, 0).expect("adapt").remove(0);
        let evaluator = LiteralEvaluator::new();
        let statements = vec![Statement::create("Acc", Some(0), vec![], TypeDescriptor::Reference("Acc".into())),
                              Statement::invoke(0, "add", 1, vec![Input::Literal(Value::char('a'))], TypeDescriptor::Primitive(PrimitiveKind::Double))];
        let run = SequenceInterpreter::new(&evaluator).execute(&statements, &implementation, &Oracle::new(), &CompositeVisitor::new());
        assert!(run.is_completed(), "{:?}", run.state);
        assert_eq!(run.value(1).and_then(Value::as_f64), Some(97.0));
    }

    #[test]
    fn check_policy_names() {
        assert_eq!(CheckPolicy::from_name("abort"), Some(CheckPolicy::AbortOnMismatch));
        assert_eq!(CheckPolicy::from_name("Record"), Some(CheckPolicy::RecordOnly));
        assert_eq!(CheckPolicy::from_name("maybe"), None);
    }
}
