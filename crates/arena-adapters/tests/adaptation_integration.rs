//! Tests de integración: adaptación de los artifacts del catálogo y
//! ejecución directa de statements sobre ellos.

use std::sync::Arc;

use arena_adapters::find;
use arena_core::adaptation::{AdaptationStrategy, Binding, PassThrough, SignatureMatching};
use arena_core::engine::{FailureCause, RunState, SequenceInterpreter};
use arena_core::errors::{AdaptationError, InvocationFailure, ResolutionFailure};
use arena_core::eval::LiteralEvaluator;
use arena_core::instrument::CompositeVisitor;
use arena_core::lql::parse_interfaces;
use arena_core::model::{Artifact, InterfaceSpecification, TypeDescriptor, Value};
use arena_core::oracle::Oracle;
use arena_core::sequence::{Input, Statement};

fn interface(lql: &str) -> Arc<InterfaceSpecification> {
    Arc::new(parse_interfaces(lql).expect("valid lql").remove(0))
}

fn artifact(name: &str) -> Arc<dyn Artifact> {
    find(name).expect("catalogued artifact")
}

#[test]
fn signature_matching_adapts_differently_named_stack() {
    let stack = interface("Stack { push(java.lang.String); size()->int }");
    let impls = SignatureMatching::default().adapt(&stack, &artifact("LinkedStack"), -1)
                                            .expect("adaptable by signature");
    assert_eq!(impls.len(), 1);
    assert_eq!(impls[0].bindings(), &[Binding::Initializer(0), Binding::Method(0), Binding::Method(3)]);

    // por nombre no hay `push` ni `size`
    let err = PassThrough.adapt(&stack, &artifact("LinkedStack"), 0).expect_err("names differ");
    assert!(matches!(err, AdaptationError::Resolution { ref operation, .. } if operation == "push"));
}

#[test]
fn signature_variants_follow_ranking_and_limit() {
    let calc = interface("Calc { add(int, int)->int }");
    let calculator = artifact("Calculator");
    let all = SignatureMatching::default().adapt(&calc, &calculator, -1).expect("variants");
    let bound: Vec<String> = all.iter()
                                .map(|i| i.member(1).map(|m| m.name.clone()).unwrap_or_default())
                                .collect();
    assert_eq!(bound, vec!["add", "sub", "mul", "div"]);

    let third = SignatureMatching::default().adapt(&calc, &calculator, 2).expect("variant 2");
    assert_eq!(third[0].variant(), 2);
    assert_eq!(third[0].member(1).map(|m| m.name.as_str()), Some("mul"));

    let err = SignatureMatching::default().adapt(&calc, &calculator, 7).expect_err("out of range");
    assert!(matches!(err, AdaptationError::VariantOutOfRange { requested: 7, available: 4 }));

    assert_eq!(SignatureMatching::new(2).adapt(&calc, &calculator, -1).expect("limited").len(), 2);
}

#[test]
fn ambiguous_overloads_fail_the_whole_adaptation() {
    let calc = interface("Calculator { combine(java.lang.String, java.lang.String)->java.lang.String }");
    let err = PassThrough.adapt(&calc, &artifact("Calculator"), 0).expect_err("ambiguous");
    match err {
        AdaptationError::Resolution { operation, source: ResolutionFailure::Ambiguous { tied, .. } } => {
            assert_eq!(operation, "combine");
            assert_eq!(tied.len(), 2);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn fields_back_operations_without_methods() {
    let account = interface("Account { deposit(int); balance()->int; balance(int) }");
    let adapted = PassThrough.adapt(&account, &artifact("Account"), 0).expect("adapt").remove(0);
    assert_eq!(adapted.binding(2), Some(Binding::FieldRead(0)));
    assert_eq!(adapted.binding(3), Some(Binding::FieldWrite(0)));

    let evaluator = LiteralEvaluator::new();
    let interpreter = SequenceInterpreter::new(&evaluator);
    let statements = vec![Statement::create("Account", Some(0), vec![], TypeDescriptor::Reference("Account".into())),
                          Statement::invoke(0, "deposit", 1, vec![Input::Literal(Value::int(5))], TypeDescriptor::Void),
                          Statement::invoke(0, "balance", 3, vec![Input::Literal(Value::int(10))], TypeDescriptor::Void),
                          Statement::invoke(0, "balance", 2, vec![], TypeDescriptor::int()),
                          Statement::field(0, "owner", None)];
    let oracle = Oracle::new().expect(3, Value::int(10)).expect(4, Value::string(""));
    let run = interpreter.execute(&statements, &adapted, &oracle, &CompositeVisitor::new());
    assert!(run.is_completed(), "state: {:?}", run.state);
    assert!(run.check_failures().is_empty());
    assert_eq!(run.value(3), Some(&Value::int(10)));
}

#[test]
fn final_field_write_is_a_fault() {
    let account = interface("Account { deposit(int) }");
    let adapted = PassThrough.adapt(&account, &artifact("Account"), 0).expect("adapt").remove(0);
    let evaluator = LiteralEvaluator::new();
    let statements = vec![Statement::create("Account", Some(0), vec![], TypeDescriptor::Reference("Account".into())),
                          Statement::field(0, "owner", Some(Input::Literal(Value::string("eve"))))];
    let run = SequenceInterpreter::new(&evaluator).execute(&statements, &adapted, &Oracle::new(), &CompositeVisitor::new());
    assert!(matches!(run.state,
                     RunState::Failed { statement: 1, cause: FailureCause::Invocation(InvocationFailure::Fault(ref f)) }
                     if f.kind == "java.lang.IllegalAccessException"));
}

#[test]
fn panicking_artifact_is_contained() {
    let stack = interface("Stack { push(java.lang.String)->java.lang.String; size()->int }");
    let adapted = PassThrough.adapt(&stack, &artifact("FaultyStack"), 0).expect("adapt").remove(0);
    let evaluator = LiteralEvaluator::new();
    let statements = vec![Statement::create("Stack", Some(0), vec![], TypeDescriptor::Reference("Stack".into())),
                          Statement::invoke(0, "push", 1, vec![Input::Literal(Value::string("ok"))], TypeDescriptor::string()),
                          Statement::invoke(0, "push", 1, vec![Input::Literal(Value::string("panic"))], TypeDescriptor::string()),
                          Statement::invoke(0, "size", 2, vec![], TypeDescriptor::int())];
    let run = SequenceInterpreter::new(&evaluator).execute(&statements, &adapted, &Oracle::new(), &CompositeVisitor::new());
    assert_eq!(run.outcomes.len(), 3);
    assert_eq!(run.value(1).and_then(Value::as_str), Some("ok"));
    assert!(matches!(run.state,
                     RunState::Failed { statement: 2, cause: FailureCause::Invocation(InvocationFailure::Panicked(ref msg)) }
                     if msg.contains("panic")));
}
