//! arena-core: adaptación de artifacts a interfaces y ejecución de
//! secuencias de estímulos con chequeo de oráculo.
pub mod adaptation;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod eval;
pub mod event;
pub mod hashing;
pub mod instrument;
pub mod lql;
pub mod model;
pub mod oracle;
pub mod resolve;
pub mod sequence;
pub mod sheet;

pub use adaptation::{strategy_by_name, AdaptationStrategy, AdaptedImplementation, Binding, PassThrough, SignatureMatching};
pub use engine::{CheckPolicy, FailureCause, InterpreterConfig, RunState, SequenceInterpreter};
pub use errors::{AdaptationError, BuildError, CoreEngineError, InvocationFailure, ListenerFailure, LqlError, ParseFailure,
                 ResolutionFailure};
pub use eval::{ExpressionEvaluator, LiteralEvaluator, TypeResolutionContext};
pub use event::{EventStore, InMemoryEventStore, SequenceEvent, SequenceEventKind, SharedEventStore};
pub use instrument::{CompositeVisitor, EventRecorder, LoggingVisitor, SequenceContext, SequenceVisitor, Stopwatch, TimedRunner,
                     TimingCollector};
pub use lql::{parse_interfaces, parse_lql, LqlDocument};
pub use model::{Artifact, Fault, Instance, InterfaceSpecification, NativeArtifact, Operation, TypeDescriptor, Value};
pub use oracle::{CheckFailure, CheckOutcome, Expected, Oracle};
pub use resolve::{MemberResolver, Resolution};
pub use sequence::{minimize, ExecutedInvocations, RecordReport, SequenceBuilder, SequenceExecutionRecord, SequenceSpecification,
                   Statement};
pub use sheet::{ParsedSheet, SheetParser};
