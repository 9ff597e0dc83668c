//! Modelo de secuencias: statements, especificación, construcción desde
//! hojas, registros de ejecución, reportes y minimización.

pub mod builder;
pub mod minimizer;
pub mod record;
pub mod report;
pub mod specification;
pub mod statement;

pub use builder::SequenceBuilder;
pub use minimizer::minimize;
pub use record::{ExecutedInvocations, SequenceExecutionRecord, StatementOutcome};
pub use report::{oracle_report, RecordReport, StatementReport};
pub use specification::SequenceSpecification;
pub use statement::{Input, Statement, StatementKind};
