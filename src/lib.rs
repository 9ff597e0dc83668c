//! Arena Rust Library
//!
//! Capa de aplicación sobre `arena-core`:
//! - `config`: configuración `ARENA_*` desde el entorno (.env opcional).
//! - `errors`: `ArenaError`, que envuelve los errores del motor.
//! - `batch`: corridas por lote con tiempo máximo, minimización y publicación.
//! - `reporting`: sinks de reportes (memoria, JSONL).
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod batch;
pub mod config;
pub mod errors;
pub mod reporting;

pub use batch::{plan, BatchJob, BatchOutcome, BatchPlan, BatchRunner};
pub use config::{ArenaConfig, CONFIG};
pub use errors::ArenaError;
pub use reporting::{InMemorySink, JsonlFileSink, PublishedReport, RecordSink};
