use arena_core::errors::CoreEngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("Error del motor: {0}")]
    Core(#[from] CoreEngineError),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error de serialización: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Tiempo agotado: {sequence} en {implementation} superó {timeout_ms} ms")]
    Timeout {
        sequence: String,
        implementation: String,
        timeout_ms: u64,
    },
    #[error("Error interno: {0}")]
    Internal(String),
}
