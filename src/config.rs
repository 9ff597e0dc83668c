//! Configuración de la aplicación desde variables de entorno.
//!
//! Variables reconocidas (todas opcionales):
//! - `ARENA_CHECK_POLICY`: `record` (por defecto) o `abort`.
//! - `ARENA_ADAPTER_LIMIT`: variantes máximas por adaptación (5).
//! - `ARENA_MAX_STATEMENTS`: statements máximos por corrida (10000, 0 = sin límite).
//! - `ARENA_SEQUENCE_TIMEOUT_MS`: tiempo máximo por corrida en el batch (5000).
//! - `ARENA_WORKERS`: corridas concurrentes (0 = paralelismo disponible).
//! - `ARENA_REPORT_PATH`: archivo JSONL donde publicar reportes.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use arena_core::constants::DEFAULT_ADAPTER_LIMIT;
use arena_core::engine::{CheckPolicy, InterpreterConfig};
use dotenvy::dotenv;
use log::warn;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::errors::core_error::ArenaError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Configuración global, leída la primera vez que se usa.
pub static CONFIG: Lazy<ArenaConfig> = Lazy::new(ArenaConfig::from_env);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArenaConfig {
    pub check_policy: CheckPolicy,
    pub adapter_limit: usize,
    pub max_statements: usize,
    pub sequence_timeout_ms: u64,
    pub workers: usize,
    pub report_path: Option<PathBuf>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self { check_policy: CheckPolicy::RecordOnly,
               adapter_limit: DEFAULT_ADAPTER_LIMIT,
               max_statements: 10_000,
               sequence_timeout_ms: 5_000,
               workers: 0,
               report_path: None }
    }
}

impl ArenaConfig {
    /// Lee `ARENA_*`; valores ausentes o ilegibles toman el valor por defecto.
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero falla ante valores presentes e inválidos.
    pub fn try_from_env() -> Result<Self, ArenaError> {
        Lazy::force(&DOTENV_LOADED);
        Self::try_from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        match Self::try_from_lookup(&lookup) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("{e}; se usan valores por defecto donde no se pudo leer");
                Self::lenient(&lookup)
            }
        }
    }

    pub fn try_from_lookup<F>(lookup: F) -> Result<Self, ArenaError>
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let check_policy = match lookup("ARENA_CHECK_POLICY") {
            Some(raw) => CheckPolicy::from_name(&raw).ok_or_else(|| {
                                                         ArenaError::Config(format!("ARENA_CHECK_POLICY inválido: {raw}"))
                                                     })?,
            None => defaults.check_policy,
        };
        Ok(Self { check_policy,
                  adapter_limit: parse_var(&lookup, "ARENA_ADAPTER_LIMIT")?.unwrap_or(defaults.adapter_limit),
                  max_statements: parse_var(&lookup, "ARENA_MAX_STATEMENTS")?.unwrap_or(defaults.max_statements),
                  sequence_timeout_ms: parse_var(&lookup, "ARENA_SEQUENCE_TIMEOUT_MS")?.unwrap_or(defaults.sequence_timeout_ms),
                  workers: parse_var(&lookup, "ARENA_WORKERS")?.unwrap_or(defaults.workers),
                  report_path: lookup("ARENA_REPORT_PATH").filter(|p| !p.trim().is_empty()).map(PathBuf::from) })
    }

    fn lenient<F>(lookup: &F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let num = |key: &str| -> Option<u64> { lookup(key).and_then(|v| v.trim().parse().ok()) };
        Self { check_policy: lookup("ARENA_CHECK_POLICY").and_then(|v| CheckPolicy::from_name(&v))
                                                         .unwrap_or(defaults.check_policy),
               adapter_limit: num("ARENA_ADAPTER_LIMIT").map(|v| v as usize).unwrap_or(defaults.adapter_limit),
               max_statements: num("ARENA_MAX_STATEMENTS").map(|v| v as usize).unwrap_or(defaults.max_statements),
               sequence_timeout_ms: num("ARENA_SEQUENCE_TIMEOUT_MS").unwrap_or(defaults.sequence_timeout_ms),
               workers: num("ARENA_WORKERS").map(|v| v as usize).unwrap_or(defaults.workers),
               report_path: lookup("ARENA_REPORT_PATH").filter(|p| !p.trim().is_empty()).map(PathBuf::from) }
    }

    pub fn interpreter_config(&self) -> InterpreterConfig {
        InterpreterConfig { check_policy: self.check_policy,
                            max_statements: (self.max_statements > 0).then_some(self.max_statements) }
    }

    pub fn sequence_timeout(&self) -> Duration {
        Duration::from_millis(self.sequence_timeout_ms)
    }

    /// Corridas concurrentes efectivas (nunca 0).
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ArenaError>
    where F: Fn(&str) -> Option<String>,
          T: std::str::FromStr
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim()
                        .parse()
                        .map(Some)
                        .map_err(|_| ArenaError::Config(format!("{key} no es un número válido: {raw}"))),
    }
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
