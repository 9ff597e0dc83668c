//! Publicación de reportes de corrida.
//!
//! Un `RecordSink` recibe `RecordReport` ya serializables. Hay dos
//! implementaciones: `InMemorySink` (tests, inspección) y `JsonlFileSink`
//! (una línea JSON por reporte, en modo append).
use std::path::{Path, PathBuf};

use arena_core::sequence::RecordReport;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::errors::ArenaError;

#[async_trait]
pub trait RecordSink: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(&self, report: &RecordReport) -> Result<(), ArenaError>;

    async fn flush(&self) -> Result<(), ArenaError> {
        Ok(())
    }
}

/// Reporte tal como queda publicado.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishedReport {
    pub published_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: RecordReport,
}

impl PublishedReport {
    pub fn now(report: &RecordReport) -> Self {
        Self { published_at: Utc::now(),
               report: report.clone() }
    }
}

/// Reportes agrupados por identidad de implementación, en orden de llegada.
#[derive(Debug, Default)]
pub struct InMemorySink {
    by_implementation: DashMap<String, Vec<PublishedReport>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports_for(&self, implementation: &str) -> Vec<PublishedReport> {
        self.by_implementation.get(implementation).map(|r| r.value().clone()).unwrap_or_default()
    }

    pub fn implementations(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.by_implementation.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.by_implementation.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordSink for InMemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn publish(&self, report: &RecordReport) -> Result<(), ArenaError> {
        self.by_implementation.entry(report.implementation.clone()).or_default().push(PublishedReport::now(report));
        Ok(())
    }
}

/// Agrega una línea JSON por reporte al archivo indicado. El archivo se abre
/// en la primera publicación.
pub struct JsonlFileSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl JsonlFileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf(),
               file: Mutex::new(None) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordSink for JsonlFileSink {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn publish(&self, report: &RecordReport) -> Result<(), ArenaError> {
        let mut line = serde_json::to_string(&PublishedReport::now(report))?;
        line.push('\n');
        let mut guard = self.file.lock().await;
        if guard.is_none() {
            let file = OpenOptions::new().create(true).append(true).open(&self.path).await?;
            *guard = Some(file);
        }
        if let Some(file) = guard.as_mut() {
            file.write_all(line.as_bytes()).await?;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<(), ArenaError> {
        if let Some(file) = self.file.lock().await.as_mut() {
            file.flush().await?;
        }
        Ok(())
    }
}
