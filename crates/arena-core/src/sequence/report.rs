//! Reportes serializables de una corrida.
//!
//! Cada statement produce una fila con la operación, las entradas, la celda
//! de salida y el tiempo medido. La celda de salida es el valor JSON, o una
//! marca: `_INSTANCE_` para objetos, `_EXCEPTION_: ...` para fallas del
//! artifact, `_ENGINE_ERROR_: ...` cuando el motor no pudo invocarlo y
//! `_NOT_EXECUTED_` para statements que no llegaron a ejecutarse. El reporte
//! de oráculo usa `_NA_` donde no hay expectativa.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as Json;
use uuid::Uuid;

use super::record::SequenceExecutionRecord;
use super::specification::SequenceSpecification;
use crate::constants::{MARK_ENGINE_ERROR, MARK_EXCEPTION, MARK_NOT_EXECUTED, MARK_NO_ORACLE};
use crate::oracle::{CheckOutcome, Expected};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementReport {
    pub index: usize,
    pub operation: String,
    pub inputs: Vec<String>,
    pub output: Json,
    /// `skipped`, `passed`, `failed` o `not_executed`.
    pub check: String,
    pub elapsed_ns: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordReport {
    pub sequence: Option<String>,
    pub fingerprint: Option<String>,
    pub implementation: String,
    pub run_id: Option<Uuid>,
    pub state: String,
    pub started_at: Option<DateTime<Utc>>,
    pub statements: Vec<StatementReport>,
    pub check_failures: usize,
}

impl RecordReport {
    pub fn from_record(record: &SequenceExecutionRecord) -> Self {
        let executed = record.executed.as_ref();
        let statements = match &record.sequence {
            Some(seq) => seq.statements
                            .iter()
                            .enumerate()
                            .map(|(index, st)| {
                                let outcome = executed.and_then(|e| e.outcome(index));
                                let (output, check) = match outcome {
                                    None => (Json::String(MARK_NOT_EXECUTED.to_string()), "not_executed".to_string()),
                                    Some(o) => {
                                        let output = match &o.result {
                                            Ok(v) => v.to_json(),
                                            Err(e) if e.is_artifact_failure() => Json::String(format!("{MARK_EXCEPTION}: {e}")),
                                            Err(e) => Json::String(format!("{MARK_ENGINE_ERROR}: {e}")),
                                        };
                                        (output, o.check.label().to_string())
                                    }
                                };
                                StatementReport { index,
                                                  operation: st.operation.clone(),
                                                  inputs: st.inputs.iter().map(|i| i.to_string()).collect(),
                                                  output,
                                                  check,
                                                  elapsed_ns: outcome.map(|o| o.elapsed_ns) }
                            })
                            .collect(),
            None => Vec::new(),
        };
        let check_failures = executed.map(|e| e.outcomes.iter().filter(|o| matches!(o.check, CheckOutcome::Failed(_))).count())
                                     .unwrap_or(0);
        Self { sequence: record.sequence.as_ref().map(|s| s.name.clone()),
               fingerprint: record.sequence.as_ref().map(|s| s.fingerprint()),
               implementation: record.implementation.clone(),
               run_id: executed.map(|e| e.run_id),
               state: executed.map(|e| e.state.label()).unwrap_or("not_started").to_string(),
               started_at: executed.map(|e| e.started_at),
               statements,
               check_failures }
    }

    pub fn to_json(&self) -> Json {
        serde_json::to_value(self).unwrap_or(Json::Null)
    }
}

/// Celdas de oráculo de una secuencia: una por statement.
pub fn oracle_report(sequence: &SequenceSpecification) -> Vec<Json> {
    (0..sequence.len()).map(|i| match sequence.oracle.expected_value_for(i) {
                           None => Json::String(MARK_NO_ORACLE.to_string()),
                           Some(Expected::Value(v)) => v.to_json(),
                           Some(Expected::SameAs(j)) => Json::String(format!("${j}")),
                       })
                       .collect()
}
