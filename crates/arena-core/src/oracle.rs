//! Oráculo: valores esperados por índice de statement.
//!
//! Se construye una vez (desde la primera columna de una hoja o desde una
//! corrida de referencia) y se comparte read-only entre corridas. La
//! ausencia de una entrada significa "sin chequeo" para ese statement.

use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::model::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "expected", content = "of", rename_all = "snake_case")]
pub enum Expected {
    Value(Value),
    /// Igual al valor producido por otro statement.
    SameAs(usize),
}

/// Discrepancia entre valor esperado y obtenido. Es un dato del resultado.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckFailure {
    pub index: usize,
    pub expected: Value,
    pub actual: Value,
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "statement {}: expected {} but was {}", self.index, self.expected, self.actual)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Sin entrada en el oráculo, o el statement no produjo valor.
    Skipped,
    Passed,
    Failed(CheckFailure),
}

impl CheckOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, CheckOutcome::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckOutcome::Skipped => "skipped",
            CheckOutcome::Passed => "passed",
            CheckOutcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Oracle {
    entries: BTreeMap<usize, Expected>,
}

impl Oracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: agrega una expectativa literal.
    pub fn expect(mut self, index: usize, value: Value) -> Self {
        self.entries.insert(index, Expected::Value(value));
        self
    }

    pub fn insert(&mut self, index: usize, expected: Expected) {
        self.entries.insert(index, expected);
    }

    pub fn has_oracle(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn expected_value_for(&self, index: usize) -> Option<&Expected> {
        self.entries.get(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    /// Compara `actual` con la expectativa de `index`. `produced` son los
    /// valores de los statements ya ejecutados (para `SameAs`).
    pub fn check(&self, index: usize, actual: &Value, produced: &[Option<Value>]) -> CheckOutcome {
        let expected = match self.entries.get(&index) {
            None => return CheckOutcome::Skipped,
            Some(Expected::Value(v)) => v,
            Some(Expected::SameAs(other)) => match produced.get(*other).and_then(Option::as_ref) {
                Some(v) => v,
                None => {
                    debug!("oracle: statement {index} refers to statement {other} which produced no value");
                    return CheckOutcome::Skipped;
                }
            },
        };
        if actual.matches(expected) {
            CheckOutcome::Passed
        } else {
            CheckOutcome::Failed(CheckFailure { index,
                                                expected: expected.clone(),
                                                actual: actual.clone() })
        }
    }
}
