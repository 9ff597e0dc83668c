//! Minimización: descarta registros cuya secuencia es estructuralmente igual
//! a la de un registro anterior que sobrevivió.
//!
//! Comparación par a par (O(n²)); los sobrevivientes conservan su orden
//! relativo. Registros sin secuencia nunca se consideran duplicados.

use log::debug;

use super::record::SequenceExecutionRecord;

pub fn minimize(records: Vec<SequenceExecutionRecord>) -> Vec<SequenceExecutionRecord> {
    let total = records.len();
    let mut survivors: Vec<SequenceExecutionRecord> = Vec::with_capacity(total);
    for record in records {
        let duplicate = match &record.sequence {
            None => false,
            Some(seq) => survivors.iter().any(|kept| {
                                                 kept.sequence
                                                     .as_ref()
                                                     .is_some_and(|other| other.structurally_equal(seq))
                                             }),
        };
        if !duplicate {
            survivors.push(record);
        }
    }
    debug!("minimize: {} of {} records kept", survivors.len(), total);
    survivors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TypeDescriptor, Value};
    use crate::oracle::Oracle;
    use crate::sequence::{Input, SequenceSpecification, Statement};
    use std::sync::Arc;

    fn seq(name: &str, pushed: &str) -> Arc<SequenceSpecification> {
        Arc::new(SequenceSpecification::new(name,
                                            "Stack",
                                            vec![Statement::create("Stack", Some(0), vec![], TypeDescriptor::Reference("Stack".into())),
                                                 Statement::invoke(0,
                                                                   "push",
                                                                   1,
                                                                   vec![Input::Literal(Value::string(pushed))],
                                                                   TypeDescriptor::Void)],
                                            Oracle::new()))
    }

    #[test]
    fn drops_structural_duplicate_and_keeps_first() {
        let records = vec![SequenceExecutionRecord::new(Some(seq("S", "a")), "impl"),
                           SequenceExecutionRecord::new(Some(seq("S'", "a")), "impl")];
        let kept = minimize(records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].sequence.as_ref().map(|s| s.name.as_str()), Some("S"));
    }

    #[test]
    fn keeps_order_and_records_without_sequence() {
        let records = vec![SequenceExecutionRecord::new(None, "x"),
                           SequenceExecutionRecord::new(Some(seq("A", "a")), "impl"),
                           SequenceExecutionRecord::new(None, "y"),
                           SequenceExecutionRecord::new(Some(seq("B", "b")), "impl"),
                           SequenceExecutionRecord::new(Some(seq("A2", "a")), "impl")];
        let kept = minimize(records);
        let names: Vec<String> = kept.iter()
                                     .map(|r| r.sequence.as_ref().map(|s| s.name.clone()).unwrap_or_else(|| r.implementation.clone()))
                                     .collect();
        assert_eq!(names, vec!["x", "A", "y", "B"]);
    }
}
