//! Parser de hojas de estímulos (un registro JSON por línea).
//!
//! ```text
//! {"sheet": "Sheet 1", "header": "Row 1", "cells": {"A1": null, "B1": "create", "C1": "Stack"}}
//! ```
//!
//! - Los registros se agrupan por `sheet` en orden de primera aparición; las
//!   filas conservan el orden de entrada y las celdas el orden del registro.
//! - Un registro malformado hace fallar la hoja a la que pertenece; si ni
//!   siquiera se puede determinar la hoja, el error ocupa su propia posición
//!   en el resultado.
//! - Las líneas en blanco se ignoran.

use indexmap::IndexMap;
use log::warn;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use super::cell::CellRef;
use crate::errors::ParseFailure;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub header: String,
    pub cells: IndexMap<String, Value>,
}

impl Row {
    /// Número de fila tomado de las claves de celda (`A3` → 3).
    pub fn row_number(&self) -> Option<u32> {
        self.cells.keys().find_map(|k| CellRef::parse(k)).map(|c| c.row)
    }

    /// Valor de la celda en la columna `column` (`"A"`, `"B"`, ...).
    pub fn cell(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(k, _)| CellRef::parse(k).is_some_and(|c| c.column == column))
            .map(|(_, v)| v)
    }

    /// Celdas con nombre válido ordenadas por columna.
    pub fn columns(&self) -> Vec<(CellRef, &Value)> {
        let mut cols: Vec<(CellRef, &Value)> = self.cells
                                                   .iter()
                                                   .filter_map(|(k, v)| CellRef::parse(k).map(|c| (c, v)))
                                                   .collect();
        cols.sort_by_key(|(c, _)| c.column_index());
        cols
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedSheet {
    pub name: String,
    pub rows: Vec<Row>,
}

pub struct SheetParser;

impl SheetParser {
    /// Parseo estricto: devuelve la primera falla encontrada.
    pub fn parse(input: &str) -> Result<Vec<ParsedSheet>, ParseFailure> {
        Self::parse_each(input).into_iter().collect()
    }

    /// Parseo por hoja: una falla sólo invalida su propia hoja.
    pub fn parse_each(input: &str) -> Vec<Result<ParsedSheet, ParseFailure>> {
        Self::parse_records(input.lines())
    }

    pub fn parse_records<I, S>(records: I) -> Vec<Result<ParsedSheet, ParseFailure>>
        where I: IntoIterator<Item = S>,
              S: AsRef<str>
    {
        let mut out: Vec<Result<ParsedSheet, ParseFailure>> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for (idx, raw) in records.into_iter().enumerate() {
            let line = idx + 1;
            let text = raw.as_ref().trim();
            if text.is_empty() {
                continue;
            }
            match parse_record(line, text) {
                Ok((sheet, row)) => match by_name.get(&sheet) {
                    Some(&pos) => {
                        if let Ok(parsed) = &mut out[pos] {
                            parsed.rows.push(row);
                        }
                    }
                    None => {
                        by_name.insert(sheet.clone(), out.len());
                        out.push(Ok(ParsedSheet { name: sheet, rows: vec![row] }));
                    }
                },
                Err(failure) => {
                    warn!("sheet parser: {failure}");
                    match failure.sheet.clone() {
                        Some(sheet) => match by_name.get(&sheet) {
                            Some(&pos) => {
                                if out[pos].is_ok() {
                                    out[pos] = Err(failure);
                                }
                            }
                            None => {
                                by_name.insert(sheet, out.len());
                                out.push(Err(failure));
                            }
                        },
                        None => out.push(Err(failure)),
                    }
                }
            }
        }
        out
    }
}

fn parse_record(line: usize, text: &str) -> Result<(String, Row), ParseFailure> {
    let fail = |sheet: Option<&str>, header: Option<&str>, reason: String| ParseFailure { line,
                                                                                           sheet: sheet.map(str::to_string),
                                                                                           header: header.map(str::to_string),
                                                                                           reason };
    let value: Value = serde_json::from_str(text).map_err(|e| fail(None, None, format!("invalid JSON: {e}")))?;
    let Value::Object(record) = value else {
        return Err(fail(None, None, "record is not a JSON object".into()));
    };

    let sheet = match record.get("sheet") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => return Err(fail(None, None, format!("sheet must be a string, got {other}"))),
        None => return Err(fail(None, None, "missing sheet".into())),
    };
    let header = match record.get("header") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => return Err(fail(Some(&sheet), None, format!("header must be a string, got {other}"))),
        None => return Err(fail(Some(&sheet), None, "missing header".into())),
    };
    let cells = match record.get("cells") {
        Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<IndexMap<_, _>>(),
        Some(other) => return Err(fail(Some(&sheet), Some(&header), format!("cells must be an object, got {other}"))),
        None => return Err(fail(Some(&sheet), Some(&header), "missing cells".into())),
    };
    Ok((sheet, Row { header, cells }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{"sheet":"Sheet 1","header":"Row 1","cells":{"A1":null,"B1":"create","C1":"Stack"}}
{"sheet":"Sheet 1","header":"Row 2","cells":{"A2":null,"B2":"push","C2":"A1"}}
{"sheet":"Sheet 2","header":"Row 3","cells":{"A3":1,"B3":"size","C3":"A1"}}"#;

    #[test]
    fn groups_rows_by_sheet_name() {
        let sheets = SheetParser::parse(FIXTURE).expect("valid fixture");
        assert_eq!(sheets.len(), 2);
        assert_eq!(sheets[0].name, "Sheet 1");
        assert_eq!(sheets[0].rows.len(), 2);
        assert!(sheets[0].rows.iter().all(|r| r.cells.len() == 3));
        assert_eq!(sheets[1].name, "Sheet 2");
        assert_eq!(sheets[1].rows.len(), 1);
    }

    #[test]
    fn cells_keep_record_order() {
        let input = r#"{"sheet":"S","header":"h","cells":{"C1":"Stack","A1":null,"B1":"create"}}"#;
        let sheets = SheetParser::parse(input).expect("valid");
        let keys: Vec<&str> = sheets[0].rows[0].cells.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["C1", "A1", "B1"]);
        assert_eq!(sheets[0].rows[0].row_number(), Some(1));
        assert_eq!(sheets[0].rows[0].cell("B"), Some(&Value::String("create".into())));
    }

    #[test]
    fn malformed_record_fails_only_its_sheet() {
        let input = r#"{"sheet":"Good","header":"Row 1","cells":{"A1":null,"B1":"create","C1":"Stack"}}
{"sheet":"Bad","header":"Row 1"}
{"sheet":"Good","header":"Row 2","cells":{"A2":null,"B2":"size","C2":"A1"}}"#;
        let results = SheetParser::parse_each(input);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().map(|s| s.rows.len()).ok(), Some(2));
        let failure = results[1].as_ref().expect_err("bad sheet");
        assert_eq!(failure.line, 2);
        assert_eq!(failure.sheet.as_deref(), Some("Bad"));
        assert_eq!(failure.header.as_deref(), Some("Row 1"));
        assert!(failure.reason.contains("missing cells"));
        assert!(SheetParser::parse(input).is_err());
    }

    #[test]
    fn invalid_json_is_reported_with_line() {
        let results = SheetParser::parse_each("\n{not json}\n");
        assert_eq!(results.len(), 1);
        let failure = results[0].as_ref().expect_err("invalid");
        assert_eq!(failure.line, 2);
        assert!(failure.sheet.is_none());
    }
}
