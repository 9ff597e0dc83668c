//! Traducción de una `ParsedSheet` a una `SequenceSpecification`.
//!
//! Notación de columnas:
//!
//! | columna | contenido |
//! |---|---|
//! | A | valor esperado (oráculo); `null` o `{}` = sin chequeo |
//! | B | operación: `create`, `$eval`, `$field`, `#{expr}` o nombre de operación |
//! | C | tipo a crear (`create`), expresión (`$eval`) o celda receptora (`A1`) |
//! | D.. | argumentos |
//!
//! Un argumento de texto con forma de celda (`A2`) referencia el resultado de
//! la fila cuyo número coincide; otro texto se evalúa con el
//! `ExpressionEvaluator` y, si la evaluación no es posible al construir, se
//! difiere a la ejecución.

use serde_json::Value as Json;
use std::collections::HashMap;

use super::specification::SequenceSpecification;
use super::statement::{Input, Statement, StatementKind};
use crate::constants::{OP_CREATE, OP_EVAL, OP_FIELD};
use crate::errors::{BuildError, EvalError};
use crate::eval::ExpressionEvaluator;
use crate::model::{InterfaceSpecification, MemberKind, TypeDescriptor, TypeHierarchy, Value};
use crate::oracle::{Expected, Oracle};
use crate::resolve::MemberResolver;
use crate::sheet::{CellRef, ParsedSheet, Row};

pub struct SequenceBuilder<'a> {
    interface: &'a InterfaceSpecification,
    evaluator: &'a dyn ExpressionEvaluator,
    hierarchy: TypeHierarchy,
}

/// Estado de construcción de una hoja.
struct SheetScope<'s> {
    sheet: &'s str,
    statements: Vec<Statement>,
    rows: HashMap<u32, usize>,
    oracle: Oracle,
}

impl<'a> SequenceBuilder<'a> {
    pub fn new(interface: &'a InterfaceSpecification, evaluator: &'a dyn ExpressionEvaluator) -> Self {
        Self { interface,
               evaluator,
               hierarchy: TypeHierarchy::jdk() }
    }

    pub fn build_all(&self, sheets: &[ParsedSheet]) -> Vec<Result<SequenceSpecification, BuildError>> {
        sheets.iter().map(|s| self.build(s)).collect()
    }

    pub fn build(&self, sheet: &ParsedSheet) -> Result<SequenceSpecification, BuildError> {
        let mut scope = SheetScope { sheet: &sheet.name,
                                     statements: Vec::with_capacity(sheet.rows.len()),
                                     rows: HashMap::new(),
                                     oracle: Oracle::new() };
        for row in &sheet.rows {
            let row_number = row.row_number()
                                .ok_or_else(|| row_error(&scope, row, "row has no valid cell names"))?;
            let index = scope.statements.len();
            let statement = self.statement_for(&scope, row)?;
            if let Some(expected) = self.expected_for(&scope, row)? {
                scope.oracle.insert(index, expected);
            }
            scope.statements.push(statement);
            scope.rows.insert(row_number, index);
        }
        Ok(SequenceSpecification::new(&sheet.name, &self.interface.name, scope.statements, scope.oracle))
    }

    fn statement_for(&self, scope: &SheetScope<'_>, row: &Row) -> Result<Statement, BuildError> {
        let op = match row.cell("B") {
            Some(Json::String(s)) => s.trim().to_string(),
            _ => return Err(row_error(scope, row, "operation cell (B) must be a string")),
        };
        let third = row.cell("C");
        let args: Vec<&Json> = row.columns().into_iter().filter(|(c, _)| c.column_index() >= 3).map(|(_, v)| v).collect();

        if let Some(code) = op.strip_prefix("#{").and_then(|r| r.strip_suffix('}')) {
            return Ok(self.eval_statement(code));
        }
        match op.as_str() {
            OP_CREATE => {
                let type_name = text_cell(third).ok_or_else(|| row_error(scope, row, "create needs a type name in column C"))?;
                let inputs = self.inputs(scope, row, &args)?;
                if type_name == self.interface.name {
                    let declared = self.static_types(scope, &inputs);
                    let slot = MemberResolver::new(&self.hierarchy).resolve(MemberKind::Constructor,
                                                                            &type_name,
                                                                            &declared,
                                                                            self.interface.operations())
                                                                   .map_err(|e| resolution_error(scope, row, e))?
                                                                   .index;
                    Ok(Statement::create(&type_name,
                                         Some(slot),
                                         inputs,
                                         TypeDescriptor::Reference(self.interface.name.clone())))
                } else {
                    let ty = self.evaluator
                                 .resolve_type(&type_name)
                                 .map_err(|e| row_error(scope, row, &e.to_string()))?;
                    Ok(Statement::create(&type_name, None, inputs, ty))
                }
            }
            OP_EVAL => {
                let code = text_cell(third).ok_or_else(|| row_error(scope, row, "$eval needs an expression in column C"))?;
                Ok(self.eval_statement(&code))
            }
            OP_FIELD => {
                let target = self.target(scope, row, third)?;
                let name = args.first()
                               .and_then(|v| text_cell(Some(v)))
                               .ok_or_else(|| row_error(scope, row, "$field needs a field name in column D"))?;
                let value = match args.get(1) {
                    Some(v) => Some(self.input(scope, row, v)?),
                    None => None,
                };
                Ok(Statement::field(target, &name, value))
            }
            _ => {
                let target = self.target(scope, row, third)?;
                let target_type = &scope.statements[target].result_type;
                if *target_type != TypeDescriptor::Reference(self.interface.name.clone()) {
                    return Err(row_error(scope,
                                         row,
                                         &format!("operations can only be invoked on {} instances, row targets {}",
                                                  self.interface.name, target_type)));
                }
                let inputs = self.inputs(scope, row, &args)?;
                let declared = self.static_types(scope, &inputs);
                let slot = MemberResolver::new(&self.hierarchy).resolve(MemberKind::Method, &op, &declared, self.interface.operations())
                                                               .map_err(|e| resolution_error(scope, row, e))?
                                                               .index;
                let result_type = self.interface
                                      .operation(slot)
                                      .map(|o| o.return_type.clone())
                                      .unwrap_or(TypeDescriptor::Void);
                Ok(Statement::invoke(target, &op, slot, inputs, result_type))
            }
        }
    }

    fn eval_statement(&self, code: &str) -> Statement {
        let ty = self.evaluator.eval(code).map(|v| v.type_tag).unwrap_or_else(|_| TypeDescriptor::object());
        Statement::eval(code, ty)
    }

    /// Índice del statement referenciado por la celda receptora.
    fn target(&self, scope: &SheetScope<'_>, row: &Row, cell: Option<&Json>) -> Result<usize, BuildError> {
        let text = text_cell(cell).ok_or_else(|| row_error(scope, row, "column C must reference a previous row"))?;
        let cell = CellRef::parse(&text).ok_or_else(|| row_error(scope, row, &format!("{text} is not a cell reference")))?;
        scope.rows
             .get(&cell.row)
             .copied()
             .ok_or_else(|| row_error(scope, row, &format!("{text} does not reference a previous row")))
    }

    fn inputs(&self, scope: &SheetScope<'_>, row: &Row, args: &[&Json]) -> Result<Vec<Input>, BuildError> {
        args.iter().map(|v| self.input(scope, row, v)).collect()
    }

    fn input(&self, scope: &SheetScope<'_>, row: &Row, cell: &Json) -> Result<Input, BuildError> {
        if let Json::String(text) = cell {
            if let Some(r) = CellRef::parse(text) {
                return scope.rows
                            .get(&r.row)
                            .map(|i| Input::Ref(*i))
                            .ok_or_else(|| row_error(scope, row, &format!("{text} does not reference a previous row")));
            }
            return match self.evaluator.eval(text) {
                Ok(v) => Ok(Input::Literal(v)),
                Err(EvalError::Unsupported(_)) => Ok(Input::Expr(text.clone())),
                Err(e) => Err(row_error(scope, row, &e.to_string())),
            };
        }
        json_literal(cell).map(Input::Literal)
                          .ok_or_else(|| row_error(scope, row, &format!("unsupported cell value {cell}")))
    }

    /// Tipos estáticos para resolver sobrecargas. Entradas de tipo desconocido
    /// (expresiones diferidas, evals no evaluables) se tipan como `null`:
    /// aceptan cualquier parámetro no primitivo y se validan al convertir.
    fn static_types(&self, scope: &SheetScope<'_>, inputs: &[Input]) -> Vec<TypeDescriptor> {
        inputs.iter()
              .map(|i| match i {
                  Input::Literal(v) => v.type_tag.clone(),
                  Input::Ref(j) => {
                      let st = &scope.statements[*j];
                      if st.kind == StatementKind::Eval && st.result_type == TypeDescriptor::object() {
                          TypeDescriptor::Null
                      } else {
                          st.result_type.clone()
                      }
                  }
                  Input::Expr(_) => TypeDescriptor::Null,
              })
              .collect()
    }

    fn expected_for(&self, scope: &SheetScope<'_>, row: &Row) -> Result<Option<Expected>, BuildError> {
        match row.cell("A") {
            None | Some(Json::Null) => Ok(None),
            Some(Json::Object(map)) if map.is_empty() => Ok(None),
            Some(Json::String(text)) => {
                if let Some(r) = CellRef::parse(text) {
                    return scope.rows
                                .get(&r.row)
                                .map(|i| Some(Expected::SameAs(*i)))
                                .ok_or_else(|| row_error(scope, row, &format!("expected value {text} does not reference a previous row")));
                }
                self.evaluator
                    .eval(text)
                    .map(|v| Some(Expected::Value(v)))
                    .map_err(|e| row_error(scope, row, &format!("expected value: {e}")))
            }
            Some(other) => json_literal(other).map(|v| Some(Expected::Value(v)))
                                              .ok_or_else(|| row_error(scope, row, &format!("unsupported expected value {other}"))),
        }
    }
}

fn text_cell(cell: Option<&Json>) -> Option<String> {
    match cell {
        Some(Json::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Literal desde un valor JSON no textual.
fn json_literal(cell: &Json) -> Option<Value> {
    match cell {
        Json::Null => Some(Value::null()),
        Json::Bool(b) => Some(Value::bool(*b)),
        Json::Number(n) => match n.as_i64() {
            Some(i) if i32::try_from(i).is_ok() => Some(Value::int(i)),
            Some(i) => Some(Value::long(i)),
            None => n.as_f64().map(Value::double),
        },
        Json::String(s) => Some(Value::string(s.clone())),
        Json::Object(map) if map.is_empty() => Some(Value::null()),
        Json::Array(items) => {
            let values = items.iter().map(json_literal).collect::<Option<Vec<_>>>()?;
            let element = values.first().map(|v| v.type_tag.clone()).unwrap_or_else(TypeDescriptor::object);
            let element = if values.iter().all(|v| v.type_tag == element) { element } else { TypeDescriptor::object() };
            Some(Value::array(values, element))
        }
        Json::Object(_) => None,
    }
}

fn row_error(scope: &SheetScope<'_>, row: &Row, reason: &str) -> BuildError {
    BuildError::Row { sheet: scope.sheet.to_string(),
                      row: row.header.clone(),
                      reason: reason.to_string() }
}

fn resolution_error(scope: &SheetScope<'_>, row: &Row, source: crate::errors::ResolutionFailure) -> BuildError {
    BuildError::Resolution { sheet: scope.sheet.to_string(),
                             row: row.header.clone(),
                             source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::LiteralEvaluator;
    use crate::lql::parse_interfaces;
    use crate::sheet::SheetParser;

    const LQL: &str = "Stack {\n    push(java.lang.String)->java.lang.String\n    size()->int\n}";

    const SHEET: &str = r#"{"sheet": "Sheet 1", "header": "Row 1", "cells": {"A1": {}, "B1": "create", "C1": "Stack"}}
{"sheet": "Sheet 1", "header": "Row 2", "cells": {"A2": {}, "B2": "create", "C2": "java.lang.String", "D2": "'Hello World!'"}}
{"sheet": "Sheet 1", "header": "Row 3", "cells": {"A3": {}, "B3": "push", "C3": "A1", "D3": "A2"}}
{"sheet": "Sheet 1", "header": "Row 4", "cells": {"A4": 1, "B4": "size", "C4": "A1"}}"#;

    #[test]
    fn builds_statements_and_oracle_from_sheet() {
        let interfaces = parse_interfaces(LQL).expect("lql");
        let evaluator = LiteralEvaluator::new();
        let builder = SequenceBuilder::new(&interfaces[0], &evaluator);
        let sheets = SheetParser::parse(SHEET).expect("sheet");
        let seq = builder.build(&sheets[0]).expect("sequence");

        assert_eq!(seq.len(), 4);
        assert_eq!(seq.statements[0].kind, StatementKind::Create);
        assert_eq!(seq.statements[0].slot, Some(0));
        assert_eq!(seq.statements[1].slot, None);
        assert_eq!(seq.statements[1].result_type, TypeDescriptor::string());
        assert_eq!(seq.statements[2].target, Some(0));
        assert_eq!(seq.statements[2].inputs, vec![Input::Ref(1)]);
        assert_eq!(seq.statements[2].slot, Some(1));
        assert_eq!(seq.statements[3].slot, Some(2));
        assert!(!seq.oracle.has_oracle(0));
        assert!(!seq.oracle.has_oracle(2));
        assert_eq!(seq.oracle.expected_value_for(3), Some(&Expected::Value(Value::int(1))));
    }

    #[test]
    fn unknown_operation_is_reported_with_row() {
        let interfaces = parse_interfaces(LQL).expect("lql");
        let evaluator = LiteralEvaluator::new();
        let builder = SequenceBuilder::new(&interfaces[0], &evaluator);
        let input = r#"{"sheet": "S", "header": "Row 1", "cells": {"A1": null, "B1": "create", "C1": "Stack"}}
{"sheet": "S", "header": "Row 2", "cells": {"A2": null, "B2": "pop", "C2": "A1"}}"#;
        let sheets = SheetParser::parse(input).expect("sheet");
        let err = builder.build(&sheets[0]).expect_err("pop is not declared");
        assert!(matches!(err, BuildError::Resolution { ref row, .. } if row == "Row 2"));
    }

    #[derive(Default)]
    struct Ledger {
        balance: i64,
        owner: String,
    }

    #[test]
    fn field_rows_read_and_write_concrete_fields() {
        use crate::adaptation::{AdaptationStrategy, PassThrough};
        use crate::engine::{FailureCause, RunState, SequenceInterpreter};
        use crate::errors::InvocationFailure;
        use crate::instrument::CompositeVisitor;
        use crate::model::{Artifact, NativeArtifact};
        use std::sync::Arc;

        let interface = Arc::new(InterfaceSpecification::new("Account", Vec::new()));
        let evaluator = LiteralEvaluator::new();
        let input = r#"{"sheet": "F", "header": "Row 1", "cells": {"A1": {}, "B1": "create", "C1": "Account"}}
{"sheet": "F", "header": "Row 2", "cells": {"A2": {}, "B2": "$field", "C2": "A1", "D2": "balance", "E2": 42}}
{"sheet": "F", "header": "Row 3", "cells": {"A3": 42, "B3": "$field", "C3": "A1", "D3": "balance"}}
{"sheet": "F", "header": "Row 4", "cells": {"A4": {}, "B4": "$field", "C4": "A1", "D4": "owner", "E4": "'bob'"}}"#;
        let sheets = SheetParser::parse(input).expect("sheet");
        let seq = SequenceBuilder::new(&interface, &evaluator).build(&sheets[0]).expect("sequence");

        assert_eq!(seq.statements[1].kind, StatementKind::FieldAccess);
        assert_eq!(seq.statements[1].operation, "balance");
        assert_eq!(seq.statements[1].target, Some(0));
        assert_eq!(seq.statements[1].inputs, vec![Input::Literal(Value::int(42))]);
        assert!(seq.statements[2].inputs.is_empty());
        assert_eq!(seq.oracle.expected_value_for(2), Some(&Expected::Value(Value::int(42))));

        let artifact: Arc<dyn Artifact> =
            Arc::new(NativeArtifact::<Ledger>::builder("Account").constructor(&[], |_| Ok(Ledger::default()))
                                                                 .field("balance", "int", |s| Value::int(s.balance), |s, v| {
                                                                     s.balance = v.as_i64().unwrap_or(0);
                                                                     Ok(())
                                                                 })
                                                                 .read_only_field("owner", "java.lang.String", |s| Value::string(s.owner.clone()))
                                                                 .build());
        let implementation = PassThrough.adapt(&interface, &artifact, 0).expect("adapt").remove(0);
        let run = SequenceInterpreter::new(&evaluator).execute_sequence(&seq, &implementation, &CompositeVisitor::new());

        assert!(run.value(1).is_some_and(|v| v.type_tag.is_void()));
        assert_eq!(run.value(2), Some(&Value::int(42)));
        assert!(run.check_failures().is_empty());
        assert!(matches!(run.state,
                         RunState::Failed { statement: 3, cause: FailureCause::Invocation(InvocationFailure::Fault(ref f)) }
                         if f.kind == "java.lang.IllegalAccessException"));
    }

    #[test]
    fn field_row_without_name_is_rejected() {
        let interface = InterfaceSpecification::new("Account", Vec::new());
        let evaluator = LiteralEvaluator::new();
        let input = r#"{"sheet": "F", "header": "Row 1", "cells": {"A1": {}, "B1": "create", "C1": "Account"}}
{"sheet": "F", "header": "Row 2", "cells": {"A2": {}, "B2": "$field", "C2": "A1"}}"#;
        let sheets = SheetParser::parse(input).expect("sheet");
        let err = SequenceBuilder::new(&interface, &evaluator).build(&sheets[0]).expect_err("missing field name");
        assert!(err.to_string().contains("column D"), "{err}");
    }

    #[test]
    fn eval_rows_feed_later_statements() {
        let interfaces = parse_interfaces(LQL).expect("lql");
        let evaluator = LiteralEvaluator::new();
        let builder = SequenceBuilder::new(&interfaces[0], &evaluator);
        let input = r#"{"sheet": "S", "header": "Row 1", "cells": {"A1": {}, "B1": "create", "C1": "Stack"}}
{"sheet": "S", "header": "Row 2", "cells": {"A2": {}, "B2": "$eval", "C2": "Arrays.toString(new char[]{'a', 'b'})"}}
{"sheet": "S", "header": "Row 3", "cells": {"A3": "A2", "B3": "push", "C3": "A1", "D3": "A2"}}"#;
        let sheets = SheetParser::parse(input).expect("sheet");
        let seq = builder.build(&sheets[0]).expect("sequence");
        assert_eq!(seq.statements[1].kind, StatementKind::Eval);
        assert_eq!(seq.statements[2].slot, Some(1));
        assert_eq!(seq.oracle.expected_value_for(2), Some(&Expected::SameAs(1)));
    }
}
