//! Hojas de estímulos: parser de registros y referencias de celda.

pub mod cell;
pub mod parser;

pub use cell::CellRef;
pub use parser::{ParsedSheet, Row, SheetParser};
