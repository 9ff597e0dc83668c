//! Parser del lenguaje de especificación de interfaces (LQL).
//!
//! ```text
//! Stack {
//!     push(java.lang.String)->java.lang.String
//!     size()->int
//! }
//! ```
//!
//! - Uno o más bloques `Nombre { ... }`; `$` es un nombre válido.
//! - Las operaciones se separan por salto de línea o `;`.
//! - Sin `->T` el retorno es `void`.
//! - Los tipos pueden llevar argumentos genéricos con comas anidadas.
//! - Palabras fuera de los bloques (`!name_fq:Queue^10`) son filtros de
//!   búsqueda; se conservan en `LqlDocument::filters` y el motor las ignora.

use crate::errors::LqlError;
use crate::model::{InterfaceSpecification, Operation, TypeDescriptor};

#[derive(Debug, Clone, PartialEq)]
pub struct LqlDocument {
    pub interfaces: Vec<InterfaceSpecification>,
    pub filters: Vec<String>,
}

impl LqlDocument {
    pub fn interface(&self, name: &str) -> Option<&InterfaceSpecification> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

pub fn parse_lql(text: &str) -> Result<LqlDocument, LqlError> {
    let mut interfaces = Vec::new();
    let mut filters = Vec::new();
    let mut offset = 0usize;

    loop {
        let rest = &text[offset..];
        let trimmed = rest.trim_start();
        offset += rest.len() - trimmed.len();
        if trimmed.is_empty() {
            break;
        }
        let word_end = trimmed.find(|c: char| c.is_whitespace() || c == '{').unwrap_or(trimmed.len());
        let word = &trimmed[..word_end];
        let after = trimmed[word_end..].trim_start();
        if after.starts_with('{') {
            let open = offset + (trimmed.len() - after.len());
            if word.is_empty() {
                return Err(error(text, open, "interface block without a name"));
            }
            let body_start = open + 1;
            let close = text[body_start..].find('}')
                                          .ok_or_else(|| error(text, open, &format!("block {word} is not closed")))?;
            let body = &text[body_start..body_start + close];
            interfaces.push(parse_block(word, body, line_of(text, body_start))?);
            offset = body_start + close + 1;
        } else {
            filters.push(word.to_string());
            offset += word_end;
        }
    }

    if interfaces.is_empty() {
        return Err(LqlError { line: 1,
                              reason: "no interface block found".into() });
    }
    Ok(LqlDocument { interfaces, filters })
}

/// Atajo: sólo las interfaces del documento.
pub fn parse_interfaces(text: &str) -> Result<Vec<InterfaceSpecification>, LqlError> {
    parse_lql(text).map(|doc| doc.interfaces)
}

fn parse_block(name: &str, body: &str, first_line: usize) -> Result<InterfaceSpecification, LqlError> {
    let mut operations = Vec::new();
    for (i, line) in body.split('\n').enumerate() {
        for piece in line.split(';') {
            let piece = piece.trim();
            if piece.is_empty() {
                continue;
            }
            operations.push(parse_operation(piece, first_line + i)?);
        }
    }
    Ok(InterfaceSpecification::new(name, operations))
}

fn parse_operation(text: &str, line: usize) -> Result<Operation, LqlError> {
    let fail = |reason: String| LqlError { line, reason };
    let open = text.find('(').ok_or_else(|| fail(format!("missing parameter list in '{text}'")))?;
    let close = text.rfind(')')
                    .filter(|c| *c > open)
                    .ok_or_else(|| fail(format!("unclosed parameter list in '{text}'")))?;
    let name = text[..open].trim();
    if name.is_empty() {
        return Err(fail(format!("operation without a name in '{text}'")));
    }

    let params = split_top_level(&text[open + 1..close]).into_iter()
                                                        .map(|p| {
                                                            if p.is_empty() {
                                                                Err(fail(format!("empty parameter type in '{text}'")))
                                                            } else {
                                                                Ok(TypeDescriptor::parse(p))
                                                            }
                                                        })
                                                        .collect::<Result<Vec<_>, _>>()?;

    let tail = text[close + 1..].trim();
    let return_type = if tail.is_empty() {
        TypeDescriptor::Void
    } else if let Some(ret) = tail.strip_prefix("->") {
        let ret = ret.trim();
        if ret.is_empty() {
            return Err(fail(format!("missing return type after '->' in '{text}'")));
        }
        TypeDescriptor::parse(ret)
    } else {
        return Err(fail(format!("unexpected '{tail}' after parameter list")));
    };
    Ok(Operation::new(name, params, return_type))
}

/// Divide por comas fuera de `<...>`. Una lista vacía produce cero tipos.
fn split_top_level(text: &str) -> Vec<&str> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn error(text: &str, offset: usize, reason: &str) -> LqlError {
    LqlError { line: line_of(text, offset),
               reason: reason.to_string() }
}
