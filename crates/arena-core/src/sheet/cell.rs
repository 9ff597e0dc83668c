//! Referencias de celda (`A1`, `AB12`).

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub column: String,
    pub row: u32,
}

impl CellRef {
    /// Parsea `letras + dígitos`; cualquier otra forma devuelve `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let split = text.find(|c: char| !c.is_ascii_uppercase())?;
        let (column, digits) = text.split_at(split);
        if column.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let row = digits.parse().ok()?;
        Some(Self { column: column.to_string(),
                    row })
    }

    /// Índice de columna base 0 (`A` = 0, `Z` = 25, `AA` = 26).
    pub fn column_index(&self) -> usize {
        self.column.bytes().fold(0usize, |acc, b| acc * 26 + (b - b'A') as usize + 1) - 1
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cell_names() {
        let c = CellRef::parse("C12").expect("cell");
        assert_eq!(c, CellRef { column: "C".into(), row: 12 });
        assert_eq!(c.column_index(), 2);
        assert_eq!(CellRef::parse("AA1").map(|c| c.column_index()), Some(26));
        assert!(CellRef::parse("push").is_none());
        assert!(CellRef::parse("A").is_none());
        assert!(CellRef::parse("'A1'").is_none());
    }
}
