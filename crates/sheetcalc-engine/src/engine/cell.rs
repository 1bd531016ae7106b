//! Cell data structures for the spreadsheet grid.
//!
//! This module provides the core data types for representing cells:
//! - [`Cell`] - Raw user input plus presentation attributes
//! - [`CellType`] - Classification of a cell's raw content, derived on read
//! - [`CellFormat`] - Font and emphasis attributes (inert for evaluation)
//! - [`Grid`] - Thread-safe sparse storage for cells (backed by `DashMap`)

use dashmap::DashMap;
use regex::Regex;
use std::sync::OnceLock;

use super::cell_ref::CellRef;

/// The kind of content stored in a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellType {
    Empty,
    Number(f64),
    Text(String),
    /// Formula expression without the leading `=`.
    Formula(String),
}

/// Presentation attributes carried for display only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellFormat {
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl CellFormat {
    pub fn is_default(&self) -> bool {
        *self == CellFormat::default()
    }
}

/// A cell in the spreadsheet grid.
///
/// Only the raw input is stored; whether it is a formula is recomputed from
/// it every time so the two can never disagree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    pub raw: String,
    pub format: CellFormat,
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell::default()
    }

    /// Create a cell holding exactly what the user typed.
    pub fn from_input(input: &str) -> Cell {
        Cell {
            raw: input.to_string(),
            format: CellFormat::default(),
        }
    }

    pub fn with_format(mut self, format: CellFormat) -> Cell {
        self.format = format;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn is_formula(&self) -> bool {
        is_formula(&self.raw)
    }

    /// Classify the raw content.
    /// - Empty string -> Empty
    /// - Formula (see [`is_formula`]) -> Formula (without the '=')
    /// - Numeric literal -> Number
    /// - Otherwise -> Text
    pub fn kind(&self) -> CellType {
        if self.raw.is_empty() {
            return CellType::Empty;
        }
        if let Some(expr) = formula_body(&self.raw) {
            return CellType::Formula(expr.to_string());
        }
        match parse_number(&self.raw) {
            Some(n) => CellType::Number(n),
            None => CellType::Text(self.raw.clone()),
        }
    }
}

/// True iff `content` starts with `=` and contains no `#`.
///
/// `#` is reserved for error sentinels such as `#ERROR`.
pub fn is_formula(content: &str) -> bool {
    content.starts_with('=') && !content.contains('#')
}

/// The expression part of a formula, or `None` for non-formula content.
pub fn formula_body(content: &str) -> Option<&str> {
    if is_formula(content) {
        Some(&content[1..])
    } else {
        None
    }
}

/// Interpret plain cell text as a number.
///
/// Accepts an optionally signed decimal literal with optional fraction and
/// exponent, surrounded by optional whitespace. `inf`/`NaN` spellings are
/// rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if !number_re().is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn number_re() -> &'static Regex {
    static NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    NUMBER_RE.get_or_init(|| {
        Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$")
            .expect("number regex must compile")
    })
}

/// Thread-safe sparse grid storage. An absent key is an empty cell.
pub type Grid = DashMap<CellRef, Cell>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_formula() {
        assert!(is_formula("=1+2"));
        assert!(!is_formula("=1#2"));
        assert!(!is_formula("hello"));
        assert!(!is_formula(""));
        assert!(!is_formula(" =1"));
    }

    #[test]
    fn test_kind_is_derived_from_raw() {
        assert_eq!(Cell::new_empty().kind(), CellType::Empty);
        assert_eq!(Cell::from_input("42").kind(), CellType::Number(42.0));
        assert_eq!(Cell::from_input(" -1.5e2 ").kind(), CellType::Number(-150.0));
        assert_eq!(
            Cell::from_input("=A1+1").kind(),
            CellType::Formula("A1+1".to_string())
        );
        assert_eq!(
            Cell::from_input("=#ERROR").kind(),
            CellType::Text("=#ERROR".to_string())
        );

        let mut cell = Cell::from_input("=1");
        assert!(cell.is_formula());
        cell.raw = "1".to_string();
        assert!(!cell.is_formula());
    }

    #[test]
    fn test_parse_number_rejects_non_literals() {
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("7."), Some(7.0));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1,000"), None);
        assert_eq!(parse_number("1e999"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
    }
}
