//! Cell address parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style addresses
//! (e.g., "A1", "B12", "AA100") and zero-indexed row/column coordinates.
//! Column letters form a bijective base-26 numeral, so `Z` is followed by
//! `AA` rather than `BA`.
//!
//! # Examples
//!
//! ```
//! use sheetcalc_engine::engine::CellRef;
//!
//! let cell = CellRef::parse_address("B3").unwrap();
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Failure to interpret a string as a cell address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),
}

/// A reference to a cell by row and column indices (0-indexed).
///
/// Ordering is row-major, which is the order cells are written to disk.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse an address such as `A1` or `AA10`.
    ///
    /// Lowercase letters are accepted and normalized. Row `0` and addresses
    /// whose column or row do not fit in a `usize` are rejected.
    pub fn parse_address(address: &str) -> Result<CellRef, AddressError> {
        let caps = address_re()
            .captures(address)
            .ok_or_else(|| invalid(address))?;
        let letters = &caps["letters"];
        let digits = &caps["digits"];

        let mut col_acc = 0usize;
        for c in letters.to_ascii_uppercase().bytes() {
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc
                .checked_mul(26)
                .and_then(|acc| acc.checked_add(digit))
                .ok_or_else(|| invalid(address))?;
        }
        // At least one letter matched, so the accumulator is >= 1.
        let col = col_acc - 1;

        let row = digits
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(|| invalid(address))?;

        Ok(CellRef::new(row, col))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn column_label_of(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

fn address_re() -> &'static Regex {
    static ADDRESS_RE: OnceLock<Regex> = OnceLock::new();
    ADDRESS_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<digits>[0-9]+)$").expect("address regex must compile")
    })
}

fn invalid(address: &str) -> AddressError {
    AddressError::InvalidAddress(address.to_string())
}

/// Letter label for a zero-based column index.
pub fn column_label_of(col: usize) -> String {
    CellRef::column_label_of(col)
}

/// Address string for zero-based coordinates, e.g. `(11, 1)` -> `"B12"`.
pub fn address_of(row: usize, col: usize) -> String {
    CellRef::new(row, col).to_string()
}

/// Parse an address string into zero-based coordinates.
pub fn parse_address(address: &str) -> Result<CellRef, AddressError> {
    CellRef::parse_address(address)
}

impl std::str::FromStr for CellRef {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_address(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::column_label_of(self.col), self.row as u128 + 1)
    }
}

impl Serialize for CellRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CellRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let address = String::deserialize(deserializer)?;
        CellRef::parse_address(&address).map_err(serde::de::Error::custom)
    }
}
