//! Spreadsheet engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`Cell`], [`CellType`], [`CellFormat`], [`Grid`] - Data structures for cell storage
//! - [`CellRef`] - Address codec (A1 notation ↔ row/col indices)
//! - [`evaluate`] - Display value of a cell, with `#CIRCULAR` / `#ERROR` sentinels
//! - [`detect_cycle`], [`detect_cycles`] - Static circular dependency detection
//! - [`extract_dependencies`] - Parse formula dependencies
//! - [`format_number`] - Format values for display

mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod eval;
mod expr;
mod format;

pub use cell::{Cell, CellFormat, CellType, Grid, formula_body, is_formula, parse_number};
pub use cell_ref::{AddressError, CellRef, address_of, column_label_of, parse_address};
pub use cycle::{detect_cycle, detect_cycles};
pub use deps::{cell_dependencies, extract_dependencies};
pub use eval::{
    CIRCULAR_SENTINEL, ERROR_SENTINEL, EvalError, Value, evaluate, evaluate_address,
    evaluate_formula, try_evaluate,
};
pub use expr::{Token, evaluate_tokens, tokenize};
pub use format::format_number;
