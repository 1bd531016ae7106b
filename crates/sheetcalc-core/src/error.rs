//! Error types for sheetcalc core.

use thiserror::Error;

use sheetcalc_engine::engine::AddressError;

/// Errors that can occur while editing, loading or saving a sheet.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    InvalidAddress(#[from] AddressError),

    #[error("No file path set")]
    NoFilePath,
}

pub type Result<T> = std::result::Result<T, SheetError>;
