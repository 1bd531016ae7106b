//! sheetcalc-core - UI-agnostic document model + storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::{Document, FormatChange, FormatDefaults, ResolvedStyle};
pub use error::{Result, SheetError};

pub use sheetcalc_engine::engine::CellRef;
