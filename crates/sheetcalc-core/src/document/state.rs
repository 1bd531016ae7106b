use crate::error::Result;
use sheetcalc_engine::engine::Grid;
use std::path::PathBuf;

pub(crate) const DEFAULT_FONT_FAMILY: &str = "Arial";
pub(crate) const DEFAULT_FONT_SIZE: u32 = 12;

/// Presentation used for cells that do not set their own font.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatDefaults {
    pub font_family: String,
    pub font_size: u32,
}

impl Default for FormatDefaults {
    fn default() -> Self {
        FormatDefaults {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// A cell's format with defaults filled in, ready for a renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub font_family: String,
    pub font_size: u32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// UI-agnostic document state for the spreadsheet.
pub struct Document {
    /// The spreadsheet grid
    pub grid: Grid,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the grid has been modified
    pub modified: bool,
    /// Font used when a cell sets none
    pub defaults: FormatDefaults,
}

impl Document {
    /// Create a new, empty document.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Self::with_defaults(FormatDefaults::default())
    }

    pub fn with_defaults(defaults: FormatDefaults) -> Self {
        Document {
            grid: Grid::new(),
            file_path: None,
            modified: false,
            defaults,
        }
    }

    /// Create a new document and load a file if provided.
    ///
    /// A path that does not exist yet becomes the save target of an empty
    /// document.
    pub fn with_file(path: Option<PathBuf>, defaults: FormatDefaults) -> Result<Self> {
        let mut doc = Self::with_defaults(defaults);

        if let Some(ref p) = path {
            if p.exists() {
                doc.load_file(p)?;
            } else {
                doc.file_path = Some(p.clone());
                doc.modified = false;
            }
        }
        Ok(doc)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
