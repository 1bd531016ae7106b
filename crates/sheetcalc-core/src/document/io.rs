use super::Document;
use crate::error::{Result, SheetError};
use crate::storage::{parse_grd, write_grd, write_markdown};
use std::path::{Path, PathBuf};
use tracing::debug;

impl Document {
    /// Save to current file path.
    /// Returns the path saved to.
    pub fn save_file(&mut self) -> Result<PathBuf> {
        let Some(path) = &self.file_path else {
            return Err(SheetError::NoFilePath);
        };

        write_grd(path, &self.grid)?;
        debug!(path = %path.display(), cells = self.grid.len(), "saved sheet");
        self.modified = false;
        Ok(path.clone())
    }

    /// Save to a new path and remember it for later saves.
    pub fn save_as(&mut self, path: &Path) -> Result<PathBuf> {
        self.file_path = Some(path.to_path_buf());
        self.save_file()
    }

    /// Load from file. The current grid is only replaced if parsing succeeds.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let grid = parse_grd(path)?;
        debug!(path = %path.display(), cells = grid.len(), "loaded sheet");

        self.grid = grid;
        self.file_path = Some(path.to_path_buf());
        self.modified = false;
        Ok(())
    }

    /// Export display values as a Markdown table.
    pub fn export_markdown(&self, path: &Path) -> Result<()> {
        write_markdown(path, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use crate::document::{FormatChange, FormatDefaults};
    use crate::error::SheetError;
    use pretty_assertions::assert_eq;
    use sheetcalc_engine::engine::CellRef;

    #[test]
    fn test_save_without_path_fails() {
        let mut doc = Document::new();
        assert!(matches!(doc.save_file(), Err(SheetError::NoFilePath)));
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.grd");

        let mut doc = Document::new();
        doc.set_cell(CellRef::new(0, 0), "5");
        doc.set_cell(CellRef::new(0, 1), "=A1+3");
        doc.set_cell(CellRef::new(1, 0), "say \"hi\"");
        doc.update_format(CellRef::new(0, 1), FormatChange::ToggleBold);
        doc.save_as(&path).unwrap();
        assert!(!doc.modified);

        let loaded = Document::with_file(Some(path.clone()), FormatDefaults::default()).unwrap();
        assert_eq!(loaded.file_path.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.cell_refs(), doc.cell_refs());
        assert_eq!(loaded.cell_display(&CellRef::new(0, 1)), "8");
        assert_eq!(loaded.cell_input(&CellRef::new(1, 0)), "say \"hi\"");
        assert!(loaded.cell_style(&CellRef::new(0, 1)).bold);
    }

    #[test]
    fn test_failed_load_keeps_current_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.grd");
        std::fs::write(&path, "A1: 1\nnot a cell line\n").unwrap();

        let mut doc = Document::new();
        doc.set_cell(CellRef::new(0, 0), "keep me");
        let err = doc.load_file(&path).unwrap_err();
        assert!(matches!(err, SheetError::Parse { line: 2, .. }));
        assert_eq!(doc.cell_input(&CellRef::new(0, 0)), "keep me");
        assert!(doc.file_path.is_none());
    }

    #[test]
    fn test_with_file_missing_path_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.grd");
        let doc = Document::with_file(Some(path.clone()), FormatDefaults::default()).unwrap();
        assert!(doc.grid.is_empty());
        assert_eq!(doc.file_path, Some(path));
    }
}
