use super::{Document, ResolvedStyle};
use crate::error::Result;
use sheetcalc_engine::engine::{self, Cell, CellRef};
use tracing::debug;

/// A format-only edit. Content is never touched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatChange {
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    FontFamily(String),
    FontSize(u32),
}

impl Document {
    /// Set cell contents from input string.
    ///
    /// The raw content is replaced wholesale; the cell's format is kept.
    /// Setting empty content on an unformatted cell removes it.
    pub fn set_cell(&mut self, cell_ref: CellRef, input: &str) {
        let format = self
            .grid
            .get(&cell_ref)
            .map(|entry| entry.format.clone())
            .unwrap_or_default();
        debug!(cell = %cell_ref, formula = engine::is_formula(input), "set cell");
        self.store(cell_ref, Cell::from_input(input).with_format(format));
    }

    /// Like [`Document::set_cell`], addressing the cell by name (e.g. `"B12"`).
    pub fn set_cell_by_address(&mut self, address: &str, input: &str) -> Result<CellRef> {
        let cell_ref = CellRef::parse_address(address)?;
        self.set_cell(cell_ref.clone(), input);
        Ok(cell_ref)
    }

    /// Clear the specified cell's content. Formatting survives.
    pub fn clear_cell(&mut self, cell_ref: &CellRef) {
        if self.grid.contains_key(cell_ref) {
            self.set_cell(cell_ref.clone(), "");
        }
    }

    /// Apply a format-only change, creating the cell if needed.
    pub fn update_format(&mut self, cell_ref: CellRef, change: FormatChange) {
        let mut cell = self
            .grid
            .get(&cell_ref)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();

        let format = &mut cell.format;
        match change {
            FormatChange::ToggleBold => format.bold = !format.bold,
            FormatChange::ToggleItalic => format.italic = !format.italic,
            FormatChange::ToggleUnderline => format.underline = !format.underline,
            FormatChange::FontFamily(family) => format.font_family = Some(family),
            FormatChange::FontSize(size) => format.font_size = Some(size),
        }
        self.store(cell_ref, cell);
    }

    fn store(&mut self, cell_ref: CellRef, cell: Cell) {
        if cell.is_empty() && cell.format.is_default() {
            self.grid.remove(&cell_ref);
        } else {
            self.grid.insert(cell_ref, cell);
        }
        self.modified = true;
    }

    /// Text to put in an editor for this cell.
    pub fn cell_input(&self, cell_ref: &CellRef) -> String {
        self.grid
            .get(cell_ref)
            .map(|entry| entry.raw.clone())
            .unwrap_or_default()
    }

    /// Text to show in the grid for this cell.
    ///
    /// Blank cells show nothing (unlike [`Document::evaluate`], which treats
    /// them as `0`), plain content shows as typed, formulas show their value.
    pub fn cell_display(&self, cell_ref: &CellRef) -> String {
        let raw = self.cell_input(cell_ref);
        if engine::is_formula(&raw) {
            engine::evaluate(cell_ref, &self.grid)
        } else {
            raw
        }
    }

    /// Evaluate a cell against the current grid.
    pub fn evaluate(&self, cell_ref: &CellRef) -> String {
        engine::evaluate(cell_ref, &self.grid)
    }

    /// Evaluate formula text against the current grid without storing it.
    pub fn preview_formula(&self, formula: &str) -> String {
        engine::evaluate_formula(formula, &self.grid)
    }

    /// The cell's format with document defaults applied.
    pub fn cell_style(&self, cell_ref: &CellRef) -> ResolvedStyle {
        let format = self
            .grid
            .get(cell_ref)
            .map(|entry| entry.format.clone())
            .unwrap_or_default();
        ResolvedStyle {
            font_family: format
                .font_family
                .unwrap_or_else(|| self.defaults.font_family.clone()),
            font_size: format.font_size.unwrap_or(self.defaults.font_size),
            bold: format.bold,
            italic: format.italic,
            underline: format.underline,
        }
    }

    /// Populated cells in row-major order.
    pub fn cell_refs(&self) -> Vec<CellRef> {
        let mut refs: Vec<CellRef> = self.grid.iter().map(|entry| entry.key().clone()).collect();
        refs.sort();
        refs
    }

    /// One loop for each group of formula cells that depend on each other.
    ///
    /// Loops that share a cell are one group and are reported once. Each loop
    /// starts and ends at the group's smallest cell (row-major), e.g.
    /// `[A1, B1, A1]`.
    pub fn find_cycles(&self) -> Vec<Vec<CellRef>> {
        engine::detect_cycles(&self.grid)
    }
}
