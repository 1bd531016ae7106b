//! Markdown export functionality

use crate::document::Document;
use sheetcalc_engine::engine::{CellRef, column_label_of};
use std::fmt::Write as _;
use std::path::Path;

/// Write the grid's display values to a markdown file
pub fn write_markdown(path: &Path, doc: &Document) -> std::io::Result<()> {
    std::fs::write(path, markdown_content(doc))
}

/// Render the grid's display values as a markdown table
pub fn markdown_content(doc: &Document) -> String {
    let mut out = String::new();
    out.push_str("# Sheet\n\n");

    let Some((min_row, min_col, max_row, max_col)) = find_grid_bounds(doc) else {
        out.push_str("*Empty spreadsheet*\n");
        return out;
    };

    // Header with column letters
    out.push_str("|   |");
    for col in min_col..=max_col {
        let _ = write!(out, " {} |", column_label_of(col));
    }
    out.push('\n');

    out.push_str("|---|");
    for _ in min_col..=max_col {
        out.push_str("---|");
    }
    out.push('\n');

    for row in min_row..=max_row {
        let _ = write!(out, "| {} |", row + 1); // 1-based row numbers
        for col in min_col..=max_col {
            let cell_ref = CellRef::new(row, col);
            let display = escape_markdown(&doc.cell_display(&cell_ref));
            if display.is_empty() {
                out.push_str("  |");
            } else {
                let _ = write!(out, " {} |", emphasize(doc, &cell_ref, display));
            }
        }
        out.push('\n');
    }

    out
}

/// Find the bounds of the populated cells (min_row, min_col, max_row, max_col)
fn find_grid_bounds(doc: &Document) -> Option<(usize, usize, usize, usize)> {
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for entry in doc.grid.iter() {
        let cell_ref = entry.key();
        bounds = Some(match bounds {
            None => (cell_ref.row, cell_ref.col, cell_ref.row, cell_ref.col),
            Some((min_row, min_col, max_row, max_col)) => (
                min_row.min(cell_ref.row),
                min_col.min(cell_ref.col),
                max_row.max(cell_ref.row),
                max_col.max(cell_ref.col),
            ),
        });
    }
    bounds
}

fn emphasize(doc: &Document, cell_ref: &CellRef, text: String) -> String {
    let style = doc.cell_style(cell_ref);
    let mut text = text;
    if style.underline {
        text = format!("<u>{}</u>", text);
    }
    if style.italic {
        text = format!("*{}*", text);
    }
    if style.bold {
        text = format!("**{}**", text);
    }
    text
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}
