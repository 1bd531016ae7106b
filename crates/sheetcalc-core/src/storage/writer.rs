//! Writer for .grd file format

use crate::error::Result;
use sheetcalc_engine::engine::{Cell, CellFormat, CellRef, CellType, Grid};
use std::fs;
use std::path::Path;

/// Write a Grid to a .grd file
pub fn write_grd(path: &Path, grid: &Grid) -> Result<()> {
    let content = write_grd_content(grid);
    fs::write(path, content)?;
    Ok(())
}

/// Write a Grid to a .grd format string
pub fn write_grd_content(grid: &Grid) -> String {
    let mut lines = vec!["# sheetcalc sheet".to_string()];

    // Collect and sort cells by position for consistent output
    let mut cells: Vec<(CellRef, Cell)> = grid
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().clone()))
        .collect();
    cells.sort_by(|a, b| a.0.cmp(&b.0));

    for (cell_ref, cell) in cells {
        if cell.is_empty() && cell.format.is_default() {
            continue;
        }

        let mut line = format!("{}: {}", cell_ref, encode_raw(&cell));
        let attrs = encode_format(&cell.format);
        if !attrs.is_empty() {
            line.push_str(" ;; ");
            line.push_str(&attrs);
        }
        lines.push(line);
    }

    lines.join("\n") + "\n"
}

/// Numbers and formulas are written bare when that reads back identically;
/// everything else is quoted.
fn encode_raw(cell: &Cell) -> String {
    let raw = cell.raw.as_str();
    let bare = matches!(cell.kind(), CellType::Number(_) | CellType::Formula(_))
        && raw.trim() == raw
        && !raw.contains(";;")
        && !raw.contains(['\n', '\r', '"']);
    if bare {
        raw.to_string()
    } else {
        format!("\"{}\"", escape_grd_text(raw))
    }
}

fn encode_format(format: &CellFormat) -> String {
    let mut attrs = Vec::new();
    if format.bold {
        attrs.push("bold".to_string());
    }
    if format.italic {
        attrs.push("italic".to_string());
    }
    if format.underline {
        attrs.push("underline".to_string());
    }
    if let Some(size) = format.font_size {
        attrs.push(format!("size={}", size));
    }
    if let Some(family) = &format.font_family {
        attrs.push(format!("font=\"{}\"", escape_grd_text(family)));
    }
    attrs.join(" ")
}

fn escape_grd_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::parse_grd_content;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_number_and_formula_bare() {
        let grid = Grid::new();
        grid.insert(CellRef::new(0, 0), Cell::from_input("42"));
        grid.insert(CellRef::new(0, 1), Cell::from_input("=A1 + 1"));
        let content = write_grd_content(&grid);
        assert!(content.contains("A1: 42\n"));
        assert!(content.contains("B1: =A1 + 1\n"));
    }

    #[test]
    fn test_non_formula_starting_with_equals_is_quoted() {
        let grid = Grid::new();
        grid.insert(CellRef::new(0, 0), Cell::from_input("=1#2"));
        let content = write_grd_content(&grid);
        assert!(content.contains("A1: \"=1#2\"\n"));
    }

    #[test]
    fn test_write_text_quoted() {
        let grid = Grid::new();
        grid.insert(CellRef::new(0, 0), Cell::from_input("Hello"));
        grid.insert(CellRef::new(1, 0), Cell::from_input(" 7 "));
        grid.insert(CellRef::new(2, 0), Cell::from_input("a\\b"));
        let content = write_grd_content(&grid);
        assert!(content.contains("A1: \"Hello\""));
        assert!(content.contains("A2: \" 7 \""));
        assert!(content.contains("A3: \"a\\\\b\""));
    }

    #[test]
    fn test_write_format_attributes() {
        let grid = Grid::new();
        let format = CellFormat {
            font_family: Some("Helvetica".to_string()),
            font_size: Some(10),
            bold: true,
            italic: true,
            underline: false,
        };
        grid.insert(CellRef::new(0, 0), Cell::from_input("").with_format(format));
        let content = write_grd_content(&grid);
        assert!(content.contains("A1: \"\" ;; bold italic size=10 font=\"Helvetica\""));
    }

    #[test]
    fn test_skip_empty_cells() {
        let grid = Grid::new();
        grid.insert(CellRef::new(0, 0), Cell::new_empty());
        grid.insert(CellRef::new(0, 1), Cell::from_input("42"));
        let content = write_grd_content(&grid);
        assert!(!content.contains("A1:"));
        assert!(content.contains("B1: 42"));
    }

    #[test]
    fn test_sorted_output() {
        let grid = Grid::new();
        grid.insert(CellRef::new(1, 1), Cell::from_input("3")); // B2
        grid.insert(CellRef::new(0, 0), Cell::from_input("1")); // A1
        grid.insert(CellRef::new(0, 1), Cell::from_input("2")); // B1
        let content = write_grd_content(&grid);
        let lines: Vec<_> = content.lines().collect();
        // After header, should be A1, B1, B2
        assert!(lines[1].starts_with("A1"));
        assert!(lines[2].starts_with("B1"));
        assert!(lines[3].starts_with("B2"));
    }

    #[test]
    fn test_awkward_raw_content_survives_reload() {
        let grid = Grid::new();
        let raws = [
            "=1#2",
            "=A1 ;; B1",
            "\"quoted\"",
            "line\nbreak",
            "# not a comment",
            "1e5",
            " =A1",
        ];
        for (row, raw) in raws.iter().enumerate() {
            grid.insert(CellRef::new(row, 0), Cell::from_input(raw));
        }

        let reloaded = parse_grd_content(&write_grd_content(&grid)).unwrap();
        for (row, raw) in raws.iter().enumerate() {
            assert_eq!(reloaded.get(&CellRef::new(row, 0)).unwrap().raw, *raw);
        }
    }
}
