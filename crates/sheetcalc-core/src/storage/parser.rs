//! Parser for .grd file format
//!
//! One cell per line: `ADDRESS: VALUE [;; ATTRIBUTES]`. Bare values must be
//! numbers or formulas; anything else is quoted with `\\`, `\"`, `\n` and
//! `\r` escapes. Attributes are `bold`, `italic`, `underline`, `size=N` and
//! `font="Family"`. Blank lines and lines starting with `#` are skipped.

use crate::error::{Result, SheetError};
use sheetcalc_engine::engine::{Cell, CellFormat, CellRef, Grid, parse_number};
use std::fs;
use std::path::Path;

/// Parse a .grd file and return a Grid
pub fn parse_grd(path: &Path) -> Result<Grid> {
    let content = fs::read_to_string(path)?;
    parse_grd_content(&content)
}

/// Parse .grd content from a string
pub fn parse_grd_content(content: &str) -> Result<Grid> {
    let grid = Grid::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_no = line_num + 1;
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Parse "ADDRESS: VALUE" format
        let Some((address, value)) = line.split_once(':') else {
            return Err(parse_error(line_no, "Expected 'ADDRESS: VALUE' format"));
        };

        let address = address.trim();
        let cell_ref = CellRef::parse_address(address)
            .map_err(|_| parse_error(line_no, format!("Invalid cell address: {}", address)))?;

        let cell = parse_cell(value.trim(), line_no)?;
        if cell.is_empty() && cell.format.is_default() {
            continue;
        }
        grid.insert(cell_ref, cell);
    }

    Ok(grid)
}

fn parse_error(line: usize, message: impl Into<String>) -> SheetError {
    SheetError::Parse {
        line,
        message: message.into(),
    }
}

/// Parse the part after `ADDRESS:` into a Cell
fn parse_cell(text: &str, line: usize) -> Result<Cell> {
    let (raw, attrs) = if text.starts_with('"') {
        let (raw, rest) = read_quoted(text, line)?;
        let rest = rest.trim();
        if rest.is_empty() {
            (raw, None)
        } else if let Some(attrs) = rest.strip_prefix(";;") {
            (raw, Some(attrs))
        } else {
            return Err(parse_error(line, format!("Unexpected text after value: {}", rest)));
        }
    } else {
        let (value, attrs) = match text.split_once(";;") {
            Some((value, attrs)) => (value.trim(), Some(attrs)),
            None => (text, None),
        };
        if !value.is_empty() && !value.starts_with('=') && parse_number(value).is_none() {
            return Err(parse_error(
                line,
                format!("Invalid value: {}. Use quotes for text.", value),
            ));
        }
        (value.to_string(), attrs)
    };

    let format = match attrs {
        Some(attrs) => parse_format(attrs, line)?,
        None => CellFormat::default(),
    };
    Ok(Cell::from_input(&raw).with_format(format))
}

fn parse_format(attrs: &str, line: usize) -> Result<CellFormat> {
    let mut format = CellFormat::default();
    let mut rest = attrs.trim_start();

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("font=") {
            let (family, tail) = read_quoted(after, line)?;
            format.font_family = Some(family);
            rest = tail.trim_start();
            continue;
        }

        let (word, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        match word {
            "bold" => format.bold = true,
            "italic" => format.italic = true,
            "underline" => format.underline = true,
            _ => {
                let size = word
                    .strip_prefix("size=")
                    .ok_or_else(|| parse_error(line, format!("Unknown format attribute: {}", word)))?;
                let size = size
                    .parse::<u32>()
                    .map_err(|_| parse_error(line, format!("Invalid font size: {}", size)))?;
                format.font_size = Some(size);
            }
        }
        rest = tail.trim_start();
    }

    Ok(format)
}

/// Read a double-quoted, escaped string at the start of `text`.
/// Returns the unescaped contents and the text after the closing quote.
fn read_quoted(text: &str, line: usize) -> Result<(String, &str)> {
    let Some(body) = text.strip_prefix('"') else {
        return Err(parse_error(line, "Expected '\"'"));
    };

    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '"' => return Ok((out, &body[idx + 1..])),
            '\\' => match chars.next() {
                Some((_, '\\')) => out.push('\\'),
                Some((_, '"')) => out.push('"'),
                Some((_, 'n')) => out.push('\n'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            _ => out.push(ch),
        }
    }

    Err(parse_error(line, "Unterminated quoted string"))
}
