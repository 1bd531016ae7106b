//! Dependency extraction from formula strings.
//!
//! Finds every cell reference (e.g., `A1`, `AB12`) a formula mentions, using
//! the same tokenizer the evaluator uses, so the two always agree on what
//! counts as a reference. Used for static cycle detection.

use super::cell::Grid;
use super::cell_ref::CellRef;
use super::expr::{Token, tokenize};

/// Extract all cell references from formula text, in order of appearance.
/// A leading `=` is optional. Tokens that look like references but are not
/// valid addresses (e.g. `A0`) are skipped.
pub fn extract_dependencies(formula: &str) -> Vec<CellRef> {
    let expr = formula.strip_prefix('=').unwrap_or(formula);
    tokenize(expr)
        .into_iter()
        .filter_map(|token| match token {
            Token::Ref(address) => CellRef::parse_address(&address).ok(),
            _ => None,
        })
        .collect()
}

/// Direct dependencies of the cell at `cell_ref`; empty unless it holds a
/// formula.
pub fn cell_dependencies(cell_ref: &CellRef, grid: &Grid) -> Vec<CellRef> {
    match grid.get(cell_ref) {
        Some(cell) if cell.is_formula() => extract_dependencies(&cell.raw),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Cell;

    #[test]
    fn test_extract_dependencies_empty() {
        assert!(extract_dependencies("").is_empty());
        assert!(extract_dependencies("=10 + 20").is_empty());
    }

    #[test]
    fn test_extract_dependencies_in_order() {
        let deps = extract_dependencies("=C2 * (A1 + AB10)");
        assert_eq!(
            deps,
            vec![CellRef::new(1, 2), CellRef::new(0, 0), CellRef::new(9, 27)]
        );
    }

    #[test]
    fn test_extract_dependencies_skips_invalid_and_lowercase() {
        assert_eq!(extract_dependencies("A0+b2+C3"), vec![CellRef::new(2, 2)]);
    }

    #[test]
    fn test_cell_dependencies_ignores_non_formulas() {
        let grid = Grid::new();
        grid.insert(CellRef::new(0, 0), Cell::from_input("B1+C1"));
        grid.insert(CellRef::new(1, 0), Cell::from_input("=B1+C1"));
        grid.insert(CellRef::new(2, 0), Cell::from_input("=B1#"));
        assert!(cell_dependencies(&CellRef::new(0, 0), &grid).is_empty());
        assert_eq!(cell_dependencies(&CellRef::new(1, 0), &grid).len(), 2);
        assert!(cell_dependencies(&CellRef::new(2, 0), &grid).is_empty());
        assert!(cell_dependencies(&CellRef::new(9, 9), &grid).is_empty());
    }
}
