//! Formula evaluation against a grid snapshot.
//!
//! [`evaluate`] resolves the display string for one cell. References are
//! resolved recursively through the same path, carrying a set of the cells
//! currently being resolved on the call stack. Meeting a cell that is
//! already in the set means the formula depends on itself.
//!
//! A cell leaves the set as soon as its own evaluation finishes, so two
//! siblings that share an ancestor (a "diamond") are not reported as
//! circular. Shared ancestors are recomputed once per path; nothing is
//! cached between calls.
//!
//! Pending formulas live on a heap-allocated stack rather than the call
//! stack, so a reference chain may be as long as the sheet itself.
//!
//! Failures are typed ([`EvalError`]) while evaluating and only turn into
//! the `#CIRCULAR` / `#ERROR` sentinels at the string boundary.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;
use tracing::{debug, trace};

use super::cell::{Grid, formula_body, parse_number};
use super::cell_ref::CellRef;
use super::expr::{Token, evaluate_tokens, tokenize};
use super::format::format_number;

pub const CIRCULAR_SENTINEL: &str = "#CIRCULAR";
pub const ERROR_SENTINEL: &str = "#ERROR";

/// Why a formula could not produce a number.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    #[error("formula references itself")]
    Circular,
    #[error("malformed expression")]
    Malformed,
    #[error("referenced cell is not a number")]
    NotANumber,
    #[error("result is not a finite number")]
    NonFinite,
    #[error("invalid cell reference")]
    InvalidReference,
}

impl EvalError {
    /// The in-band string shown in place of a value.
    pub fn sentinel(&self) -> &'static str {
        match self {
            EvalError::Circular => CIRCULAR_SENTINEL,
            EvalError::Malformed
            | EvalError::NotANumber
            | EvalError::NonFinite
            | EvalError::InvalidReference => ERROR_SENTINEL,
        }
    }
}

/// The successful result of resolving a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    /// Non-formula content, returned verbatim.
    Text(String),
}

impl Value {
    /// Numeric view used when the value is referenced arithmetically.
    pub fn as_number(&self) -> Result<f64, EvalError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::Text(s) => parse_number(s).ok_or(EvalError::NotANumber),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Compute the display string for `cell_ref`. Never fails: evaluation
/// errors come back as `#CIRCULAR` or `#ERROR`.
///
/// Empty and absent cells evaluate to `"0"`; non-formula content is
/// returned verbatim.
pub fn evaluate(cell_ref: &CellRef, grid: &Grid) -> String {
    display(try_evaluate(cell_ref, grid))
}

/// Like [`evaluate`], taking the address as text. A malformed address
/// yields `#ERROR`.
pub fn evaluate_address(address: &str, grid: &Grid) -> String {
    match CellRef::parse_address(address) {
        Ok(cell_ref) => evaluate(&cell_ref, grid),
        Err(e) => {
            debug!(%address, error = %e, "cannot evaluate malformed address");
            ERROR_SENTINEL.to_string()
        }
    }
}

/// Evaluate free-standing formula text (with or without the leading `=`),
/// e.g. a formula bar preview before the edit is committed.
pub fn evaluate_formula(formula: &str, grid: &Grid) -> String {
    let expr = formula.strip_prefix('=').unwrap_or(formula);
    let mut visiting = HashSet::new();
    display(run(Frame::new(None, expr), grid, &mut visiting).map(Value::Number))
}

/// Typed evaluation of one cell with a fresh visiting set.
pub fn try_evaluate(cell_ref: &CellRef, grid: &Grid) -> Result<Value, EvalError> {
    let mut visiting = HashSet::new();
    match enter(cell_ref, grid, &mut visiting)? {
        Step::Value(value) => Ok(value),
        Step::Descend(frame) => run(frame, grid, &mut visiting).map(Value::Number),
    }
}

fn display(result: Result<Value, EvalError>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(e) => e.sentinel().to_string(),
    }
}

/// A formula whose references are being resolved left to right.
struct Frame {
    cell: Option<CellRef>,
    tokens: Vec<Token>,
    next: usize,
}

impl Frame {
    fn new(cell: Option<CellRef>, expr: &str) -> Frame {
        Frame {
            cell,
            tokens: tokenize(expr),
            next: 0,
        }
    }

    /// The next unresolved reference, if any.
    fn next_reference(&mut self) -> Option<String> {
        while let Some(token) = self.tokens.get(self.next) {
            if let Token::Ref(address) = token {
                return Some(address.clone());
            }
            self.next += 1;
        }
        None
    }

    /// Replace the current reference with its value.
    fn fill(&mut self, value: f64) {
        if let Some(token) = self.tokens.get_mut(self.next) {
            *token = Token::Number(value);
        }
        self.next += 1;
    }
}

enum Step {
    Value(Value),
    Descend(Frame),
}

/// Look at one cell: either its value is known right away, or its formula
/// has to be evaluated first.
fn enter(
    cell_ref: &CellRef,
    grid: &Grid,
    visiting: &mut HashSet<CellRef>,
) -> Result<Step, EvalError> {
    if visiting.contains(cell_ref) {
        debug!(cell = %cell_ref, "circular reference detected");
        return Err(EvalError::Circular);
    }

    // Copy the content out so no map guard is held while evaluating.
    let raw = match grid.get(cell_ref) {
        Some(cell) => cell.raw.clone(),
        None => return Ok(Step::Value(Value::Number(0.0))),
    };
    if raw.is_empty() {
        return Ok(Step::Value(Value::Number(0.0)));
    }
    let Some(expr) = formula_body(&raw) else {
        return Ok(Step::Value(Value::Text(raw)));
    };

    visiting.insert(cell_ref.clone());
    Ok(Step::Descend(Frame::new(Some(cell_ref.clone()), expr)))
}

/// Resolve every reference left to right, then evaluate the arithmetic.
/// The first failure anywhere below `root` is the result.
fn run(root: Frame, grid: &Grid, visiting: &mut HashSet<CellRef>) -> Result<f64, EvalError> {
    let mut stack = vec![root];

    while let Some(frame) = stack.last_mut() {
        if let Some(address) = frame.next_reference() {
            let target =
                CellRef::parse_address(&address).map_err(|_| EvalError::InvalidReference)?;
            trace!(reference = %target, "resolving reference");
            match enter(&target, grid, visiting)? {
                Step::Value(value) => frame.fill(value.as_number()?),
                Step::Descend(child) => stack.push(child),
            }
            continue;
        }

        let value = evaluate_tokens(&frame.tokens)?;
        if let Some(cell) = stack.pop().and_then(|done| done.cell) {
            visiting.remove(&cell);
        }
        match stack.last_mut() {
            Some(parent) => parent.fill(value),
            None => return Ok(value),
        }
    }
    Err(EvalError::Malformed)
}
