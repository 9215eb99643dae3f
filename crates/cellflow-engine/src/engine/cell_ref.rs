//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B2", "AA100") and zero-indexed column/row coordinates.
//! Identifiers are canonical upper-case: `[A-Z]+[0-9]+`, 1-based row number.
//!
//! # Examples
//!
//! ```
//! use cellflow_engine::engine::CellRef;
//!
//! let cell = CellRef::parse("B3").unwrap();
//! assert_eq!(cell.col, 1);  // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::error::{EvalError, EvalResult};

/// A reference to a cell by column and row indices (0-indexed).
///
/// Ordering is row-major, which is also the enumeration order of ranges.
#[derive(
    Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a canonical identifier such as `A1` or `AA12`.
    ///
    /// Fails with [`EvalError::MalformedReference`] when the text is not
    /// `[A-Z]+[0-9]+`, names row 0, or does not fit in `usize`.
    pub fn parse(name: &str) -> EvalResult<CellRef> {
        let malformed = || EvalError::MalformedReference(name.to_string());
        let caps = cell_id_re().captures(name).ok_or_else(malformed)?;

        let col = Self::letters_to_col(&caps["letters"]).ok_or_else(malformed)?;
        let row = caps["numbers"]
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(malformed)?;

        Ok(CellRef::new(col, row))
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }

    /// Convert upper-case column letters back to a 0-based index.
    pub fn letters_to_col(letters: &str) -> Option<usize> {
        if letters.is_empty() {
            return None;
        }
        let mut col_acc = 0usize;
        for c in letters.bytes() {
            if !c.is_ascii_uppercase() {
                return None;
            }
            let digit = (c - b'A') as usize + 1;
            col_acc = col_acc.checked_mul(26)?.checked_add(digit)?;
        }
        col_acc.checked_sub(1)
    }
}

impl std::str::FromStr for CellRef {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRef::parse(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}

/// Render a 0-based position as an identifier (`(0, 0)` -> `A1`).
pub fn position_to_id(row: usize, col: usize) -> String {
    CellRef::new(col, row).to_string()
}

/// Decode an identifier into its 0-based `(row, col)` position.
pub fn id_to_position(id: &str) -> EvalResult<(usize, usize)> {
    let cell = CellRef::parse(id)?;
    Ok((cell.row, cell.col))
}

/// Anchored identifier pattern: whole string is one cell reference.
pub(crate) fn cell_id_re() -> &'static Regex {
    static CELL_ID_RE: OnceLock<Regex> = OnceLock::new();
    CELL_ID_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$")
            .expect("cell identifier regex must compile")
    })
}
