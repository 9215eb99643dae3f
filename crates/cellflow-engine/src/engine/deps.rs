//! Range expansion and dependency extraction from formula strings.
//!
//! Parses formula text to find all cell references (e.g., `A1`, `B2:C5`)
//! that the formula depends on. This is used to build the dependency graph
//! for propagation and cycle detection.
//!
//! Handles:
//! - Simple cell references: `A1`, `B2`
//! - Rectangles anywhere in the formula: `SUM(A1:B5)`, expanded to every cell
//! - Comma lists inside function calls are picked up as simple references

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::trace;

use super::cell_ref::{CellRef, cell_id_re};
use super::error::{EvalError, EvalResult};

pub const MAX_RANGE_CELLS: usize = 1_000_000;

/// Expand a range expression into its cells.
///
/// Accepted forms, tried in order:
/// 1. a single identifier (`B7`)
/// 2. a rectangle (`A1:B3`), enumerated row-major whichever corner comes first
/// 3. a comma list (`A1, C4`), kept in the listed order
pub fn expand_range(expr: &str) -> EvalResult<Vec<CellRef>> {
    let expr = expr.trim();

    if cell_id_re().is_match(expr) {
        return Ok(vec![CellRef::parse(expr)?]);
    }

    if let Some((start, end)) = parse_range(expr)? {
        return rectangle(start, end);
    }

    if expr.contains(',') {
        return expr
            .split(',')
            .map(|part| {
                let part = part.trim();
                if cell_id_re().is_match(part) {
                    CellRef::parse(part)
                } else {
                    Err(EvalError::MalformedRange(expr.to_string()))
                }
            })
            .collect();
    }

    Err(EvalError::MalformedRange(expr.to_string()))
}

/// Parse a rectangle like "A1:B5" into its two corners.
///
/// Returns `Ok(None)` when the text is not shaped like a rectangle.
pub fn parse_range(range: &str) -> EvalResult<Option<(CellRef, CellRef)>> {
    let Some(caps) = range_re().captures(range) else {
        return Ok(None);
    };
    let start = CellRef::parse(&caps[1])?;
    let end = CellRef::parse(&caps[2])?;
    Ok(Some((start, end)))
}

/// All cells of the rectangle spanned by two corners, row-major.
pub fn rectangle(start: CellRef, end: CellRef) -> EvalResult<Vec<CellRef>> {
    let min_row = start.row.min(end.row);
    let max_row = start.row.max(end.row);
    let min_col = start.col.min(end.col);
    let max_col = start.col.max(end.col);

    let row_count = max_row - min_row + 1;
    let col_count = max_col - min_col + 1;
    let cell_count = row_count.checked_mul(col_count).unwrap_or(usize::MAX);
    if cell_count > MAX_RANGE_CELLS {
        return Err(EvalError::RangeTooLarge(cell_count));
    }

    let mut cells = Vec::with_capacity(cell_count);
    for row in min_row..=max_row {
        for col in min_col..=max_col {
            cells.push(CellRef::new(col, row));
        }
    }
    Ok(cells)
}

/// Extract all cell references from a formula as dependencies.
///
/// The leading `=` is optional. References are matched case-insensitively,
/// duplicates are dropped and first-seen order is kept. Rectangles over
/// [`MAX_RANGE_CELLS`] contribute only their corners.
pub fn extract_dependencies(formula: &str) -> Vec<CellRef> {
    let body = formula.strip_prefix('=').unwrap_or(formula).to_uppercase();
    let mut deps = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |cell: CellRef| {
        if seen.insert(cell) {
            deps.push(cell);
        }
    };

    for caps in reference_re().captures_iter(&body) {
        let Ok(start) = CellRef::parse(&caps[1]) else {
            continue;
        };
        let end = caps.get(2).and_then(|m| CellRef::parse(m.as_str()).ok());

        match end {
            Some(end) => match rectangle(start, end) {
                Ok(cells) => cells.into_iter().for_each(&mut push),
                Err(_) => {
                    trace!(%start, %end, "range over limit; tracking corners only");
                    push(start);
                    push(end);
                }
            },
            None => push(start),
        }
    }

    deps
}

fn range_re() -> &'static Regex {
    static RANGE_RE: OnceLock<Regex> = OnceLock::new();
    RANGE_RE.get_or_init(|| {
        Regex::new(r"^([A-Z]+[0-9]+)\s*:\s*([A-Z]+[0-9]+)$").expect("range regex must compile")
    })
}

fn reference_re() -> &'static Regex {
    static REFERENCE_RE: OnceLock<Regex> = OnceLock::new();
    REFERENCE_RE.get_or_init(|| {
        Regex::new(r"([A-Z]+[0-9]+)(?:\s*:\s*([A-Z]+[0-9]+))?")
            .expect("dependency reference regex must compile")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn refs(ids: &[&str]) -> Vec<CellRef> {
        ids.iter().map(|id| CellRef::parse(id).unwrap()).collect()
    }

    #[test]
    fn test_expand_single() {
        assert_eq!(expand_range("B7").unwrap(), refs(&["B7"]));
        assert_eq!(expand_range("  B7 ").unwrap(), refs(&["B7"]));
    }

    #[test]
    fn test_expand_rectangle_either_corner() {
        let expected = refs(&["A1", "B1", "A2", "B2"]);
        assert_eq!(expand_range("A1:B2").unwrap(), expected);
        assert_eq!(expand_range("B2:A1").unwrap(), expected);
        assert_eq!(expand_range("A2:B1").unwrap(), expected);
        assert_eq!(expand_range("A1 : B2").unwrap(), expected);
    }

    #[test]
    fn test_expand_comma_list_keeps_order() {
        assert_eq!(expand_range("C3, A1,B2").unwrap(), refs(&["C3", "A1", "B2"]));
        assert_eq!(expand_range("A1,A1").unwrap(), refs(&["A1", "A1"]));
    }

    #[test]
    fn test_expand_rejects_other_shapes() {
        for bad in ["", "A", "1", "A1:B", "A1:B2:C3", "A1,B2:C3", "A1;B2", "A1,"] {
            assert!(
                matches!(expand_range(bad), Err(EvalError::MalformedRange(_))),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_expand_undecodable_reference() {
        assert!(matches!(
            expand_range("A0"),
            Err(EvalError::MalformedReference(_))
        ));
        assert!(matches!(
            expand_range("A0:B2"),
            Err(EvalError::MalformedReference(_))
        ));
    }

    #[test]
    fn test_expand_over_limit() {
        assert_eq!(
            expand_range("A1:A1000001"),
            Err(EvalError::RangeTooLarge(1_000_001))
        );
    }

    #[test]
    fn test_extract_dependencies_empty() {
        assert!(extract_dependencies("=10 + 20").is_empty());
        assert!(extract_dependencies("").is_empty());
    }

    #[test]
    fn test_extract_dependencies_dedupes_in_order() {
        assert_eq!(
            extract_dependencies("=B1 + A1 * B1"),
            refs(&["B1", "A1"])
        );
    }

    #[test]
    fn test_extract_dependencies_expands_ranges() {
        assert_eq!(
            extract_dependencies("=SUM(A1:A3)"),
            refs(&["A1", "A2", "A3"])
        );
        assert_eq!(
            extract_dependencies("=sum(b2:a1)"),
            refs(&["A1", "B1", "A2", "B2"])
        );
    }

    #[test]
    fn test_extract_dependencies_comma_list() {
        assert_eq!(
            extract_dependencies("=MAX(C1, A1,B1)"),
            refs(&["C1", "A1", "B1"])
        );
    }

    #[test]
    fn test_extract_dependencies_skips_over_limit_ranges() {
        let deps = extract_dependencies("=SUM(A1:A1000001)+B2");
        assert_eq!(deps, refs(&["A1", "A1000001", "B2"]));
    }

    #[test]
    fn test_extract_dependencies_ignores_undecodable() {
        assert_eq!(extract_dependencies("=A0+B1"), refs(&["B1"]));
    }
}
