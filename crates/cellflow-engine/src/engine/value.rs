//! Cell values as seen by formulas and by the display layer.
//!
//! - [`CellValue`] - Empty, number, text or an error marker
//! - [`parse_number`] - The numeric coercion used by aggregates and arithmetic

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use super::error::EvalError;
use super::format::format_number;

/// The current value of a cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Error(EvalError),
}

impl CellValue {
    /// Value of a non-formula input: the raw text itself.
    pub fn from_literal(raw: &str) -> CellValue {
        if raw.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    /// Numeric reading of the value, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number(s),
            CellValue::Empty | CellValue::Error(_) => None,
        }
    }

    /// Empty and text values are textual; string functions only touch these.
    pub fn is_textual(&self) -> bool {
        matches!(self, CellValue::Empty | CellValue::Text(_))
    }

    pub fn error(&self) -> Option<&EvalError> {
        match self {
            CellValue::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<EvalError> for CellValue {
    fn from(e: EvalError) -> Self {
        CellValue::Error(e)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Error(e) => f.write_str(e.marker()),
        }
    }
}

/// Read the leading decimal number of `text`, ignoring leading whitespace.
///
/// Trailing text is ignored (`"5kg"` is 5). Text with no numeric prefix, or
/// whose prefix is not finite, has no numeric reading.
pub fn parse_number(text: &str) -> Option<f64> {
    let prefix = number_prefix_re().find(text.trim_start())?;
    prefix.as_str().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn number_prefix_re() -> &'static Regex {
    static NUMBER_PREFIX_RE: OnceLock<Regex> = OnceLock::new();
    NUMBER_PREFIX_RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
            .expect("number prefix regex must compile")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(" -1.5 "), Some(-1.5));
        assert_eq!(parse_number("+.5"), Some(0.5));
        assert_eq!(parse_number("7."), Some(7.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("x"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_parse_number_reads_leading_prefix() {
        assert_eq!(parse_number("5kg"), Some(5.0));
        assert_eq!(parse_number("  12abc"), Some(12.0));
        assert_eq!(parse_number("1.5e2x"), Some(150.0));
        assert_eq!(parse_number("3e"), Some(3.0));
        assert_eq!(parse_number("2.5.1"), Some(2.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("kg5"), None);
        assert_eq!(parse_number("1e400"), None);
    }

    #[test]
    fn test_literal_values() {
        assert_eq!(CellValue::from_literal(""), CellValue::Empty);
        assert_eq!(CellValue::from_literal("5"), CellValue::Text("5".into()));
        assert_eq!(CellValue::from_literal("5").as_number(), Some(5.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Number(6.0).to_string(), "6");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        assert_eq!(CellValue::Text("hi".into()).to_string(), "hi");
        assert_eq!(
            CellValue::Error(EvalError::CircularReference).to_string(),
            "#CIRCULAR!"
        );
    }

    #[test]
    fn test_errors_are_not_numeric() {
        let v = CellValue::Error(EvalError::EvaluationFailure("x".into()));
        assert!(v.as_number().is_none());
        assert!(!v.is_textual());
    }
}
