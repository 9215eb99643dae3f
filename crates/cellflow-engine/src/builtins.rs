//! Built-in spreadsheet functions and their metadata.
//!
//! Conventions:
//! - Built-in names are ALL CAPS (formula bodies are upper-cased first).
//! - A built-in is only recognized when it is the whole formula: `=SUM(A1:A3)`.
//!   Anything else (`=SUM(A1:A3)*2`) is handed to the arithmetic parser.
//! - If you add a new built-in, add a `BuiltinKind` variant, a row in
//!   `BUILTINS` and its arm in `call`.

use regex::Regex;
use std::sync::OnceLock;

use crate::engine::{
    CellReader, CellRef, CellValue, EmptyExtremum, EvalError, EvalOptions, EvalResult,
    expand_range,
};

/// What a built-in takes between its parentheses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// A range expression: single cell, `A1:B3` or `A1,B2`.
    Range,
    /// Exactly one cell reference.
    Cell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinKind {
    Sum,
    Average,
    Max,
    Min,
    Count,
    Trim,
    Upper,
    Lower,
}

pub struct Builtin {
    pub name: &'static str,
    pub kind: BuiltinKind,
    pub arg: ArgKind,
    pub description: &'static str,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "SUM",
        kind: BuiltinKind::Sum,
        arg: ArgKind::Range,
        description: "Sum of numeric values in a range",
    },
    Builtin {
        name: "AVERAGE",
        kind: BuiltinKind::Average,
        arg: ArgKind::Range,
        description: "Mean of numeric values in a range (0 when none)",
    },
    Builtin {
        name: "MAX",
        kind: BuiltinKind::Max,
        arg: ArgKind::Range,
        description: "Largest numeric value in a range",
    },
    Builtin {
        name: "MIN",
        kind: BuiltinKind::Min,
        arg: ArgKind::Range,
        description: "Smallest numeric value in a range",
    },
    Builtin {
        name: "COUNT",
        kind: BuiltinKind::Count,
        arg: ArgKind::Range,
        description: "Number of numeric cells in a range",
    },
    Builtin {
        name: "TRIM",
        kind: BuiltinKind::Trim,
        arg: ArgKind::Cell,
        description: "Cell text without leading/trailing whitespace",
    },
    Builtin {
        name: "UPPER",
        kind: BuiltinKind::Upper,
        arg: ArgKind::Cell,
        description: "Cell text in upper case",
    },
    Builtin {
        name: "LOWER",
        kind: BuiltinKind::Lower,
        arg: ArgKind::Cell,
        description: "Cell text in lower case",
    },
];

/// Regex that matches a whole-formula built-in call like `SUM(A1:B5)`.
///
/// Captures:
/// - group 1: function name (e.g. `SUM`)
/// - group 2: the argument text, which may not contain parentheses
pub fn builtin_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Z]+)\(([^()]*)\)$").expect("built-in call regex must compile")
    })
}

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

/// Apply a built-in to its (upper-cased) argument text.
pub fn call<R: CellReader + ?Sized>(
    builtin: &Builtin,
    args: &str,
    reader: &R,
    options: &EvalOptions,
) -> EvalResult<CellValue> {
    match builtin.kind {
        BuiltinKind::Sum => {
            let values = numeric_values(args, reader)?;
            finite(values.iter().sum())
        }
        BuiltinKind::Average => {
            let values = numeric_values(args, reader)?;
            if values.is_empty() {
                return Ok(CellValue::Number(0.0));
            }
            let sum: f64 = values.iter().sum();
            finite(sum / values.len() as f64)
        }
        BuiltinKind::Count => {
            let values = numeric_values(args, reader)?;
            Ok(CellValue::Number(values.len() as f64))
        }
        BuiltinKind::Max => extremum(numeric_values(args, reader)?, f64::max, options),
        BuiltinKind::Min => extremum(numeric_values(args, reader)?, f64::min, options),
        BuiltinKind::Trim => transform_text(args, reader, |s| s.trim().to_string()),
        BuiltinKind::Upper => transform_text(args, reader, str::to_uppercase),
        BuiltinKind::Lower => transform_text(args, reader, str::to_lowercase),
    }
}

/// Numeric readings of every cell in the range; other cells are skipped.
fn numeric_values<R: CellReader + ?Sized>(args: &str, reader: &R) -> EvalResult<Vec<f64>> {
    Ok(expand_range(args)?
        .iter()
        .filter_map(|cell| reader.get(cell).as_number())
        .collect())
}

/// Aggregates over finite inputs can still overflow.
fn finite(n: f64) -> EvalResult<CellValue> {
    if n.is_finite() {
        Ok(CellValue::Number(n))
    } else {
        Err(EvalError::EvaluationFailure(format!("non-finite result {}", n)))
    }
}

fn extremum(
    values: Vec<f64>,
    pick: fn(f64, f64) -> f64,
    options: &EvalOptions,
) -> EvalResult<CellValue> {
    match values.into_iter().reduce(pick) {
        Some(n) => Ok(CellValue::Number(n)),
        None => match options.empty_extremum {
            EmptyExtremum::Zero => Ok(CellValue::Number(0.0)),
            EmptyExtremum::NoData => Err(EvalError::NoNumericData),
        },
    }
}

fn transform_text<R, F>(args: &str, reader: &R, transform: F) -> EvalResult<CellValue>
where
    R: CellReader + ?Sized,
    F: Fn(&str) -> String,
{
    let cell = CellRef::parse(args.trim())?;
    Ok(match reader.get(&cell) {
        CellValue::Text(s) => CellValue::Text(transform(&s)),
        other => other,
    })
}
