//! Formula evaluation.
//!
//! A formula is either a whole-formula built-in call (`=SUM(A1:A3)`) or a
//! general arithmetic expression over numbers and cell references. Cell
//! values come from a [`CellReader`], so the evaluator never owns or mutates
//! cells.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::cell_ref::CellRef;
use super::error::{EvalError, EvalResult};
use super::parser::{BinaryOp, Expr, parse_expression};
use super::value::CellValue;
use crate::builtins;

/// Read-only view of current cell values.
///
/// Formula cells report their cached display value, literal cells their raw
/// text, and absent cells [`CellValue::Empty`].
pub trait CellReader {
    fn get(&self, cell: &CellRef) -> CellValue;
}

impl CellReader for HashMap<CellRef, CellValue> {
    fn get(&self, cell: &CellRef) -> CellValue {
        HashMap::get(self, cell).cloned().unwrap_or_default()
    }
}

/// What MAX and MIN yield when a range holds no numeric cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyExtremum {
    /// Report 0.
    #[default]
    Zero,
    /// Report [`EvalError::NoNumericData`].
    NoData,
}

/// Knobs that change evaluation results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalOptions {
    pub empty_extremum: EmptyExtremum,
}

/// Evaluate raw cell text. Never fails: errors become [`CellValue::Error`].
pub fn evaluate<R: CellReader + ?Sized>(
    formula: &str,
    reader: &R,
    options: &EvalOptions,
) -> CellValue {
    try_evaluate(formula, reader, options).unwrap_or_else(CellValue::Error)
}

/// Evaluate raw cell text, keeping the error kind.
///
/// Text without a leading `=` is a literal and comes back unchanged.
pub fn try_evaluate<R: CellReader + ?Sized>(
    formula: &str,
    reader: &R,
    options: &EvalOptions,
) -> EvalResult<CellValue> {
    let Some(body) = formula.strip_prefix('=') else {
        return Ok(CellValue::from_literal(formula));
    };
    let body = body.trim().to_uppercase();

    if let Some(caps) = builtins::builtin_call_re().captures(&body)
        && let Some(builtin) = builtins::lookup(&caps[1])
    {
        return builtins::call(builtin, &caps[2], reader, options);
    }

    let expr = parse_expression(&body)?;
    eval_expr(&expr, reader).map(CellValue::Number)
}

fn eval_expr<R: CellReader + ?Sized>(expr: &Expr, reader: &R) -> EvalResult<f64> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Ref(cell) => match reader.get(cell) {
            CellValue::Error(e) => Err(e),
            value => value
                .as_number()
                .ok_or(EvalError::NonNumericOperand(*cell)),
        },
        Expr::Negate(inner) => Ok(-eval_expr(inner, reader)?),
        Expr::Binary { op, left, right } => {
            let l = eval_expr(left, reader)?;
            let r = eval_expr(right, reader)?;
            let result = match op {
                BinaryOp::Add => l + r,
                BinaryOp::Subtract => l - r,
                BinaryOp::Multiply => l * r,
                BinaryOp::Divide => l / r,
            };
            if result.is_finite() {
                Ok(result)
            } else if *op == BinaryOp::Divide && r == 0.0 {
                Err(EvalError::EvaluationFailure("division by zero".to_string()))
            } else {
                Err(EvalError::EvaluationFailure(format!(
                    "non-finite result {}",
                    result
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cells(values: &[(&str, &str)]) -> HashMap<CellRef, CellValue> {
        values
            .iter()
            .map(|(id, v)| (CellRef::parse(id).unwrap(), CellValue::from_literal(v)))
            .collect()
    }

    fn eval(formula: &str, reader: &HashMap<CellRef, CellValue>) -> CellValue {
        evaluate(formula, reader, &EvalOptions::default())
    }

    #[test]
    fn test_literal_passthrough() {
        let empty = cells(&[]);
        assert_eq!(eval("hello", &empty), CellValue::Text("hello".into()));
        assert_eq!(eval("", &empty), CellValue::Empty);
        assert_eq!(eval(" =1", &empty), CellValue::Text(" =1".into()));
    }

    #[test]
    fn test_arithmetic() {
        let empty = cells(&[]);
        assert_eq!(eval("=1 + 2 * 3", &empty), CellValue::Number(7.0));
        assert_eq!(eval("=(1 + 2) * 3", &empty), CellValue::Number(9.0));
        assert_eq!(eval("=-2 * -3", &empty), CellValue::Number(6.0));
        assert_eq!(eval("=7 / 2", &empty), CellValue::Number(3.5));
    }

    #[test]
    fn test_references_are_case_insensitive() {
        let sheet = cells(&[("A1", "5"), ("B2", " 2.5 ")]);
        assert_eq!(eval("=a1 + b2", &sheet), CellValue::Number(7.5));
        assert_eq!(eval("=A1", &sheet), CellValue::Number(5.0));
    }

    #[test]
    fn test_non_numeric_operand() {
        let sheet = cells(&[("A1", "hello")]);
        assert_eq!(
            try_evaluate("=A1 + 1", &sheet, &EvalOptions::default()),
            Err(EvalError::NonNumericOperand(CellRef::new(0, 0)))
        );
        assert_eq!(
            try_evaluate("=B1 + 1", &sheet, &EvalOptions::default()),
            Err(EvalError::NonNumericOperand(CellRef::new(1, 0)))
        );
        assert_eq!(eval("=A1 + 1", &sheet).to_string(), "#ERROR!");
    }

    #[test]
    fn test_operand_uses_numeric_prefix() {
        let sheet = cells(&[("A1", "5kg"), ("A2", "1.5e2x"), ("A3", "abc")]);
        assert_eq!(eval("=A1 + 1", &sheet), CellValue::Number(6.0));
        assert_eq!(eval("=A2 / A1", &sheet), CellValue::Number(30.0));
        assert_eq!(
            try_evaluate("=A3 + 1", &sheet, &EvalOptions::default()),
            Err(EvalError::NonNumericOperand(CellRef::new(0, 2)))
        );
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        let sheet = cells(&[("A1", "1e308"), ("A2", "1e308")]);
        let sum = eval("=SUM(A1:A2)", &sheet);
        assert!(sum.is_error());
        assert_eq!(sum.to_string(), "#ERROR!");
    }

    #[test]
    fn test_upstream_error_propagates() {
        let mut sheet = cells(&[]);
        sheet.insert(
            CellRef::new(0, 0),
            CellValue::Error(EvalError::CircularReference),
        );
        assert_eq!(
            eval("=A1 * 2", &sheet),
            CellValue::Error(EvalError::CircularReference)
        );
    }

    #[test]
    fn test_division_by_zero() {
        let empty = cells(&[]);
        assert_eq!(
            eval("=1/0", &empty),
            CellValue::Error(EvalError::EvaluationFailure("division by zero".into()))
        );
        assert_eq!(eval("=0/0", &empty).to_string(), "#ERROR!");
    }

    #[test]
    fn test_builtins_dispatch() {
        let sheet = cells(&[("A1", "1"), ("A2", "2"), ("A3", "3"), ("B1", "hello")]);
        assert_eq!(eval("=SUM(A1:A3)", &sheet), CellValue::Number(6.0));
        assert_eq!(eval("= sum(a1:a3) ", &sheet), CellValue::Number(6.0));
        assert_eq!(eval("=AVERAGE(A1:A3)", &sheet), CellValue::Number(2.0));
        assert_eq!(eval("=MAX(A1:A3)", &sheet), CellValue::Number(3.0));
        assert_eq!(eval("=MIN(A1:A3)", &sheet), CellValue::Number(1.0));
        assert_eq!(eval("=COUNT(A1:B3)", &sheet), CellValue::Number(3.0));
        assert_eq!(eval("=UPPER(B1)", &sheet), CellValue::Text("HELLO".into()));
    }

    #[test]
    fn test_non_builtin_call_is_an_error() {
        let sheet = cells(&[("A1", "1")]);
        assert!(eval("=FOO(A1)", &sheet).is_error());
        assert!(eval("=SUM(A1)*2", &sheet).is_error());
        assert!(eval("=", &sheet).is_error());
    }

    proptest! {
        #[test]
        fn prop_average_times_count_is_sum(
            inputs in proptest::collection::vec(
                prop_oneof![
                    (-1.0e6f64..1.0e6).prop_map(|n| n.to_string()),
                    "[a-z]{0,4}",
                ],
                1..20,
            )
        ) {
            let sheet: HashMap<CellRef, CellValue> = inputs
                .iter()
                .enumerate()
                .map(|(row, raw)| (CellRef::new(0, row), CellValue::from_literal(raw)))
                .collect();
            let last = inputs.len();
            let sum = eval(&format!("=SUM(A1:A{last})"), &sheet).as_number().unwrap();
            let count = eval(&format!("=COUNT(A1:A{last})"), &sheet).as_number().unwrap();
            let average = eval(&format!("=AVERAGE(A1:A{last})"), &sheet).as_number().unwrap();

            if count == 0.0 {
                prop_assert_eq!(average, 0.0);
            } else {
                prop_assert!((average * count - sum).abs() <= 1e-6 * sum.abs().max(1.0));
            }
        }
    }
}
