//! cellflow_engine - Spreadsheet formula engine.

pub(crate) mod builtins;
pub mod engine;

#[cfg(test)]
mod tests {
    use crate::engine::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_single_letter_columns() {
        let a1 = CellRef::parse("A1").unwrap();
        assert_eq!(a1.row, 0);
        assert_eq!(a1.col, 0);

        let b1 = CellRef::parse("B1").unwrap();
        assert_eq!(b1.row, 0);
        assert_eq!(b1.col, 1);

        let z1 = CellRef::parse("Z1").unwrap();
        assert_eq!(z1.row, 0);
        assert_eq!(z1.col, 25);
    }

    #[test]
    fn test_parse_multi_letter_columns() {
        let aa1 = CellRef::parse("AA1").unwrap();
        assert_eq!(aa1.col, 26);

        let ab1 = CellRef::parse("AB1").unwrap();
        assert_eq!(ab1.col, 27);

        let az1 = CellRef::parse("AZ1").unwrap();
        assert_eq!(az1.col, 51);

        let ba1 = CellRef::parse("BA1").unwrap();
        assert_eq!(ba1.col, 52);
    }

    #[test]
    fn test_parse_row_numbers() {
        let a1 = CellRef::parse("A1").unwrap();
        assert_eq!(a1.row, 0);

        let a10 = CellRef::parse("A10").unwrap();
        assert_eq!(a10.row, 9);

        let a100 = CellRef::parse("A100").unwrap();
        assert_eq!(a100.row, 99);
    }

    #[test]
    fn test_parse_invalid_inputs() {
        for bad in ["", "123", "ABC", "A0", "1A", "A 1", "A1 ", "$A$1"] {
            assert!(
                matches!(CellRef::parse(bad), Err(EvalError::MalformedReference(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        for id in ["A1", "Z9", "AA12", "AZ100", "ZZ1", "AAA7"] {
            assert_eq!(CellRef::parse(id).unwrap().to_string(), id);
        }
    }

    #[test]
    fn test_dependencies_match_evaluated_references() {
        let formula = "=A1 * (B2 - A1) / C3";
        let deps = extract_dependencies(formula);
        assert_eq!(
            deps,
            vec![CellRef::new(0, 0), CellRef::new(1, 1), CellRef::new(2, 2)]
        );

        let values: HashMap<CellRef, CellValue> = deps
            .iter()
            .map(|cell| (*cell, CellValue::Number(2.0)))
            .collect();
        assert_eq!(
            evaluate(formula, &values, &EvalOptions::default()),
            CellValue::Number(0.0)
        );
    }

    #[test]
    fn test_builtin_table_is_complete() {
        let names: Vec<&str> = BUILTINS.iter().map(|b| b.name).collect();
        assert_eq!(
            names,
            vec!["SUM", "AVERAGE", "MAX", "MIN", "COUNT", "TRIM", "UPPER", "LOWER"]
        );
    }
}
