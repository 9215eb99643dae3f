//! Error taxonomy for reference decoding and formula evaluation.
//!
//! Evaluation is total: callers of [`evaluate`](super::evaluate) never see
//! these as `Err`. They end up stored inside [`CellValue::Error`](super::CellValue)
//! and are rendered as a marker string.

use thiserror::Error;

use super::cell_ref::CellRef;
use super::deps::MAX_RANGE_CELLS;

/// Errors produced while decoding references or evaluating a formula.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("Malformed cell reference: {0}")]
    MalformedReference(String),

    #[error("Malformed range: {0}")]
    MalformedRange(String),

    #[error("Non-numeric value in {0}")]
    NonNumericOperand(CellRef),

    #[error("Evaluation failed: {0}")]
    EvaluationFailure(String),

    #[error("Range spans {0} cells (max {max})", max = MAX_RANGE_CELLS)]
    RangeTooLarge(usize),

    #[error("Circular reference")]
    CircularReference,

    #[error("No numeric data in range")]
    NoNumericData,
}

impl EvalError {
    /// Marker shown in place of a value.
    pub fn marker(&self) -> &'static str {
        match self {
            EvalError::CircularReference => "#CIRCULAR!",
            EvalError::NoNumericData => "#N/A",
            _ => "#ERROR!",
        }
    }
}

pub type EvalResult<T> = std::result::Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers() {
        assert_eq!(EvalError::EvaluationFailure("x".into()).marker(), "#ERROR!");
        assert_eq!(EvalError::MalformedRange("x".into()).marker(), "#ERROR!");
        assert_eq!(EvalError::NonNumericOperand(CellRef::new(0, 0)).marker(), "#ERROR!");
        assert_eq!(EvalError::CircularReference.marker(), "#CIRCULAR!");
        assert_eq!(EvalError::NoNumericData.marker(), "#N/A");
    }

    #[test]
    fn test_non_numeric_message_names_cell() {
        let err = EvalError::NonNumericOperand(CellRef::new(1, 2));
        assert_eq!(err.to_string(), "Non-numeric value in B3");
    }
}
