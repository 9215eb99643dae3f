//! Error types for cellflow core.

use thiserror::Error;

use cellflow_engine::engine::EvalError;

/// Errors from the string-addressed sheet API.
///
/// Formula problems never show up here: they become the cell's value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid cell id '{id}': {source}")]
    InvalidCellId {
        id: String,
        #[source]
        source: EvalError,
    },

    #[error("Unknown format option: {0}")]
    UnknownFormatOption(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
