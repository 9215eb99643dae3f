//! Errors from loading an edit script

use cellflow_core::EvalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A non-comment line without the `:` separator.
    #[error("line {line}: expected 'CELLREF: INPUT', got '{text}'")]
    MissingSeparator { line: usize, text: String },

    /// The text before `:` is not a canonical cell id such as `B12`.
    #[error("line {line}: invalid cell reference '{text}'")]
    InvalidCell {
        line: usize,
        text: String,
        #[source]
        source: EvalError,
    },
}

pub type Result<T> = std::result::Result<T, CliError>;
