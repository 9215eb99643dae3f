//! cellflow-core - cell store, dependency edges and propagation.

pub mod error;
pub mod sheet;

pub use error::{CoreError, Result};
pub use sheet::{Cell, ChangeSet, FormatOption, Formatting, Sheet};

pub use cellflow_engine::engine::{CellRef, CellValue, EmptyExtremum, EvalError, EvalOptions};
