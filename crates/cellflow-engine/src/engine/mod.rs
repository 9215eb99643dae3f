//! Spreadsheet engine API.
//!
//! This module provides the pure computation side of the spreadsheet:
//!
//! - [`CellRef`] - Cell reference parsing (A1 notation ↔ row/col indices)
//! - [`expand_range`] - Range expressions to ordered cell lists
//! - [`extract_dependencies`] - Parse formula dependencies
//! - [`evaluate`] - Evaluate raw cell text against a [`CellReader`]
//! - [`cycle_members`] - Circular dependency detection
//! - [`CellValue`], [`format_number`] - Values and their display form

mod cell_ref;
mod cycle;
mod deps;
mod error;
mod eval;
mod format;
mod parser;
mod value;

pub use cell_ref::{CellRef, id_to_position, position_to_id};
pub use cycle::cycle_members;
pub use deps::{MAX_RANGE_CELLS, expand_range, extract_dependencies, parse_range, rectangle};
pub use error::{EvalError, EvalResult};
pub use eval::{CellReader, EmptyExtremum, EvalOptions, evaluate, try_evaluate};
pub use format::format_number;
pub use parser::{BinaryOp, Expr, parse_expression};
pub use value::{CellValue, parse_number};

pub use crate::builtins::{ArgKind, BUILTINS, Builtin, BuiltinKind};
