//! Sheet state and recalculation (UI-agnostic).

mod format;
mod ops;
mod recalc;
mod state;
mod store;

pub use format::{FormatOption, Formatting};
pub use recalc::ChangeSet;
pub use state::Sheet;
pub use store::{Cell, CellStore};
