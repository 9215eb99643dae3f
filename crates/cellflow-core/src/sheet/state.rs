use crate::error::{CoreError, Result};
use cellflow_engine::engine::{CellRef, CellValue, EvalOptions, evaluate};

use super::store::{Cell, CellStore};

/// UI-agnostic sheet: the cell store plus the dependency edges kept inside it.
#[derive(Debug, Default)]
pub struct Sheet {
    pub(crate) store: CellStore,
    pub(crate) options: EvalOptions,
    rows: usize,
    cols: usize,
}

impl Sheet {
    /// Create an empty sheet. Cells appear as they are addressed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EvalOptions) -> Self {
        Sheet {
            options,
            ..Self::default()
        }
    }

    /// Create a sheet with `rows × cols` blank cells, in row-major order.
    pub fn init_grid(rows: usize, cols: usize) -> Self {
        Self::init_grid_with_options(rows, cols, EvalOptions::default())
    }

    pub fn init_grid_with_options(rows: usize, cols: usize, options: EvalOptions) -> Self {
        let mut store = CellStore::new();
        for row in 0..rows {
            for col in 0..cols {
                store.set(Cell::new_empty(CellRef::new(col, row)));
            }
        }
        Sheet {
            store,
            options,
            rows,
            cols,
        }
    }

    /// Grid size given at initialization, as `(rows, cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    pub fn store(&self) -> &CellStore {
        &self.store
    }

    pub fn cell(&self, cell: &CellRef) -> Option<&Cell> {
        self.store.get(cell)
    }

    /// Get the cell, creating a blank record when it does not exist yet.
    pub fn ensure(&mut self, cell: CellRef) -> &Cell {
        self.store.ensure(cell)
    }

    /// All cells in creation order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.store.iter()
    }

    /// Current value of a cell (`Empty` when it does not exist).
    pub fn value(&self, cell: &CellRef) -> CellValue {
        self.store
            .get(cell)
            .map(|record| record.value.clone())
            .unwrap_or_default()
    }

    pub fn display_value(&self, id: &str) -> Result<CellValue> {
        Ok(self.value(&parse_id(id)?))
    }

    pub fn raw_input(&self, id: &str) -> Result<String> {
        let cell = parse_id(id)?;
        Ok(self
            .store
            .get(&cell)
            .map(|record| record.raw.clone())
            .unwrap_or_default())
    }

    pub fn dependencies(&self, cell: &CellRef) -> Vec<CellRef> {
        self.store
            .get(cell)
            .map(|record| record.depends_on.clone())
            .unwrap_or_default()
    }

    pub fn dependents(&self, cell: &CellRef) -> Vec<CellRef> {
        self.store
            .get(cell)
            .map(|record| record.dependents().collect())
            .unwrap_or_default()
    }

    /// Evaluate text against the current values without storing it anywhere.
    pub fn evaluate(&self, formula: &str) -> CellValue {
        evaluate(formula, &self.store, &self.options)
    }
}

pub(crate) fn parse_id(id: &str) -> Result<CellRef> {
    CellRef::parse(id).map_err(|source| CoreError::InvalidCellId {
        id: id.to_string(),
        source,
    })
}
