//! Cell records and their index-based storage.
//!
//! Records live in a `Vec` in creation order; a `HashMap` maps each
//! [`CellRef`] to its slot. Slots are never removed, so indices stay stable.

use std::collections::{BTreeSet, HashMap};

use cellflow_engine::engine::{CellReader, CellRef, CellValue};

use super::format::Formatting;

/// A cell in the sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub(crate) position: CellRef,
    pub(crate) raw: String,
    pub(crate) value: CellValue,
    pub(crate) depends_on: Vec<CellRef>,
    pub(crate) dependents: BTreeSet<CellRef>,
    pub(crate) formatting: Formatting,
}

impl Cell {
    pub fn new_empty(position: CellRef) -> Cell {
        Cell {
            position,
            raw: String::new(),
            value: CellValue::Empty,
            depends_on: vec![],
            dependents: BTreeSet::new(),
            formatting: Formatting::default(),
        }
    }

    pub fn position(&self) -> CellRef {
        self.position
    }

    /// The text last set on this cell.
    pub fn raw_input(&self) -> &str {
        &self.raw
    }

    pub fn is_formula(&self) -> bool {
        self.raw.starts_with('=')
    }

    /// Cached evaluation result (the raw text for non-formula cells).
    pub fn display_value(&self) -> &CellValue {
        &self.value
    }

    /// Cells this cell's formula references, in first-seen order.
    pub fn dependencies(&self) -> &[CellRef] {
        &self.depends_on
    }

    /// Cells whose formulas reference this cell, row-major.
    pub fn dependents(&self) -> impl Iterator<Item = CellRef> + '_ {
        self.dependents.iter().copied()
    }

    pub fn formatting(&self) -> &Formatting {
        &self.formatting
    }
}

#[derive(Debug, Default)]
pub struct CellStore {
    cells: Vec<Cell>,
    index: HashMap<CellRef, usize>,
}

impl CellStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cell: &CellRef) -> Option<&Cell> {
        self.index.get(cell).map(|&slot| &self.cells[slot])
    }

    pub(crate) fn get_mut(&mut self, cell: &CellRef) -> Option<&mut Cell> {
        self.index.get(cell).map(|&slot| &mut self.cells[slot])
    }

    /// Insert or replace the record at `cell.position`.
    pub(crate) fn set(&mut self, cell: Cell) {
        match self.index.get(&cell.position) {
            Some(&slot) => self.cells[slot] = cell,
            None => {
                self.index.insert(cell.position, self.cells.len());
                self.cells.push(cell);
            }
        }
    }

    /// Get the record for `cell`, creating a blank one if absent.
    pub(crate) fn ensure(&mut self, cell: CellRef) -> &mut Cell {
        let slot = match self.index.get(&cell) {
            Some(&slot) => slot,
            None => {
                let slot = self.cells.len();
                self.cells.push(Cell::new_empty(cell));
                self.index.insert(cell, slot);
                slot
            }
        };
        &mut self.cells[slot]
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        self.index.contains_key(cell)
    }

    /// Records in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl CellReader for CellStore {
    fn get(&self, cell: &CellRef) -> CellValue {
        CellStore::get(self, cell)
            .map(|record| record.value.clone())
            .unwrap_or_default()
    }
}
