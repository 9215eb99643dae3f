//! Recalculation after an edit.
//!
//! The edited cell and everything reachable through `dependents` is collected
//! with a worklist, then recomputed in topological order (Kahn). Cells that
//! never become ready sit on or behind a cycle: cycle members get
//! [`EvalError::CircularReference`], and the cells behind them are recomputed
//! afterwards so they see that error through their inputs.

use std::collections::{HashMap, HashSet, VecDeque};

use super::state::Sheet;
use cellflow_engine::engine::{CellRef, CellValue, EvalError, cycle_members, evaluate};
use tracing::{debug, trace, warn};

/// What one edit did to the sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Cells whose display value changed, plus the edited cell when its raw
    /// input changed. In recomputation order.
    pub changed: Vec<CellRef>,
    /// Every cell recomputed, in the order it was recomputed.
    pub recalculated: Vec<CellRef>,
    /// Cells found on a dependency cycle.
    pub circular: Vec<CellRef>,
}

impl ChangeSet {
    pub fn contains(&self, cell: &CellRef) -> bool {
        self.changed.contains(cell)
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

impl Sheet {
    pub(crate) fn recalculate_from(&mut self, origin: CellRef) -> ChangeSet {
        let affected = self.affected_cells(origin);

        let mut in_degree: HashMap<CellRef, usize> =
            affected.iter().map(|cell| (*cell, 0)).collect();
        for cell in &affected {
            for dependent in self.dependents(cell) {
                if let Some(count) = in_degree.get_mut(&dependent) {
                    *count += 1;
                }
            }
        }

        let mut ready: VecDeque<CellRef> = affected
            .iter()
            .filter(|cell| in_degree[*cell] == 0)
            .copied()
            .collect();
        let mut changes = ChangeSet::default();
        self.drain_ready(&mut ready, &mut in_degree, &mut changes);

        if !in_degree.is_empty() {
            let blocked: Vec<CellRef> = affected
                .iter()
                .filter(|cell| in_degree.contains_key(*cell))
                .copied()
                .collect();
            let cyclic = cycle_members(&blocked, |cell| self.dependents(cell));
            warn!(
                origin = %origin,
                cycle_cells = cyclic.len(),
                "circular reference detected"
            );

            for &cell in &cyclic {
                in_degree.remove(&cell);
                self.assign(cell, CellValue::Error(EvalError::CircularReference), &mut changes);
                changes.circular.push(cell);
            }
            for &cell in &cyclic {
                self.release_dependents(cell, &mut ready, &mut in_degree);
            }
            self.drain_ready(&mut ready, &mut in_degree, &mut changes);
        }

        debug!(
            origin = %origin,
            recalculated = changes.recalculated.len(),
            changed = changes.changed.len(),
            "recalculation finished"
        );
        changes
    }

    /// The origin plus every cell reachable through `dependents`, in
    /// breadth-first discovery order.
    fn affected_cells(&self, origin: CellRef) -> Vec<CellRef> {
        let mut seen = HashSet::from([origin]);
        let mut order = vec![origin];
        let mut queue = VecDeque::from([origin]);

        while let Some(cell) = queue.pop_front() {
            for dependent in self.dependents(&cell) {
                if seen.insert(dependent) {
                    order.push(dependent);
                    queue.push_back(dependent);
                }
            }
        }

        order
    }

    fn drain_ready(
        &mut self,
        ready: &mut VecDeque<CellRef>,
        in_degree: &mut HashMap<CellRef, usize>,
        changes: &mut ChangeSet,
    ) {
        while let Some(cell) = ready.pop_front() {
            in_degree.remove(&cell);
            let value = match self.store.get(&cell) {
                Some(record) => evaluate(&record.raw, &self.store, &self.options),
                None => continue,
            };
            self.assign(cell, value, changes);
            self.release_dependents(cell, ready, in_degree);
        }
    }

    /// Count `cell` as done for each pending dependent, queueing any that
    /// have no pending sources left.
    fn release_dependents(
        &self,
        cell: CellRef,
        ready: &mut VecDeque<CellRef>,
        in_degree: &mut HashMap<CellRef, usize>,
    ) {
        for dependent in self.dependents(&cell) {
            if let Some(count) = in_degree.get_mut(&dependent) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    ready.push_back(dependent);
                }
            }
        }
    }

    fn assign(&mut self, cell: CellRef, value: CellValue, changes: &mut ChangeSet) {
        let Some(record) = self.store.get_mut(&cell) else {
            return;
        };
        trace!(cell = %cell, value = %value, "recomputed");
        if record.value != value {
            record.value = value;
            changes.changed.push(cell);
        }
        changes.recalculated.push(cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn c(id: &str) -> CellRef {
        CellRef::parse(id).unwrap()
    }

    fn ids(cells: &[CellRef]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn test_chain_recomputes_in_order() {
        let mut sheet = Sheet::new();
        sheet.set_cell(c("A1"), "5");
        sheet.set_cell(c("B1"), "=A1+1");
        sheet.set_cell(c("C1"), "=B1*2");

        let changes = sheet.set_cell(c("A1"), "10");
        assert_eq!(ids(&changes.recalculated), vec!["A1", "B1", "C1"]);
        assert_eq!(ids(&changes.changed), vec!["A1", "B1", "C1"]);
        assert_eq!(sheet.value(&c("C1")), CellValue::Number(22.0));
    }

    #[test]
    fn test_diamond_recomputes_each_cell_once() {
        let mut sheet = Sheet::new();
        sheet.set_cell(c("A1"), "1");
        sheet.set_cell(c("B1"), "=A1*2");
        sheet.set_cell(c("C1"), "=A1*3");
        sheet.set_cell(c("D1"), "=B1+C1");
        sheet.set_cell(c("E1"), "=D1+A1");

        let changes = sheet.set_cell(c("A1"), "2");
        assert_eq!(ids(&changes.recalculated), vec!["A1", "B1", "C1", "D1", "E1"]);
        assert_eq!(sheet.value(&c("D1")), CellValue::Number(10.0));
        assert_eq!(sheet.value(&c("E1")), CellValue::Number(12.0));
    }

    #[test]
    fn test_unchanged_values_are_not_reported() {
        let mut sheet = Sheet::new();
        sheet.set_cell(c("A1"), "4");
        sheet.set_cell(c("B1"), "=A1*0");
        sheet.set_cell(c("C1"), "=B1+1");

        let changes = sheet.set_cell(c("A1"), "7");
        assert_eq!(ids(&changes.changed), vec!["A1"]);
        assert_eq!(ids(&changes.recalculated), vec!["A1", "B1", "C1"]);
    }

    #[test]
    fn test_self_reference_is_circular() {
        let mut sheet = Sheet::new();
        let changes = sheet.set_cell(c("A1"), "=A1+1");
        assert_eq!(ids(&changes.circular), vec!["A1"]);
        assert_eq!(
            sheet.value(&c("A1")),
            CellValue::Error(EvalError::CircularReference)
        );
    }

    #[test]
    fn test_cells_behind_cycle_see_error() {
        let mut sheet = Sheet::new();
        sheet.set_cell(c("C1"), "=B1*2");
        sheet.set_cell(c("D1"), "=SUM(B1:C1)");
        sheet.set_cell(c("A1"), "=B1");
        let changes = sheet.set_cell(c("B1"), "=A1");

        assert_eq!(ids(&changes.circular), vec!["A1", "B1"]);
        assert_eq!(
            sheet.value(&c("C1")),
            CellValue::Error(EvalError::CircularReference)
        );
        // SUM skips error cells like any other non-numeric value.
        assert_eq!(sheet.value(&c("D1")), CellValue::Number(0.0));
        assert_eq!(ids(&changes.recalculated), vec!["A1", "B1", "C1", "D1"]);
    }
}
