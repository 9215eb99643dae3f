use std::collections::HashSet;

use super::format::FormatOption;
use super::recalc::ChangeSet;
use super::state::{Sheet, parse_id};
use crate::error::Result;
use cellflow_engine::engine::{CellRef, extract_dependencies};
use tracing::debug;

impl Sheet {
    /// Set a cell's raw input by identifier and recompute everything it feeds.
    pub fn set_cell_input(&mut self, id: &str, raw: &str) -> Result<ChangeSet> {
        let cell = parse_id(id)?;
        Ok(self.set_cell(cell, raw))
    }

    /// Set a cell's raw input and recompute everything it feeds.
    ///
    /// Rewrites the cell's dependency edges, then re-evaluates the cell and
    /// its transitive dependents once each, in dependency order.
    pub fn set_cell(&mut self, cell: CellRef, raw: &str) -> ChangeSet {
        let new_deps = if raw.starts_with('=') {
            extract_dependencies(raw)
        } else {
            Vec::new()
        };

        let record = self.store.ensure(cell);
        let raw_changed = record.raw != raw;
        let old_deps = std::mem::take(&mut record.depends_on);

        self.relink(cell, &old_deps, &new_deps);

        let record = self.store.ensure(cell);
        record.raw = raw.to_string();
        record.depends_on = new_deps;

        debug!(
            cell = %cell,
            dependencies = record.depends_on.len(),
            "cell input set"
        );

        let mut changes = self.recalculate_from(cell);
        if raw_changed && !changes.changed.contains(&cell) {
            changes.changed.insert(0, cell);
        }
        changes
    }

    /// Toggle a boolean formatting flag. Values are not recomputed.
    pub fn toggle_format_option(&mut self, id: &str, option: &str) -> Result<()> {
        let cell = parse_id(id)?;
        let option: FormatOption = option.parse()?;
        self.store.ensure(cell).formatting.toggle(option);
        Ok(())
    }

    /// Move `cell` out of the dependents of dropped sources and into those
    /// of new ones, creating new sources as needed.
    fn relink(&mut self, cell: CellRef, old_deps: &[CellRef], new_deps: &[CellRef]) {
        let old: HashSet<&CellRef> = old_deps.iter().collect();
        let new: HashSet<&CellRef> = new_deps.iter().collect();

        for source in old_deps.iter().filter(|dep| !new.contains(dep)) {
            if let Some(record) = self.store.get_mut(source) {
                record.dependents.remove(&cell);
            }
        }

        for source in new_deps.iter().filter(|dep| !old.contains(dep)) {
            self.store.ensure(*source).dependents.insert(cell);
        }
    }
}
