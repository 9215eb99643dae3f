//! Plain-text output: the grid as tab-separated rows and per-edit change sets.

use cellflow_core::{CellRef, ChangeSet, Sheet};
use std::io::{self, Write};

/// Write the sheet's grid as tab-separated display values, one row per line.
pub fn write_grid<W: Write>(out: &mut W, sheet: &Sheet) -> io::Result<()> {
    let (rows, cols) = sheet.dimensions();
    for row in 0..rows {
        let line: Vec<String> = (0..cols)
            .map(|col| tsv_field(&sheet.value(&CellRef::new(col, row)).to_string()))
            .collect();
        writeln!(out, "{}", line.join("\t"))?;
    }
    Ok(())
}

/// Describe one edit's effect, e.g. `A1: A1=10, B1=11 (circular: C1)`.
pub fn write_changes<W: Write>(
    out: &mut W,
    edited: CellRef,
    changes: &ChangeSet,
    sheet: &Sheet,
) -> io::Result<()> {
    let changed: Vec<String> = changes
        .changed
        .iter()
        .map(|cell| format!("{}={}", cell, tsv_field(&sheet.value(cell).to_string())))
        .collect();
    write!(out, "{}: ", edited)?;
    if changed.is_empty() {
        write!(out, "no changes")?;
    } else {
        write!(out, "{}", changed.join(", "))?;
    }
    if !changes.circular.is_empty() {
        let circular: Vec<String> = changes.circular.iter().map(|c| c.to_string()).collect();
        write!(out, " (circular: {})", circular.join(", "))?;
    }
    writeln!(out)
}

fn tsv_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
