//! Parser for edit scripts.
//!
//! One edit per line in `CELLREF: INPUT` form. Blank lines and lines starting
//! with `#` are skipped. The input is trimmed unless it is wrapped in double
//! quotes, which keep their contents verbatim apart from `\"` and `\\`.

use crate::error::{CliError, Result};
use cellflow_core::CellRef;
use std::io::Read;
use std::path::Path;

/// A single `CELLREF: INPUT` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edit {
    pub line: usize,
    pub cell: CellRef,
    pub input: String,
}

/// Read a script from `path`, or from stdin when `path` is `None` or `-`.
pub fn read_script(path: Option<&Path>) -> Result<Vec<Edit>> {
    let content = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            content
        }
    };
    parse_script(&content)
}

/// Parse script text into edits, in order.
pub fn parse_script(content: &str) -> Result<Vec<Edit>> {
    let mut edits = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some((cell_str, input_str)) = trimmed.split_once(':') else {
            return Err(CliError::MissingSeparator {
                line: line_num,
                text: trimmed.to_string(),
            });
        };

        let cell_str = cell_str.trim();
        let cell = CellRef::parse(cell_str).map_err(|source| CliError::InvalidCell {
            line: line_num,
            text: cell_str.to_string(),
            source,
        })?;

        edits.push(Edit {
            line: line_num,
            cell,
            input: parse_input(input_str),
        });
    }

    Ok(edits)
}

fn parse_input(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        unescape(&value[1..value.len() - 1])
    } else {
        value.to_string()
    }
}

fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('\\') => out.push('\\'),
                Some('"') => out.push('"'),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
