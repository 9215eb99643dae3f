//! User configuration (`config.toml`).

use cellflow_core::{EmptyExtremum, EvalOptions};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

pub const DEFAULT_ROWS: usize = 20;
pub const DEFAULT_COLS: usize = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    grid: Option<GridSection>,
    engine: Option<EngineSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GridSection {
    rows: Option<usize>,
    cols: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineSection {
    empty_extremum: Option<EmptyExtremum>,
}

/// Settings after merging the config file over built-in defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub rows: usize,
    pub cols: usize,
    pub options: EvalOptions,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            options: EvalOptions::default(),
        }
    }
}

/// Load the configuration, falling back to defaults on any problem.
///
/// `explicit` overrides the per-user path. A missing per-user file is not
/// worth a warning; a missing explicit one is.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let Some(path) = explicit.map(Path::to_path_buf).or_else(user_config_path) else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    let content = match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
            return (Config::default(), warnings);
        }
        Ok(_) => match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), err));
                return (Config::default(), warnings);
            }
        },
        Err(err) => {
            warnings.push(format!(
                "Failed to read metadata for {}: {}",
                path.display(),
                err
            ));
            return (Config::default(), warnings);
        }
    };

    let config = parse_config(&content, &path.display().to_string(), &mut warnings);
    (config, warnings)
}

fn parse_config(content: &str, source: &str, warnings: &mut Vec<String>) -> Config {
    let file = match toml::from_str::<ConfigFile>(content) {
        Ok(file) => file,
        Err(err) => {
            warnings.push(format!("Failed to parse {}: {}", source, err));
            return Config::default();
        }
    };

    let mut config = Config::default();
    if let Some(grid) = file.grid {
        if let Some(rows) = grid.rows {
            if rows == 0 {
                warnings.push(format!("{}: grid.rows must be at least 1", source));
            } else {
                config.rows = rows;
            }
        }
        if let Some(cols) = grid.cols {
            if cols == 0 {
                warnings.push(format!("{}: grid.cols must be at least 1", source));
            } else {
                config.cols = cols;
            }
        }
    }
    if let Some(engine) = file.engine
        && let Some(empty_extremum) = engine.empty_extremum
    {
        config.options.empty_extremum = empty_extremum;
    }
    config
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellflow")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
