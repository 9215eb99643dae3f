//! cellflow - apply cell edits to a spreadsheet grid and print the results

mod config;
mod error;
mod render;
mod script;

use anyhow::{Context, bail};
use cellflow_core::Sheet;
use cellflow_engine::engine::{ArgKind, BUILTINS};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

const MAX_GRID_CELLS: usize = 1_000_000;

fn print_usage() {
    eprintln!("Usage: cellflow [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Edit script, one 'CELLREF: INPUT' per line");
    eprintln!("                            (reads stdin when omitted or '-')");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <INPUT>     Evaluate one input on an empty sheet");
    eprintln!("  --rows <N>                Grid rows (default: 20)");
    eprintln!("  --cols <N>                Grid columns (default: 10)");
    eprintln!("  --config <FILE>           Load settings from this TOML file");
    eprintln!("  --no-config               Ignore the user config file");
    eprintln!("  --changes                 Print the cells each edit changed");
    eprintln!("  --list-functions          List built-in functions");
    eprintln!("  -v, --verbose             Debug logging on stderr");
    eprintln!("  -h, --help                Print help");
}

#[derive(Debug, Default)]
struct Args {
    file: Option<PathBuf>,
    command: Option<String>,
    rows: Option<usize>,
    cols: Option<usize>,
    config_file: Option<PathBuf>,
    no_config: bool,
    changes: bool,
    list_functions: bool,
    verbose: bool,
    help: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => parsed.help = true,
            "-c" | "--command" => {
                i += 1;
                let Some(input) = args.get(i) else {
                    bail!("--command requires an input");
                };
                parsed.command = Some(input.to_string());
            }
            "--rows" => {
                i += 1;
                parsed.rows = Some(parse_size(args.get(i), "--rows")?);
            }
            "--cols" => {
                i += 1;
                parsed.cols = Some(parse_size(args.get(i), "--cols")?);
            }
            "--config" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    bail!("--config requires a file path");
                };
                parsed.config_file = Some(PathBuf::from(path));
            }
            "--no-config" => parsed.no_config = true,
            "--changes" => parsed.changes = true,
            "--list-functions" => parsed.list_functions = true,
            "-v" | "--verbose" => parsed.verbose = true,
            "-" => set_file(&mut parsed, "-")?,
            arg if arg.starts_with('-') => bail!("Unknown option: {}", arg),
            arg => set_file(&mut parsed, arg)?,
        }
        i += 1;
    }

    Ok(parsed)
}

fn set_file(parsed: &mut Args, arg: &str) -> anyhow::Result<()> {
    if parsed.file.is_some() {
        bail!("Unexpected argument: {}", arg);
    }
    parsed.file = Some(PathBuf::from(arg));
    Ok(())
}

fn parse_size(value: Option<&String>, flag: &str) -> anyhow::Result<usize> {
    let Some(value) = value else {
        bail!("{} requires a number", flag);
    };
    let n: usize = value
        .parse()
        .with_context(|| format!("{} expects a positive integer, got '{}'", flag, value))?;
    if n == 0 {
        bail!("{} must be at least 1", flag);
    }
    Ok(n)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        print_usage();
        return ExitCode::SUCCESS;
    }

    init_logging(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.list_functions {
        for builtin in BUILTINS {
            let arg = match builtin.arg {
                ArgKind::Range => "range",
                ArgKind::Cell => "cell",
            };
            writeln!(out, "{}({})\t{}", builtin.name, arg, builtin.description)?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    let (config, warnings) = if args.no_config {
        (config::Config::default(), Vec::new())
    } else {
        config::load_config(args.config_file.as_deref())
    };
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    if let Some(input) = args.command {
        let formula = if input.starts_with('=') {
            input
        } else {
            format!("={}", input)
        };
        let value = Sheet::with_options(config.options).evaluate(&formula);
        writeln!(out, "{}", value)?;
        return Ok(if value.is_error() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    let rows = args.rows.unwrap_or(config.rows);
    let cols = args.cols.unwrap_or(config.cols);
    if rows.saturating_mul(cols) > MAX_GRID_CELLS {
        bail!(
            "Grid of {} x {} cells is too large (max {} cells)",
            rows,
            cols,
            MAX_GRID_CELLS
        );
    }

    let edits = script::read_script(args.file.as_deref()).with_context(|| match &args.file {
        Some(path) => format!("Failed to load {}", path.display()),
        None => "Failed to read edit script from stdin".to_string(),
    })?;

    let mut sheet = Sheet::init_grid_with_options(rows, cols, config.options);
    debug!(rows, cols, edits = edits.len(), "applying edit script");
    for edit in &edits {
        trace!(line = edit.line, cell = %edit.cell, "applying edit");
        let changes = sheet.set_cell(edit.cell, &edit.input);
        if args.changes {
            render::write_changes(&mut out, edit.cell, &changes, &sheet)?;
        }
    }

    if !args.changes {
        render::write_grid(&mut out, &sheet)?;
    }
    Ok(ExitCode::SUCCESS)
}
