//! Shared entry point for the `unconvert` binaries.

use crate::analyzer::Unconvert;
use crate::cli::Cli;
use crate::commands::{run_apply, run_json, run_report};
use crate::config::Config;
use crate::constants::{DEFAULT_FORMATTER, DEFAULT_LOG_FILTER, EXIT_FOUND, VERBOSE_LOG_FILTER};
use crate::edits::EditSet;
use crate::formatter::{CommandFormatter, Formatter, Verbatim};
use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Run unconvert with the given arguments (program name excluded).
///
/// Returns the process exit code: 1 when removals were reported or applied,
/// 0 otherwise.
///
/// # Errors
///
/// Returns an error if an edit set cannot be loaded or a command fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Run unconvert with the given arguments, writing output to the specified writer.
///
/// This is the testable version of `run_with_args` that allows output capture.
///
/// # Errors
///
/// Returns an error if an edit set cannot be loaded or a command fails.
pub fn run_with_args_to<W: std::io::Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["unconvert".to_owned()];
    program_args.extend(args);
    let cli = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                write!(writer, "{e}")?;
                writer.flush()?;
                return Ok(0);
            }
            _ => {
                eprint!("{e}");
                return Ok(1);
            }
        },
    };

    init_logging(cli.output.verbose);

    let config_path = cli
        .edit_sets
        .first()
        .and_then(|p| p.parent())
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let config = Config::load_from_path(config_path);

    if cli.output.verbose {
        eprintln!("[VERBOSE] unconvert v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("[VERBOSE] Using {} threads", rayon::current_num_threads());
        if let Some(path) = &config.config_file_path {
            eprintln!("[VERBOSE] Config: {}", path.display());
        }
    }

    if cli.list_platforms {
        let mut analyzer = Unconvert::from_config(&config);
        if config.unconvert.platforms.is_none() {
            analyzer = analyzer.with_all_platforms();
        }
        for build in &analyzer.configs {
            writeln!(writer, "{build}")?;
        }
        return Ok(0);
    }

    let merged = load_merged(&cli.edit_sets)?;
    if cli.output.verbose {
        eprintln!(
            "[VERBOSE] {} edit set(s) merged: {} removal(s) in {} file(s)",
            cli.edit_sets.len(),
            merged.len(),
            merged.files().count()
        );
    }

    if cli.output.json {
        run_json(&merged, &mut *writer)?;
    } else if cli.apply {
        let command = formatter_command(cli.formatter.as_deref(), cli.no_format, &config);
        let formatter = build_formatter(&command);
        run_apply(&merged, formatter.as_ref(), cli.output.verbose, &mut *writer)?;
    } else {
        let oneliners = cli.output.oneliners || config.unconvert.oneliners.unwrap_or(false);
        run_report(&merged, oneliners, &mut *writer)?;
    }

    Ok(if merged.is_empty() { 0 } else { EXIT_FOUND })
}

/// Reads every edit set and keeps the removals they all contain.
///
/// # Errors
///
/// Returns an error if a file cannot be opened or decoded.
pub fn load_merged(paths: &[PathBuf]) -> Result<EditSet> {
    let mut merged: Option<EditSet> = None;
    for path in paths {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let set = EditSet::read_json(BufReader::new(file))
            .with_context(|| format!("failed to decode {}", path.display()))?;
        log::debug!("{}: {} removal(s)", path.display(), set.len());
        merged = Some(match merged {
            Some(acc) => acc.intersection(&set),
            None => set,
        });
    }
    Ok(merged.unwrap_or_default())
}

/// The formatter command for `--apply`: the flag, else the configuration,
/// else gofmt. Empty means files are written as rewritten.
fn formatter_command(flag: Option<&str>, no_format: bool, config: &Config) -> Vec<String> {
    if no_format {
        return Vec::new();
    }
    match flag {
        Some(cmd) => cmd.split_whitespace().map(str::to_owned).collect(),
        None => config.unconvert.formatter.clone().unwrap_or_else(|| {
            DEFAULT_FORMATTER.iter().map(|&word| word.to_owned()).collect()
        }),
    }
}

fn build_formatter(command: &[String]) -> Box<dyn Formatter> {
    match CommandFormatter::from_command(command) {
        Some(formatter) => Box::new(formatter),
        None => Box::new(Verbatim),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    // A second run in the same process keeps the first logger.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .try_init();
}
