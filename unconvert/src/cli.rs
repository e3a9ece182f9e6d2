use clap::{Args, Parser};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.unconvert.toml):
  Searched from the first edit set's directory upwards.

  [unconvert]
  oneliners = false          # One line per finding
  formatter = [\"gofmt\"]      # Reformat files after --apply; [] disables

  # Configurations printed by --list-platforms (default: every supported one)
  platforms = [{ os = \"linux\", arch = \"amd64\" }, { os = \"windows\", arch = \"amd64\" }]
";

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct OutputOptions {
    /// Print the merged edit set as JSON instead of diagnostics.
    #[arg(long, conflicts_with = "apply")]
    pub json: bool,

    /// Print one line per finding: `file:line:col: useless conversion`.
    #[arg(long)]
    pub oneliners: bool,

    /// Enable verbose output for debugging (shows per-file progress).
    #[arg(short, long)]
    pub verbose: bool,
}

/// Command line interface configuration using `clap`.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "unconvert - Remove unnecessary Go type conversions",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    /// Serialized edit sets, one per build configuration.
    /// Only removals present in every set are kept.
    #[arg(value_name = "EDIT_SET", required_unless_present = "list_platforms")]
    pub edit_sets: Vec<PathBuf>,

    /// Rewrite the files in place instead of reporting.
    #[arg(long)]
    pub apply: bool,

    /// Command used to reformat rewritten files, e.g. "gofmt -s".
    /// Overrides the `formatter` setting of the configuration file.
    /// Defaults to gofmt.
    #[arg(long, value_name = "CMD", requires = "apply")]
    pub formatter: Option<String>,

    /// Write rewritten files without reformatting them.
    #[arg(long, requires = "apply", conflicts_with = "formatter")]
    pub no_format: bool,

    /// Print the configurations to analyze, one `os/arch` per line, and exit.
    #[arg(long)]
    pub list_platforms: bool,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("unconvert").chain(args.iter().copied()))
    }

    #[test]
    fn test_edit_sets_and_flags() {
        let cli = parse(&["--apply", "--formatter", "gofmt -s", "a.json", "b.json"]).unwrap();
        assert!(cli.apply);
        assert_eq!(cli.formatter.as_deref(), Some("gofmt -s"));
        assert_eq!(cli.edit_sets.len(), 2);
    }

    #[test]
    fn test_edit_set_required() {
        assert!(parse(&["--oneliners"]).is_err());
        assert!(parse(&["--list-platforms"]).is_ok());
    }

    #[test]
    fn test_json_conflicts_with_apply() {
        assert!(parse(&["--json", "--apply", "a.json"]).is_err());
    }

    #[test]
    fn test_formatter_requires_apply() {
        assert!(parse(&["--formatter", "gofmt", "a.json"]).is_err());
        assert!(parse(&["--no-format", "a.json"]).is_err());
    }

    #[test]
    fn test_no_format_conflicts_with_formatter() {
        assert!(parse(&["--apply", "--no-format", "--formatter", "gofmt", "a.json"]).is_err());
        assert!(parse(&["--apply", "--no-format", "a.json"]).unwrap().no_format);
    }
}
