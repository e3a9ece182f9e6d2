//! Shared constants.

/// Name of the configuration file searched from the input paths upwards.
pub const CONFIG_FILENAME: &str = ".unconvert.toml";

/// Default filter for `env_logger` when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Filter used with `--verbose`.
pub const VERBOSE_LOG_FILTER: &str = "debug";

/// Formatter run over rewritten files unless configured otherwise.
pub const DEFAULT_FORMATTER: &[&str] = &["gofmt"];

/// Exit code when removals were reported or applied.
pub const EXIT_FOUND: i32 = 1;
