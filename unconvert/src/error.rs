//! Error types.

use crate::ast::NodeId;
use crate::fix::RewriteError;
use crate::frontend::BuildConfig;
use std::path::PathBuf;

/// Errors that abort an unconvert run.
#[derive(Debug, thiserror::Error)]
pub enum UnconvertError {
    /// The front end could not load a configuration.
    #[error("loading {config}: {source}")]
    FrontEnd {
        /// Configuration being loaded.
        config: BuildConfig,
        /// Underlying failure.
        #[source]
        source: FrontEndError,
    },
    /// A node has no recorded position.
    #[error("{}: no position recorded for node {node}", .path.display())]
    MissingPosition {
        /// File containing the node.
        path: PathBuf,
        /// The node.
        node: NodeId,
    },
    /// A conversion is not held by any expression slot of its parent.
    #[error("{}: parent of conversion {node} has no slot holding it", .path.display())]
    MissingSlot {
        /// File containing the node.
        path: PathBuf,
        /// The conversion call.
        node: NodeId,
    },
    /// The edits for a file could not be applied.
    #[error("{}: {source}", .path.display())]
    Rewrite {
        /// File being rewritten.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: RewriteError,
    },
    /// Reading or writing a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// Reformatting a rewritten file failed.
    #[error("{}: {source}", .path.display())]
    Format {
        /// File being formatted.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: FormatError,
    },
    /// An edit set could not be encoded or decoded.
    #[error("edit set encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Result alias for library operations.
pub type Result<T, E = UnconvertError> = std::result::Result<T, E>;

/// Failures reported by a [`FrontEnd`](crate::frontend::FrontEnd).
#[derive(Debug, thiserror::Error)]
pub enum FrontEndError {
    /// A file failed to parse.
    #[error("{}: parse error: {message}", .path.display())]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// A package failed to type-check.
    #[error("type checking {package}: {message}")]
    TypeCheck {
        /// Package import path.
        package: String,
        /// Checker message.
        message: String,
    },
    /// The type checker asked for an import although none was expected.
    #[error("unexpected import of {path:?}")]
    UnexpectedImport {
        /// Requested import path.
        path: String,
    },
}

/// Failures of a [`Formatter`](crate::formatter::Formatter).
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The formatter program could not be run.
    #[error("running {program}: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },
    /// The formatter exited unsuccessfully.
    #[error("{program} failed with {status}: {stderr}")]
    Failed {
        /// Program name.
        program: String,
        /// Exit status.
        status: std::process::ExitStatus,
        /// Captured standard error.
        stderr: String,
    },
    /// The formatter produced output that is not UTF-8.
    #[error("{program} produced non-UTF-8 output")]
    InvalidUtf8 {
        /// Program name.
        program: String,
    },
}
