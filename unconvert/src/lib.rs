//! Core library for the unconvert tool.
//!
//! This library finds conversions `T(x)` in Go code whose argument already
//! has type `T`, keeps only those that are redundant under every build
//! configuration, and removes them from the source files.

#![allow(
    clippy::type_complexity,
    clippy::similar_names,
    clippy::map_unwrap_or,
    clippy::items_after_statements
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

/// Module containing the analyzer: per-configuration detection and the merge.
pub mod analyzer;

/// Module defining the syntax tree handed over by the front end.
pub mod ast;

/// Module defining the type information attached to the tree.
pub mod types;

/// Module pairing a checked tree with its source text and offsets.
pub mod source;

/// Module defining the front-end seam: build configurations, loaders, importers.
pub mod frontend;

/// Module classifying untyped constant expressions.
pub mod untyped;

/// Module containing the canonical and faithful printers.
pub mod printer;

/// Module deciding whether a removed conversion must leave parentheses behind.
pub mod oracle;

/// Module containing the redundant conversion detector.
pub mod detector;

/// Module defining edit sets and their intersection.
pub mod edits;

/// Module containing the byte-range rewriter.
pub mod fix;

/// Module containing the formatters run after rewriting.
pub mod formatter;

/// Module for diagnostic and JSON output.
pub mod output;

/// Module for loading configuration.
pub mod config;

/// Module containing shared constants.
pub mod constants;

/// Module defining the error types.
pub mod error;

/// Module containing utility functions.
pub mod utils;

/// Module defining the command-line interface arguments.
pub mod cli;

/// Module for handling CLI commands and their execution logic.
pub mod commands;

/// Module defining the entry point shared by the binaries.
pub mod entry_point;

/// Module containing test utilities.
/// This helps in writing tests for the detector and the merge.
pub mod test_utils;

pub use analyzer::Unconvert;
pub use edits::{EditSet, Removal};
pub use error::{Result, UnconvertError as Error};
pub use frontend::{BuildConfig, FrontEnd};
