//! Commands module - what the CLI does with a merged edit set.

mod apply;
mod report;

pub use apply::{apply_edit_set, apply_file, run_apply, FixResult};
pub use report::{run_json, run_report};
