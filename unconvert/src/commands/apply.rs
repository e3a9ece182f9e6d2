//! Apply command: rewrite files in place.

use crate::edits::EditSet;
use crate::error::{Result, UnconvertError};
use crate::fix::{ByteRangeRewriter, Edit};
use crate::formatter::Formatter;
use crate::utils::normalize_display_path;

use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Result of rewriting one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixResult {
    /// File that was fixed
    pub file: String,
    /// Number of conversions removed
    pub conversions_removed: usize,
}

/// Removes `edits` from the file at `path`, reformats it and writes it back.
///
/// Nothing is written when validation, UTF-8 decoding or formatting fails.
pub fn apply_file(path: &Path, edits: Vec<Edit>, formatter: &dyn Formatter) -> Result<()> {
    let io_error = |source| UnconvertError::Io {
        path: path.to_path_buf(),
        source,
    };

    let content = fs::read_to_string(path).map_err(io_error)?;
    let mut rewriter = ByteRangeRewriter::new(&content);
    rewriter.add_edits(edits);
    let fixed = rewriter.apply().map_err(|source| UnconvertError::Rewrite {
        path: path.to_path_buf(),
        source,
    })?;
    let formatted = formatter
        .format(&fixed)
        .map_err(|source| UnconvertError::Format {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, formatted).map_err(io_error)
}

/// Rewrites every file of `set` in parallel.
///
/// The first failure is returned; files already written stay written.
pub fn apply_edit_set(set: &EditSet, formatter: &dyn Formatter) -> Result<Vec<FixResult>> {
    let files: Vec<_> = set.files().collect();
    files
        .par_iter()
        .map(|(path, removals)| {
            apply_file(path, set.edits(path), formatter)?;
            Ok(FixResult {
                file: normalize_display_path(path),
                conversions_removed: removals.len(),
            })
        })
        .collect()
}

/// Apply the edit set and print a summary line per file.
///
/// # Errors
///
/// Returns an error if any file cannot be rewritten or output fails.
pub fn run_apply<W: Write>(
    set: &EditSet,
    formatter: &dyn Formatter,
    verbose: bool,
    mut writer: W,
) -> anyhow::Result<Vec<FixResult>> {
    if verbose {
        eprintln!(
            "[VERBOSE] Applying {} removal(s) to {} file(s)",
            set.len(),
            set.files().count()
        );
    }

    let results = apply_edit_set(set, formatter)?;
    for result in &results {
        writeln!(
            writer,
            "{} {} ({} removed)",
            "Fixed:".green(),
            result.file,
            result.conversions_removed
        )?;
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edits::Removal;
    use crate::formatter::Verbatim;
    use crate::source::Span;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    #[test]
    fn test_apply_file_rewrites_in_place() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("conv.go");
        fs::write(&path, "package p\n\nvar x = int(y)\n")?;

        apply_file(&path, vec![Edit::delete(19, 23), Edit::delete(24, 25)], &Verbatim)?;
        assert_eq!(fs::read_to_string(&path)?, "package p\n\nvar x = y\n");
        Ok(())
    }

    #[test]
    fn test_overlap_leaves_file_untouched() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("conv.go");
        let original = "package p\n\nvar x = int(y)\n";
        fs::write(&path, original)?;

        let err = apply_file(&path, vec![Edit::delete(19, 24), Edit::delete(21, 25)], &Verbatim)
            .unwrap_err();
        assert!(matches!(err, UnconvertError::Rewrite { .. }));
        assert_eq!(fs::read_to_string(&path)?, original);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = apply_file(Path::new("/nonexistent/conv.go"), vec![], &Verbatim).unwrap_err();
        assert!(matches!(err, UnconvertError::Io { .. }));
    }

    #[test]
    fn test_apply_edit_set_counts_removals() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("conv.go");
        fs::write(&path, "package p\n\nvar x = int(y)\n")?;

        let mut set = EditSet::new();
        let removals: BTreeSet<_> = [Removal::strip_parens(19, 22, Span::new(23, 24), 24)].into_iter().collect();
        set.insert_file(path.clone(), removals);

        let results = apply_edit_set(&set, &Verbatim)?;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].conversions_removed, 1);
        assert_eq!(fs::read_to_string(&path)?, "package p\n\nvar x = y\n");
        Ok(())
    }
}
