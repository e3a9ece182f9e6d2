//! Report command: print diagnostics or the edit set itself.

use crate::edits::EditSet;
use crate::error::UnconvertError;
use crate::output::{print_file_diagnostics, print_json};
use std::fs;
use std::io::Write;

/// Print one diagnostic per removal, file by file in path order.
///
/// # Errors
///
/// Returns an error if a file cannot be read or output fails.
pub fn run_report<W: Write>(set: &EditSet, oneliners: bool, mut writer: W) -> anyhow::Result<()> {
    for (path, removals) in set.files() {
        let source = fs::read_to_string(path).map_err(|source| UnconvertError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        print_file_diagnostics(&mut writer, path, &source, removals, oneliners)?;
    }
    Ok(())
}

/// Print the edit set as JSON.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn run_json<W: Write>(set: &EditSet, mut writer: W) -> anyhow::Result<()> {
    print_json(&mut writer, set)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edits::Removal;
    use crate::source::Span;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    #[test]
    fn test_report_reads_each_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("conv.go");
        fs::write(&path, "package p\n\nvar x = int(y)\n")?;

        let mut set = EditSet::new();
        let removals: BTreeSet<_> = [Removal::strip_parens(19, 22, Span::new(23, 24), 24)].into_iter().collect();
        set.insert_file(path, removals);

        let mut out = Vec::new();
        run_report(&set, true, &mut out)?;
        let text = String::from_utf8(out)?;
        assert!(text.ends_with("conv.go:3:12: useless conversion\n"));
        Ok(())
    }

    #[test]
    fn test_report_missing_file_fails() {
        let mut set = EditSet::new();
        let removals: BTreeSet<_> = [Removal::keep_parens(0, 3, 5, 5)].into_iter().collect();
        set.insert_file("/nonexistent/conv.go".into(), removals);

        let mut out = Vec::new();
        assert!(run_report(&set, false, &mut out).is_err());
    }

    #[test]
    fn test_json_of_empty_set() -> anyhow::Result<()> {
        let mut out = Vec::new();
        run_json(&EditSet::new(), &mut out)?;
        assert_eq!(String::from_utf8(out)?, "{\n  \"files\": {}\n}\n");
        Ok(())
    }
}
