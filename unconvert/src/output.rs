//! Diagnostic output.

use crate::edits::{EditSet, Removal};
use crate::utils::{normalize_display_path, rub, LineIndex};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

/// Message used by the one-line format.
pub const MESSAGE: &str = "useless conversion";

/// Print the diagnostics of one file.
///
/// Each removal is reported at its opening parenthesis, either as
/// `path:line:col:` followed by the source line and a caret, or, with
/// `oneliners`, as `path:line:col: useless conversion`. Columns count
/// bytes from 1.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_file_diagnostics(
    writer: &mut impl Write,
    path: &Path,
    source: &str,
    removals: &BTreeSet<Removal>,
    oneliners: bool,
) -> std::io::Result<()> {
    let display = normalize_display_path(path);
    let index = LineIndex::new(source);
    for removal in removals {
        let (line, col) = index.line_col(removal.lparen);
        if oneliners {
            writeln!(writer, "{display}:{line}:{col}: {MESSAGE}")?;
            continue;
        }
        writeln!(writer, "{display}:{line}:{col}:")?;
        let text = index.line_text(source, line).unwrap_or_default();
        let prefix = text.get(..col - 1).unwrap_or(text);
        writeln!(writer, "{text}")?;
        writeln!(writer, "{}^", rub(prefix))?;
    }
    Ok(())
}

/// Print the edit set as JSON.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn print_json(writer: &mut impl Write, set: &EditSet) -> crate::Result<()> {
    set.write_json(&mut *writer)?;
    writeln!(writer).map_err(serde_json::Error::io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Span;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "package p\n\nfunc f() {\n\t_ = int64(v)\n}\n";

    fn removals() -> BTreeSet<Removal> {
        let start = SOURCE.find("int64").unwrap();
        let lparen = start + "int64".len();
        let rparen = SOURCE.rfind(')').unwrap();
        [Removal::strip_parens(start, lparen, Span::new(lparen + 1, rparen), rparen)].into_iter().collect()
    }

    #[test]
    fn test_caret_snippet() {
        let mut out = Vec::new();
        print_file_diagnostics(&mut out, Path::new("./p/f.go"), SOURCE, &removals(), false)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "p/f.go:4:11:\n\t_ = int64(v)\n\t         ^\n"
        );
    }

    #[test]
    fn test_oneliners() {
        let mut out = Vec::new();
        print_file_diagnostics(&mut out, Path::new("p/f.go"), SOURCE, &removals(), true).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "p/f.go:4:11: useless conversion\n"
        );
    }
}
