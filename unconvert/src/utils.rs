//! Utilities module for unconvert.
//!
//! Offset-to-line conversion and display helpers shared by the reporter and
//! the applier.

use std::path::Path;

/// A utility struct to convert byte offsets to line numbers.
///
/// Positions are byte offsets; diagnostics want lines and columns.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Stores the byte index of the start of each line.
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Creates a new `LineIndex` by scanning the source code for newlines.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        // '\n' is always a single byte in UTF-8
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    /// Converts a byte offset to a 1-indexed line number.
    #[must_use]
    pub fn line_index(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line + 1,
            Err(line) => line,
        }
    }

    /// Converts a byte offset to a 1-indexed `(line, column)` pair.
    /// Columns count bytes.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self.line_index(offset);
        let start = self.line_starts[line - 1];
        (line, offset - start + 1)
    }

    /// Byte offset where the given 1-indexed line starts.
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1).and_then(|i| self.line_starts.get(i).copied())
    }

    /// Text of the given 1-indexed line, without its terminator.
    #[must_use]
    pub fn line_text<'s>(&self, source: &'s str, line: usize) -> Option<&'s str> {
        let start = self.line_start(line)?;
        let rest = source.get(start..)?;
        let end = rest.find('\n').unwrap_or(rest.len());
        Some(rest[..end].trim_end_matches('\r'))
    }
}

/// Normalizes a path for CLI display.
///
/// - Converts backslashes to forward slashes
/// - Strips a leading "./" prefix
///
/// # Examples
/// ```
/// use std::path::Path;
/// use unconvert::utils::normalize_display_path;
///
/// assert_eq!(normalize_display_path(Path::new("./pkg/conv.go")), "pkg/conv.go");
/// ```
#[must_use]
pub fn normalize_display_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    let clean = s.trim_start_matches(r"\\?\");
    let normalized = clean.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}

/// Blanks out a line prefix so a caret printed after it lines up with the
/// next character. Whitespace survives, everything else becomes a space.
#[must_use]
pub fn rub(prefix: &str) -> String {
    prefix
        .chars()
        .map(|c| if c.is_whitespace() { c } else { ' ' })
        .collect()
}
