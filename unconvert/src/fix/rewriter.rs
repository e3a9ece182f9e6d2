//! Byte-range safe deletion rewriter.
//!
//! # Usage
//!
//! ```
//! use unconvert::fix::{ByteRangeRewriter, Edit};
//!
//! let source = "x := int(y)";
//! let mut rewriter = ByteRangeRewriter::new(source);
//! rewriter.add_edits([Edit::delete(5, 9), Edit::delete(10, 11)]);
//! assert_eq!(rewriter.apply().unwrap(), "x := y");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open byte range to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edit {
    /// Start byte offset (inclusive)
    #[serde(rename = "start")]
    pub start_byte: usize,
    /// End byte offset (exclusive)
    #[serde(rename = "end")]
    pub end_byte: usize,
}

impl Edit {
    /// Create a deletion edit
    #[must_use]
    pub const fn delete(start_byte: usize, end_byte: usize) -> Self {
        Self {
            start_byte,
            end_byte,
        }
    }

    /// Length of the range being deleted
    #[must_use]
    pub const fn range_len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    /// Check if this edit overlaps with another. Touching ranges do not overlap.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start_byte < other.end_byte && other.start_byte < self.end_byte
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start_byte, self.end_byte)
    }
}

/// Error during rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    /// Two edits have overlapping ranges
    OverlappingEdits {
        /// Edit with the smaller start
        first: Edit,
        /// Edit starting inside `first`
        second: Edit,
    },
    /// Edit range is out of bounds
    OutOfBounds {
        /// The bad edit
        edit: Edit,
        /// Length of the source
        source_len: usize,
    },
    /// Edit range is empty or reversed
    EmptyRange {
        /// The bad edit
        edit: Edit,
    },
    /// Source is not valid UTF-8 after the edits
    InvalidUtf8,
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverlappingEdits { first, second } => {
                write!(f, "Overlapping edits {first} and {second}")
            }
            Self::OutOfBounds { edit, source_len } => {
                write!(f, "Edit {edit} out of bounds: source length {source_len}")
            }
            Self::EmptyRange { edit } => write!(f, "Edit {edit} is empty"),
            Self::InvalidUtf8 => write!(f, "Result is not valid UTF-8"),
        }
    }
}

impl std::error::Error for RewriteError {}

/// Safe deletion rewriter using byte ranges
#[derive(Debug, Clone)]
pub struct ByteRangeRewriter<'s> {
    source: &'s str,
    edits: Vec<Edit>,
}

impl<'s> ByteRangeRewriter<'s> {
    /// Create a new rewriter for the given source
    #[must_use]
    pub const fn new(source: &'s str) -> Self {
        Self {
            source,
            edits: Vec::new(),
        }
    }

    /// Add multiple edits
    pub fn add_edits(&mut self, edits: impl IntoIterator<Item = Edit>) {
        self.edits.extend(edits);
    }

    /// Sorts the pending edits by start and validates them.
    ///
    /// # Errors
    /// Returns error if an edit is empty, out of bounds, or overlaps its predecessor
    pub fn validate(&mut self) -> Result<(), RewriteError> {
        self.edits.sort_unstable();

        for edit in &self.edits {
            if edit.start_byte >= edit.end_byte {
                return Err(RewriteError::EmptyRange { edit: *edit });
            }
            if edit.end_byte > self.source.len() {
                return Err(RewriteError::OutOfBounds {
                    edit: *edit,
                    source_len: self.source.len(),
                });
            }
        }

        // Sorted by start, so checking neighbours is enough.
        for pair in self.edits.windows(2) {
            if pair[1].start_byte < pair[0].end_byte {
                return Err(RewriteError::OverlappingEdits {
                    first: pair[0],
                    second: pair[1],
                });
            }
        }

        Ok(())
    }

    /// Apply all edits and return the modified source
    ///
    /// Bytes are copied forward, skipping every deleted range.
    ///
    /// # Errors
    /// Returns error if validation fails or the result is not valid UTF-8
    pub fn apply(mut self) -> Result<String, RewriteError> {
        self.validate()?;

        let bytes = self.source.as_bytes();
        let removed: usize = self.edits.iter().map(Edit::range_len).sum();
        let mut out = Vec::with_capacity(bytes.len() - removed);
        let mut cursor = 0;
        for edit in &self.edits {
            out.extend_from_slice(&bytes[cursor..edit.start_byte]);
            cursor = edit.end_byte;
        }
        out.extend_from_slice(&bytes[cursor..]);

        String::from_utf8(out).map_err(|_| RewriteError::InvalidUtf8)
    }
}
