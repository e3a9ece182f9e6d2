//! Byte-range deletion engine used by the applier.
//!
//! The core component is [`ByteRangeRewriter`], which validates a file's
//! deletions (in bounds, non-empty, pairwise non-overlapping) and splices them
//! out of the source in one forward pass.

mod rewriter;

pub use rewriter::{ByteRangeRewriter, Edit, RewriteError};
