//! Per-file inputs handed over by the front end.

use crate::ast::{File, NodeId};
use crate::error::{Result, UnconvertError};
use crate::types::TypeInfo;
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Half-open byte range of a node in its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// First byte of the node.
    pub start: usize,
    /// One past the last byte of the node.
    pub end: usize,
}

impl Span {
    /// Creates a span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Offset-resolution table for one file.
///
/// Spans are recorded for expressions and statements; call expressions also
/// record the offsets of their parentheses.
#[derive(Debug, Clone, Default)]
pub struct Positions {
    spans: FxHashMap<NodeId, Span>,
    parens: FxHashMap<NodeId, (usize, usize)>,
}

impl Positions {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the span of a node.
    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.spans.insert(id, span);
    }

    /// Records the parenthesis offsets of a call.
    pub fn set_parens(&mut self, call: NodeId, lparen: usize, rparen: usize) {
        self.parens.insert(call, (lparen, rparen));
    }

    /// Span of a node.
    #[must_use]
    pub fn span(&self, id: NodeId) -> Option<Span> {
        self.spans.get(&id).copied()
    }

    /// `(lparen, rparen)` of a call.
    #[must_use]
    pub fn parens(&self, call: NodeId) -> Option<(usize, usize)> {
        self.parens.get(&call).copied()
    }
}

/// One parsed and type-checked file under one build configuration.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Path the file was loaded from.
    pub path: PathBuf,
    /// Source text.
    pub source: Arc<str>,
    /// Syntax tree.
    pub file: File,
    /// Types and objects of the tree's nodes.
    pub info: TypeInfo,
    /// Node offsets into `source`.
    pub positions: Positions,
}

impl SourceUnit {
    /// Span of a node, or an invariant error naming the file.
    pub fn span(&self, id: NodeId) -> Result<Span> {
        self.positions
            .span(id)
            .ok_or_else(|| self.missing_position(id))
    }

    /// Parenthesis offsets of a call, or an invariant error naming the file.
    pub fn parens(&self, call: NodeId) -> Result<(usize, usize)> {
        self.positions
            .parens(call)
            .ok_or_else(|| self.missing_position(call))
    }

    fn missing_position(&self, node: NodeId) -> UnconvertError {
        UnconvertError::MissingPosition {
            path: self.path.clone(),
            node,
        }
    }
}
