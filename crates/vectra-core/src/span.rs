//! Source location tracking for diagnostics and debug symbols.
//!
//! Provides [`SourceSpan`] for the line/column range of a node and
//! [`SourceLocation`] which pairs a span with the file it came from.

use std::fmt;
use std::sync::Arc;

/// A range of source text, from a start position to an end position.
///
/// Lines and columns are 1-indexed. A default span (all zeros) stands for
/// synthesized nodes that have no source text of their own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceSpan {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl SourceSpan {
    #[inline]
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create a zero-width span at a position.
    #[inline]
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// Whether this span is the default (synthesized) span.
    #[inline]
    pub fn is_synthetic(&self) -> bool {
        *self == SourceSpan::default()
    }

    /// Merge two spans into one covering both.
    #[inline]
    pub fn merge(self, other: SourceSpan) -> SourceSpan {
        let (start_line, start_col) =
            (self.start_line, self.start_col).min((other.start_line, other.start_col));
        let (end_line, end_col) = (self.end_line, self.end_col).max((other.end_line, other.end_col));
        SourceSpan {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// The four span integers in container order.
    pub fn to_array(self) -> [u32; 4] {
        [self.start_line, self.start_col, self.end_line, self.end_col]
    }
}

impl fmt::Debug for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// A span within a particular source file.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Path of the originating source file, shared between all nodes of that file.
    pub file: Arc<str>,
    pub span: SourceSpan,
}

impl SourceLocation {
    pub fn new(file: Arc<str>, span: SourceSpan) -> Self {
        Self { file, span }
    }
}

impl fmt::Debug for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.file, self.span)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.span)
    }
}
