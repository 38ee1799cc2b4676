//! Position and span tracking for source provenance
//!
//! Every origin attached to a node carries a [`Span`]: the byte range of the
//! producing text plus its line/column endpoints. [`LineIndex`] converts byte
//! offsets into positions in O(log n) via binary search over line starts.

use serde::Serialize;
use std::fmt;
use std::ops::Range as ByteRange;

/// A line:column position in source text (both zero-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

/// A contiguous region of source text: byte range plus position endpoints
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub bytes: ByteRange<usize>,
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(bytes: ByteRange<usize>, start: Position, end: Position) -> Self {
        Self { bytes, start, end }
    }

    /// Whether a position falls inside this span (endpoints included)
    pub fn contains(&self, position: Position) -> bool {
        (self.start.line < position.line
            || (self.start.line == position.line && self.start.column <= position.column))
            && (self.end.line > position.line
                || (self.end.line == position.line && self.end.column >= position.column))
    }

    /// Smallest span covering every span in the iterator
    pub fn covering<'a, I>(mut spans: I) -> Option<Span>
    where
        I: Iterator<Item = &'a Span>,
    {
        let first = spans.next()?.clone();
        let mut bytes_start = first.bytes.start;
        let mut bytes_end = first.bytes.end;
        let mut start = first.start;
        let mut end = first.end;

        for span in spans {
            if span.start < start {
                start = span.start;
                bytes_start = span.bytes.start;
            } else if span.start == start {
                bytes_start = bytes_start.min(span.bytes.start);
            }

            if span.end > end {
                end = span.end;
                bytes_end = span.bytes.end;
            } else if span.end == end {
                bytes_end = bytes_end.max(span.bytes.end);
            }
        }

        Some(Span::new(bytes_start..bytes_end, start, end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::new(0..0, Position::default(), Position::default())
    }
}

/// Fast byte-offset to line/column conversion for one source text
pub struct LineIndex {
    /// Byte offsets where each line starts
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset into a line/column position
    pub fn position(&self, offset: usize) -> Position {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|next| next - 1);
        Position::new(line, offset - self.line_starts[line])
    }

    /// Convert a byte range into a full span
    pub fn span(&self, bytes: &ByteRange<usize>) -> Span {
        Span::new(
            bytes.clone(),
            self.position(bytes.start),
            self.position(bytes.end),
        )
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
