// Chunk: docs/chunks/piece_table - Piece table with append-only backing

use std::fmt;
use std::ops::Range;

/// A span of the document as `{ location, length }`, counted in `char`s.
///
/// Ranges are half-open: `end()` is the first offset *not* covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub location: usize,
    pub length: usize,
}

impl TextRange {
    pub fn new(location: usize, length: usize) -> Self {
        Self { location, length }
    }

    /// An empty range at `location` (an insertion point).
    pub fn empty(location: usize) -> Self {
        Self::new(location, 0)
    }

    /// Builds a range from `start..end`. `end` must not precede `start`.
    pub fn from_bounds(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted bounds {start}..{end}");
        Self::new(start, end.saturating_sub(start))
    }

    /// Returns the exclusive end offset.
    pub fn end(&self) -> usize {
        self.location + self.length
    }

    /// Like `end()`, but `None` if the end does not fit in a `usize`.
    pub fn checked_end(&self) -> Option<usize> {
        self.location.checked_add(self.length)
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns true if `offset` lies inside the range.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.location && offset < self.end()
    }

    /// Returns true if `other` lies entirely inside this range.
    ///
    /// An empty `other` is contained if its location is within `[location, end]`.
    pub fn contains_range(&self, other: TextRange) -> bool {
        other.location >= self.location && other.end() <= self.end()
    }

    /// Returns true if the two ranges share at least one offset.
    ///
    /// An empty range shares no offsets, so it never intersects.
    pub fn intersects(&self, other: TextRange) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.location < other.end()
            && other.location < self.end()
    }

    /// Returns the smallest range covering both.
    pub fn union(self, other: TextRange) -> TextRange {
        let start = self.location.min(other.location);
        let end = self.end().max(other.end());
        TextRange::from_bounds(start, end)
    }

    /// Merges another range into this one, producing the smallest range that
    /// covers both.
    pub fn merge(&mut self, other: TextRange) {
        *self = self.union(other);
    }

    pub fn as_range(&self) -> Range<usize> {
        self.location..self.end()
    }
}

impl From<Range<usize>> for TextRange {
    fn from(range: Range<usize>) -> Self {
        TextRange::from_bounds(range.start, range.end)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.location, self.length)
    }
}
