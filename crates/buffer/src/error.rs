// Chunk: docs/chunks/storage_errors - Typed range errors

use crate::types::TextRange;

/// A range or location fell outside `[0, length)` of the document.
///
/// Ranges are never clamped: any out-of-bounds request fails with this error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("range {range} is out of bounds for a document of length {length}")]
pub struct RangeError {
    /// The offending range. Single-offset lookups report a range of length 1.
    pub range: TextRange,
    /// Document length at the time of the request.
    pub length: usize,
}

impl RangeError {
    pub fn new(range: TextRange, length: usize) -> Self {
        Self { range, length }
    }

    /// Error for a single-offset lookup such as `char_at`.
    pub fn at(location: usize, length: usize) -> Self {
        Self::new(TextRange::new(location, 1), length)
    }
}
