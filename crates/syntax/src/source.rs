// Chunk: docs/chunks/syntax_tree - Character sources the parser reads from

//! Read access to text for the parser.
//!
//! The parser never needs the whole document as one string; it reads a line at
//! a time starting from arbitrary offsets. [`TextSource`] is that seam, so the
//! same parser runs over a [`PieceTable`] in production and over plain strings
//! in tests.

use markup_kit_buffer::PieceTable;

/// Text the parser can read, addressed in `char` offsets.
pub trait TextSource {
    /// Total length in characters.
    fn len(&self) -> usize;

    /// Characters from `offset` to the end. Empty when `offset >= len()`.
    fn chars_from(&self, offset: usize) -> impl Iterator<Item = char> + '_;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TextSource for PieceTable {
    fn len(&self) -> usize {
        PieceTable::len(self)
    }

    fn chars_from(&self, offset: usize) -> impl Iterator<Item = char> + '_ {
        PieceTable::chars_from(self, offset).into_iter().flatten()
    }
}

impl TextSource for [char] {
    fn len(&self) -> usize {
        <[char]>::len(self)
    }

    fn chars_from(&self, offset: usize) -> impl Iterator<Item = char> + '_ {
        self.get(offset..).unwrap_or_default().iter().copied()
    }
}

/// Linear in `offset`; meant for tests and small inputs.
impl TextSource for str {
    fn len(&self) -> usize {
        self.chars().count()
    }

    fn chars_from(&self, offset: usize) -> impl Iterator<Item = char> + '_ {
        self.chars().skip(offset)
    }
}
