// Chunk: docs/chunks/incremental_reparse - Edit descriptions for the reparser

//! Edit descriptions in character offsets.
//!
//! The reparser needs to know where an edit happened in the *old* text and how
//! much text replaced it. [`TextEdit`] carries exactly that and maps offsets
//! between the two coordinate spaces.

use markup_kit_buffer::TextRange;

/// A single replace, described in pre-edit coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    /// The range that was replaced, in pre-edit offsets.
    pub old_range: TextRange,
    /// Number of characters inserted at `old_range.location`.
    pub inserted_len: usize,
}

impl TextEdit {
    pub fn new(old_range: TextRange, inserted_len: usize) -> Self {
        Self {
            old_range,
            inserted_len,
        }
    }

    /// An insertion of `len` characters at `offset`.
    pub fn insertion(offset: usize, len: usize) -> Self {
        Self::new(TextRange::empty(offset), len)
    }

    /// A pure deletion of `range`.
    pub fn deletion(range: TextRange) -> Self {
        Self::new(range, 0)
    }

    /// Signed change in document length.
    pub fn delta(&self) -> isize {
        self.inserted_len as isize - self.old_range.length as isize
    }

    /// The inserted text's range in post-edit offsets.
    pub fn new_range(&self) -> TextRange {
        TextRange::new(self.old_range.location, self.inserted_len)
    }

    /// Maps a pre-edit offset at or after the end of the replaced range into
    /// post-edit coordinates.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `old_offset` lies inside the replaced range.
    pub fn map_end(&self, old_offset: usize) -> usize {
        debug_assert!(old_offset >= self.old_range.end(), "offset inside the replaced range");
        old_offset - self.old_range.length + self.inserted_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_delta() {
        let edit = TextEdit::insertion(5, 2);
        assert_eq!(edit.delta(), 2);
        assert_eq!(edit.new_range(), TextRange::new(5, 2));
    }

    #[test]
    fn test_deletion_delta() {
        let edit = TextEdit::deletion(TextRange::new(9, 1));
        assert_eq!(edit.delta(), -1);
        assert!(edit.new_range().is_empty());
    }

    #[test]
    fn test_map_end_shifts_by_delta() {
        let edit = TextEdit::new(TextRange::new(4, 3), 1);
        assert_eq!(edit.map_end(7), 5);
        assert_eq!(edit.map_end(20), 18);
    }
}
