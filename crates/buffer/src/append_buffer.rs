// Chunk: docs/chunks/piece_table - Piece table with append-only backing

//! Append-only character storage.
//!
//! Every character ever inserted into a document lands here and stays here.
//! The buffer only grows: spans handed out to pieces, snapshots, or retained
//! syntax nodes are never invalidated by later edits. It is shared (`Arc`)
//! between a piece table and all of its clones, so a snapshot taken before an
//! edit keeps reading the same characters after the edit appends more.

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

/// A monotonically growing character buffer.
///
/// Writers append under a short write lock; readers copy spans out under a
/// read lock. Existing characters are never moved or overwritten.
#[derive(Debug, Default)]
pub struct AppendBuffer {
    chars: RwLock<Vec<char>>,
}

impl AppendBuffer {
    /// Creates a new empty append buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `text`, returning `(offset, len)` of the freshly written span.
    pub fn append(&self, text: &str) -> (usize, usize) {
        let mut chars = self.chars.write().unwrap_or_else(PoisonError::into_inner);
        let start = chars.len();
        chars.extend(text.chars());
        (start, chars.len() - start)
    }

    /// Returns the number of characters ever appended.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if nothing was ever appended.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the character at `offset`, if it has been written.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        self.read().get(offset).copied()
    }

    /// Pushes the span `[offset, offset + len)` onto `out`.
    ///
    /// Spans come from pieces and are always within the written region.
    pub fn push_span(&self, offset: usize, len: usize, out: &mut String) {
        let chars = self.read();
        out.extend(chars[offset..offset + len].iter());
    }

    /// Copies the span `[offset, offset + len)` into a vector.
    pub fn copy_span(&self, offset: usize, len: usize) -> Vec<char> {
        self.read()[offset..offset + len].to_vec()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<char>> {
        // Appends never leave the vector half-written, so a poisoned lock
        // still guards valid data.
        self.chars.read().unwrap_or_else(PoisonError::into_inner)
    }
}
