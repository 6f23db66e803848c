// Chunk: docs/chunks/piece_table - Piece table with append-only backing

//! PieceTable is the main public API for text storage.
//!
//! The document is a sequence of [`Piece`]s, each pointing at a span of either
//! the immutable original text or the shared [`AppendBuffer`]. Concatenating
//! the spans in order yields the current text.
//!
//! `replace` never rewrites text: it splits the pieces that straddle the edit
//! boundaries, drops the pieces inside the edited range, and inserts one new
//! piece pointing at the freshly appended replacement text. Cost is
//! O(pieces) for the vector splice, independent of document size.

use std::fmt;
use std::sync::Arc;

use crate::append_buffer::AppendBuffer;
use crate::error::RangeError;
use crate::types::TextRange;

/// Largest span copied out of the append buffer per read-lock acquisition
/// while iterating characters.
const APPEND_READ_CHUNK: usize = 256;

/// Which backing buffer a piece points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferId {
    /// The text the table was constructed from.
    Original,
    /// The shared append-only buffer holding every inserted run.
    Append,
}

/// A reference `(buffer, offset, len)` to a contiguous span of text.
///
/// Pieces are values: the table replaces them in its sequence, it never
/// changes the span a stored piece refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub buffer: BufferId,
    /// Offset of the span inside its buffer.
    pub offset: usize,
    /// Length of the span in chars. Stored pieces are never empty.
    pub len: usize,
}

impl Piece {
    /// Returns true if `next` continues this piece's span in the same buffer.
    fn is_followed_by(&self, next: &Piece) -> bool {
        self.buffer == BufferId::Append
            && next.buffer == BufferId::Append
            && self.offset + self.len == next.offset
    }
}

/// A piece-table text buffer.
///
/// Cloning is cheap: the original text and the append buffer are shared, only
/// the piece vector is copied. A clone is an independent document that keeps
/// reading the text it had at clone time, which is how read snapshots work.
#[derive(Debug, Clone)]
pub struct PieceTable {
    original: Arc<[char]>,
    append: Arc<AppendBuffer>,
    pieces: Vec<Piece>,
    /// Absolute document offset where each piece starts.
    /// Invariant: `piece_starts[i] == sum(pieces[..i].len)`.
    piece_starts: Vec<usize>,
    len: usize,
}

impl PieceTable {
    /// Creates a new empty piece table.
    pub fn new() -> Self {
        Self {
            original: Arc::from(Vec::new()),
            append: Arc::new(AppendBuffer::new()),
            pieces: Vec::new(),
            piece_starts: Vec::new(),
            len: 0,
        }
    }

    /// Creates a piece table whose whole content is one original piece.
    ///
    /// Note: We don't implement `FromStr` because it requires returning `Result`,
    /// but building a table from a string cannot fail.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Self {
        let original: Arc<[char]> = text.chars().collect();
        let len = original.len();
        let (pieces, piece_starts) = if len == 0 {
            (Vec::new(), Vec::new())
        } else {
            (
                vec![Piece {
                    buffer: BufferId::Original,
                    offset: 0,
                    len,
                }],
                vec![0],
            )
        };

        Self {
            original,
            append: Arc::new(AppendBuffer::new()),
            pieces,
            piece_starts,
            len,
        }
    }

    // ==================== Accessors ====================

    /// Returns the document length in chars.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of pieces in the sequence.
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Fails with [`RangeError`] unless `range` lies within `[0, len())`.
    pub fn check_range(&self, range: TextRange) -> Result<(), RangeError> {
        match range.checked_end() {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(RangeError::new(range, self.len)),
        }
    }

    /// Returns the text in `range`.
    ///
    /// The result always holds exactly `range.length` chars.
    pub fn substring(&self, range: TextRange) -> Result<String, RangeError> {
        self.check_range(range)?;

        let mut out = String::with_capacity(range.length);
        if range.is_empty() {
            return Ok(out);
        }

        let end = range.end();
        let mut index = self.piece_index_at(range.location);
        while index < self.pieces.len() {
            let piece = &self.pieces[index];
            let piece_start = self.piece_starts[index];
            if piece_start >= end {
                break;
            }
            let skip = range.location.saturating_sub(piece_start);
            let take = end.min(piece_start + piece.len) - (piece_start + skip);
            self.push_piece_span(piece, skip, take, &mut out);
            index += 1;
        }
        Ok(out)
    }

    /// Returns the entire document as a String.
    pub fn content(&self) -> String {
        self.chars().collect()
    }

    /// Returns the character at `offset`, or `None` past the end.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset >= self.len {
            return None;
        }
        let index = self.piece_index_at(offset);
        let piece = &self.pieces[index];
        let inner = piece.offset + (offset - self.piece_starts[index]);
        match piece.buffer {
            BufferId::Original => self.original.get(inner).copied(),
            BufferId::Append => self.append.char_at(inner),
        }
    }

    /// Returns a lazy iterator over all characters.
    pub fn chars(&self) -> Chars<'_> {
        Chars::new(self, 0)
    }

    /// Returns a lazy iterator over the characters from `offset` to the end.
    ///
    /// `offset == len()` yields an empty iterator; anything beyond fails.
    pub fn chars_from(&self, offset: usize) -> Result<Chars<'_>, RangeError> {
        self.check_range(TextRange::empty(offset))?;
        Ok(Chars::new(self, offset))
    }

    /// Returns a restartable iterator over `(piece, absolute_start)` pairs.
    pub fn iter(&self) -> Pieces<'_> {
        Pieces {
            table: self,
            index: 0,
        }
    }

    // ==================== Mutations ====================

    /// Replaces the text in `range` with `text`, returning the signed change
    /// in length.
    ///
    /// Pieces straddling either boundary are split, pieces inside the range are
    /// dropped, and `text` is appended to the append buffer and referenced by
    /// one new piece. Typing right after the previous insertion extends that
    /// insertion's piece instead of adding another.
    pub fn replace(&mut self, range: TextRange, text: &str) -> Result<isize, RangeError> {
        self.check_range(range)?;
        if range.is_empty() && text.is_empty() {
            return Ok(0);
        }

        let start = range.location;
        let end = range.end();
        // Pieces [lo, hi) overlap the edit (or contain the insertion point).
        let lo = self.piece_index_at(start);
        let hi = self.piece_starts.partition_point(|&s| s < end);

        let mut replacement: Vec<Piece> = Vec::with_capacity(3);
        let mut splice_from = lo;

        if lo < hi && self.piece_starts[lo] < start {
            let piece = self.pieces[lo];
            replacement.push(Piece {
                len: start - self.piece_starts[lo],
                ..piece
            });
        }

        let mut inserted_len = 0;
        if !text.is_empty() {
            let (offset, len) = self.append.append(text);
            inserted_len = len;
            let inserted = Piece {
                buffer: BufferId::Append,
                offset,
                len,
            };

            match replacement.last_mut() {
                Some(prefix) if prefix.is_followed_by(&inserted) => prefix.len += len,
                Some(_) => replacement.push(inserted),
                None if splice_from > 0 && self.pieces[splice_from - 1].is_followed_by(&inserted) => {
                    splice_from -= 1;
                    let previous = self.pieces[splice_from];
                    replacement.push(Piece {
                        len: previous.len + len,
                        ..previous
                    });
                }
                None => replacement.push(inserted),
            }
        }

        if lo < hi {
            let last = hi - 1;
            let piece = self.pieces[last];
            let piece_start = self.piece_starts[last];
            if piece_start + piece.len > end {
                let cut = end - piece_start;
                replacement.push(Piece {
                    buffer: piece.buffer,
                    offset: piece.offset + cut,
                    len: piece.len - cut,
                });
            }
        }

        self.pieces.splice(splice_from..hi, replacement);
        self.len = self.len - range.length + inserted_len;
        self.rebuild_starts_from(splice_from);
        self.assert_consistent();

        let delta = inserted_len as isize - range.length as isize;
        tracing::trace!(%range, inserted_len, delta, pieces = self.pieces.len(), "piece table replace");
        Ok(delta)
    }

    /// Inserts `text` at `offset`. Shorthand for an empty-range `replace`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<isize, RangeError> {
        self.replace(TextRange::empty(offset), text)
    }

    /// Deletes the text in `range`. Shorthand for `replace` with empty text.
    pub fn delete(&mut self, range: TextRange) -> Result<isize, RangeError> {
        self.replace(range, "")
    }

    // ==================== Internals ====================

    /// Index of the piece containing `offset`, or `piece_count()` at the end.
    fn piece_index_at(&self, offset: usize) -> usize {
        if offset >= self.len {
            return self.pieces.len();
        }
        self.piece_starts.partition_point(|&s| s <= offset) - 1
    }

    fn push_piece_span(&self, piece: &Piece, skip: usize, take: usize, out: &mut String) {
        let from = piece.offset + skip;
        match piece.buffer {
            BufferId::Original => out.extend(self.original[from..from + take].iter()),
            BufferId::Append => self.append.push_span(from, take, out),
        }
    }

    fn rebuild_starts_from(&mut self, index: usize) {
        self.piece_starts.truncate(index);
        let mut running = match index {
            0 => 0,
            i => self.piece_starts[i - 1] + self.pieces[i - 1].len,
        };
        for piece in &self.pieces[index..] {
            self.piece_starts.push(running);
            running += piece.len;
        }
    }

    /// Verifies the piece sequence tiles `[0, len)` (debug builds only).
    #[cfg(debug_assertions)]
    fn assert_consistent(&self) {
        assert_eq!(self.pieces.len(), self.piece_starts.len(), "piece_starts out of sync");
        let mut running = 0;
        for (piece, &start) in self.pieces.iter().zip(&self.piece_starts) {
            assert!(piece.len > 0, "empty piece stored at {start}");
            assert_eq!(start, running, "piece_starts drift at piece starting {start}");
            running += piece.len;
        }
        assert_eq!(running, self.len, "pieces do not sum to document length");
    }

    #[cfg(not(debug_assertions))]
    fn assert_consistent(&self) {}
}

impl Default for PieceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PieceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.chars() {
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over `(piece, absolute_start)` pairs in document order.
///
/// Finite, and restartable by calling [`PieceTable::iter`] again.
#[derive(Debug, Clone)]
pub struct Pieces<'a> {
    table: &'a PieceTable,
    index: usize,
}

impl Iterator for Pieces<'_> {
    type Item = (Piece, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let piece = *self.table.pieces.get(self.index)?;
        let start = self.table.piece_starts[self.index];
        self.index += 1;
        Some((piece, start))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.table.pieces.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Pieces<'_> {}

impl<'a> IntoIterator for &'a PieceTable {
    type Item = (Piece, usize);
    type IntoIter = Pieces<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug)]
enum Chunk<'a> {
    Borrowed(std::slice::Iter<'a, char>),
    Copied(std::vec::IntoIter<char>),
}

impl Iterator for Chunk<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        match self {
            Chunk::Borrowed(iter) => iter.next().copied(),
            Chunk::Copied(iter) => iter.next(),
        }
    }
}

/// Lazy character iterator over a piece table.
///
/// Original-text pieces are borrowed directly; appended pieces are copied out
/// in bounded chunks so the append buffer's lock is never held across calls.
#[derive(Debug)]
pub struct Chars<'a> {
    table: &'a PieceTable,
    /// Piece the next chunk is read from.
    piece: usize,
    /// Offset inside that piece where the next chunk starts.
    piece_offset: usize,
    chunk: Chunk<'a>,
}

impl<'a> Chars<'a> {
    fn new(table: &'a PieceTable, offset: usize) -> Self {
        let piece = table.piece_index_at(offset);
        let piece_offset = table
            .piece_starts
            .get(piece)
            .map_or(0, |&start| offset - start);
        Self {
            table,
            piece,
            piece_offset,
            chunk: Chunk::Borrowed([].iter()),
        }
    }

    /// Loads the next non-empty chunk. Returns false at the end of the table.
    fn refill(&mut self) -> bool {
        loop {
            let Some(piece) = self.table.pieces.get(self.piece) else {
                return false;
            };
            if self.piece_offset >= piece.len {
                self.piece += 1;
                self.piece_offset = 0;
                continue;
            }

            let from = piece.offset + self.piece_offset;
            match piece.buffer {
                BufferId::Original => {
                    let to = piece.offset + piece.len;
                    self.chunk = Chunk::Borrowed(self.table.original[from..to].iter());
                    self.piece_offset = piece.len;
                }
                BufferId::Append => {
                    let take = (piece.len - self.piece_offset).min(APPEND_READ_CHUNK);
                    self.chunk = Chunk::Copied(self.table.append.copy_span(from, take).into_iter());
                    self.piece_offset += take;
                }
            }
            return true;
        }
    }
}

impl Iterator for Chars<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        loop {
            if let Some(ch) = self.chunk.next() {
                return Some(ch);
            }
            if !self.refill() {
                return None;
            }
        }
    }
}
