// Chunk: docs/chunks/piece_table - Piece table with append-only backing

//! markup-kit-buffer: Piece table text storage for markup-kit.
//!
//! This crate provides a piece-table text buffer designed for frequent small
//! edits to a growing document. Edits never rewrite existing text; they
//! rearrange references into an immutable original buffer and a shared,
//! append-only buffer.
//!
//! # Overview
//!
//! The main type is [`PieceTable`], which provides:
//! - `replace` for insertion, deletion, and replacement in one operation
//! - `substring` and lazy `chars_from` reads
//! - `iter` over the `(piece, absolute_start)` sequence
//! - cheap `Clone`, which doubles as a read snapshot
//!
//! All offsets and lengths are counted in `char`s and expressed with
//! [`TextRange`]. Out-of-bounds ranges fail with [`RangeError`]; they are
//! never clamped.
//!
//! # Example
//!
//! ```
//! use markup_kit_buffer::{PieceTable, TextRange};
//!
//! let mut table = PieceTable::from_str("Hello world");
//! let delta = table.replace(TextRange::new(6, 5), "Earth").unwrap();
//! assert_eq!(delta, 0);
//! assert_eq!(table.content(), "Hello Earth");
//!
//! // A clone taken before an edit keeps the old text.
//! let before = table.clone();
//! table.insert(11, "!").unwrap();
//! assert_eq!(before.content(), "Hello Earth");
//! assert_eq!(table.content(), "Hello Earth!");
//! ```

mod append_buffer;
mod error;
mod piece_table;
mod types;

pub use append_buffer::AppendBuffer;
pub use error::RangeError;
pub use piece_table::{BufferId, Chars, Piece, PieceTable, Pieces};
pub use types::TextRange;
