// Chunk: docs/chunks/text_storage - Observable text storage adapter

//! markup-kit: Incrementally parsed, attributed markup text.
//!
//! This crate re-exports the workspace crates under one roof:
//!
//! - [`buffer`]: the piece table text store and [`TextRange`]
//! - [`syntax`]: the markup grammar, incremental reparsing, and attribute
//!   resolution
//! - [`storage`]: [`TextStorage`], the observable adapter that ties them
//!   together, and its thread-safe [`DocumentSnapshot`]
//!
//! # Example
//!
//! ```
//! use markup_kit::{TextRange, TextStorage};
//!
//! let storage = TextStorage::new("# Notes\n\nplain text\n");
//! storage.edit(TextRange::new(9, 5), "*fancy*").unwrap();
//!
//! assert_eq!(storage.content(), "# Notes\n\n*fancy* text\n");
//! assert!(storage.attributes_at(10).unwrap().italic);
//! assert!(storage.attributes_at(2).unwrap().bold);
//! ```

pub use markup_kit_buffer as buffer;
pub use markup_kit_storage as storage;
pub use markup_kit_syntax as syntax;

pub use markup_kit_buffer::{RangeError, TextRange};
pub use markup_kit_storage::{
    ChangeDescriptor, ChangeObserver, DocumentSnapshot, EditState, StorageConfig, StorageError,
    TextStorage,
};
pub use markup_kit_syntax::{AttributeRun, AttributeSet, NodeKind, SyntaxTree};
