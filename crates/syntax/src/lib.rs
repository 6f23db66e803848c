// Chunk: docs/chunks/incremental_reparse - Markup grammar, incremental reparse, attribute resolution

//! markup-kit-syntax: Markup syntax trees for markup-kit.
//!
//! This crate parses the bundled lightweight markup grammar into an immutable,
//! shared syntax tree, keeps that tree current after edits by reparsing only
//! the affected block, and resolves tree nodes to display attributes.
//!
//! # Overview
//!
//! The main types are:
//!
//! - [`SyntaxTree`]: A shared, read-only tree whose leaves tile the document.
//!   Nodes store lengths only; [`NodeRef`] pairs a node with its absolute start.
//!
//! - [`parse`] / [`reparse`]: Full parsing, and incremental reparsing that
//!   splices one re-parsed block into the old tree, promoting to wider blocks
//!   (and finally the whole document) when block boundaries move.
//!
//! - [`AttributeResolver`]: An ordered rule table mapping node kinds and
//!   ancestor chains to [`AttributeSet`]s, with Catppuccin Mocha colors.
//!
//! - [`AttributeCache`]: Resolved attributes keyed by [`NodeId`], invalidated
//!   with the ids a reparse retires.
//!
//! # Example
//!
//! ```
//! use markup_kit_buffer::{PieceTable, TextRange};
//! use markup_kit_syntax::{parse, reparse, NodeKind, ReparseStrategy, TextEdit};
//!
//! let mut text = PieceTable::from_str("plain**");
//! let tree = parse(&text);
//!
//! text.insert(0, "**").unwrap();
//! let outcome = reparse(&tree, &text, TextEdit::insertion(0, 2));
//!
//! assert_eq!(outcome.strategy, ReparseStrategy::Splice { promotions: 0 });
//! assert_eq!(outcome.changed_range, TextRange::new(0, 9));
//! let strong = outcome.tree.leaf_at(3).unwrap();
//! assert_eq!(strong.kind(), NodeKind::Text);
//! ```

mod attributes;
mod cache;
mod edit;
mod grammar;
mod node;
mod parser;
mod resolver;
mod source;

pub use attributes::{
    AttributePatch, AttributeRun, AttributeSet, Color, FontFamily, UnderlineStyle, BODY_SIZE,
};
pub use cache::AttributeCache;
pub use edit::TextEdit;
pub use node::{NodeId, NodeKind, NodeRef, SyntaxNode, SyntaxTree};
pub use parser::{full_reparse, parse, reparse, try_splice, ReparseOutcome, ReparseStrategy};
pub use resolver::{AttributeResolver, Predicate, Rule};
pub use source::TextSource;
