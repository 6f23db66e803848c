// Chunk: docs/chunks/text_storage - Observable text storage adapter

//! markup-kit-storage: Observable, attributed text storage for markup-kit.
//!
//! [`TextStorage`] is the single owner of a document. Each call to
//! [`TextStorage::edit`] updates the piece table, reparses the affected block,
//! refreshes display attributes, and reports what changed to one registered
//! [`ChangeObserver`] before returning.
//!
//! # Overview
//!
//! - [`TextStorage`]: edits, reads (`substring`, `attributes_at`,
//!   `attribute_runs`), and the read-only syntax tree
//! - [`ChangeDescriptor`]: the `{old_range, change_in_length,
//!   changed_attributes_range}` payload of a notification
//! - [`DocumentSnapshot`]: a `Send + Sync` view frozen at one version
//! - [`StorageConfig`]: serde-loadable tunables, including off-thread full
//!   reparses
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use markup_kit_buffer::TextRange;
//! use markup_kit_storage::{ChangeDescriptor, ChangeObserver, TextStorage};
//!
//! #[derive(Default)]
//! struct Recorder(RefCell<Vec<ChangeDescriptor>>);
//!
//! impl ChangeObserver for Recorder {
//!     fn storage_did_change(&self, _storage: &TextStorage, change: &ChangeDescriptor) {
//!         self.0.borrow_mut().push(*change);
//!     }
//! }
//!
//! let storage = TextStorage::new("plain");
//! let recorder = Rc::new(Recorder::default());
//! storage.set_observer(&recorder);
//!
//! storage.edit(TextRange::empty(5), "**").unwrap();
//! storage.edit(TextRange::empty(0), "**").unwrap();
//!
//! let changes = recorder.0.borrow();
//! assert_eq!(changes.len(), 2);
//! assert_eq!(changes[1].changed_attributes_range, TextRange::new(0, 9));
//! assert!(storage.attributes_at(4).unwrap().bold);
//! ```

mod config;
mod error;
mod observer;
mod snapshot;
mod storage;
mod worker;

pub use config::StorageConfig;
pub use error::StorageError;
pub use observer::{ChangeDescriptor, ChangeObserver};
pub use snapshot::DocumentSnapshot;
pub use storage::{EditState, TextStorage};
