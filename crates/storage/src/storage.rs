// Chunk: docs/chunks/text_storage - Observable text storage adapter

//! The text storage adapter.
//!
//! [`TextStorage`] ties the piece table, the syntax tree and attribute
//! resolution together behind one `edit` entry point:
//!
//! 1. Reject the edit if another one is applying, or if the range is out of
//!    bounds.
//! 2. Replace text in the piece table.
//! 3. Reparse incrementally and drop cached attributes for retired nodes.
//! 4. Optionally resolve attributes over the changed range.
//! 5. Notify the observer, exactly once, while still marked `Applying`.
//!
//! A plain storage has no tree, so it skips steps 3 and 4.
//!
//! The storage is single-threaded (`!Sync`); other threads read through
//! [`DocumentSnapshot`]s.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use markup_kit_buffer::{PieceTable, RangeError, TextRange};
use markup_kit_syntax::{
    full_reparse, parse, reparse, try_splice, AttributeCache, AttributeResolver, AttributeRun,
    AttributeSet, ReparseOutcome, ReparseStrategy, SyntaxTree, TextEdit,
};

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::observer::{ChangeDescriptor, ChangeObserver, ObserverSlot};
use crate::snapshot::{uniform_runs, DocumentSnapshot, SnapshotStyling};
use crate::worker::ReparseWorker;

/// Whether an edit is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Idle,
    Applying,
}

/// Resets the edit state to `Idle` when dropped, including on unwind.
struct ApplyingGuard<'a>(&'a Cell<EditState>);

impl<'a> ApplyingGuard<'a> {
    fn enter(state: &'a Cell<EditState>) -> Self {
        state.set(EditState::Applying);
        Self(state)
    }
}

impl Drop for ApplyingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(EditState::Idle);
    }
}

/// Observable, attributed text.
///
/// A markup storage keeps a syntax tree in step with the text and resolves
/// attributes through its rule table. A [plain](Self::plain) storage never
/// parses and gives every character the same attributes.
///
/// # Example
///
/// ```
/// use markup_kit_buffer::TextRange;
/// use markup_kit_storage::TextStorage;
///
/// let storage = TextStorage::new("Hello world");
/// storage.edit(TextRange::new(6, 5), "Earth").unwrap();
/// assert_eq!(storage.content(), "Hello Earth");
/// assert_eq!(storage.version(), 1);
/// ```
#[derive(Debug)]
pub struct TextStorage {
    text: RefCell<PieceTable>,
    styling: Styling,
    state: Cell<EditState>,
    version: Cell<u64>,
    observer: RefCell<ObserverSlot>,
    config: StorageConfig,
}

/// Where a storage's attributes come from.
#[derive(Debug)]
enum Styling {
    Markup(Markup),
    /// No syntax tree; every character carries these attributes.
    Plain(AttributeSet),
}

/// Syntax state of a markup storage.
#[derive(Debug)]
struct Markup {
    tree: RefCell<SyntaxTree>,
    resolver: Arc<AttributeResolver>,
    cache: RefCell<AttributeCache>,
    worker: Option<ReparseWorker>,
    /// Version whose tree is still being parsed in the background.
    pending: Cell<Option<u64>>,
}

impl Markup {
    /// Brings the tree up to date with `text` after `edit` and returns the
    /// range whose attributes may have changed.
    fn apply_edit(
        &self,
        text: &PieceTable,
        edit: TextEdit,
        version: u64,
        config: &StorageConfig,
    ) -> TextRange {
        let mut tree = self.tree.borrow_mut();
        let mut cache = self.cache.borrow_mut();

        let changed = match &self.worker {
            Some(worker) => match try_splice(&tree, text, edit) {
                Some(outcome) => install(&mut tree, &mut cache, outcome),
                None => {
                    if worker.submit(version, text.clone()) {
                        cache.clear();
                        self.pending.set(Some(version));
                        tracing::debug!(version, "full reparse handed to background worker");
                        TextRange::new(0, text.len())
                    } else {
                        tracing::warn!(version, "background worker unavailable, reparsing inline");
                        let outcome = full_reparse(&tree, text);
                        install(&mut tree, &mut cache, outcome)
                    }
                }
            },
            None => {
                let outcome = reparse(&tree, text, edit);
                install(&mut tree, &mut cache, outcome)
            }
        };

        if config.refresh_attributes_eagerly && self.pending.get().is_none() {
            self.resolver.warm(&tree, &mut cache, changed);
        }
        changed
    }

    /// Installs a finished background tree, or parses `text` synchronously
    /// if the pending one is not ready.
    fn ensure_current(&self, text: &PieceTable) {
        let Some(version) = self.pending.get() else {
            return;
        };
        self.pending.set(None);

        let ready = self
            .worker
            .as_ref()
            .and_then(|worker| worker.take_matching(version, Duration::ZERO));
        let tree = match ready {
            Some(tree) => {
                tracing::debug!(version, "installed background reparse");
                tree
            }
            None => {
                tracing::debug!(version, "background reparse not ready, parsing inline");
                parse(text)
            }
        };
        *self.tree.borrow_mut() = tree;
    }

    fn await_reparse(&self, timeout: Duration) -> bool {
        let Some(version) = self.pending.get() else {
            return true;
        };
        let Some(tree) = self
            .worker
            .as_ref()
            .and_then(|worker| worker.take_matching(version, timeout))
        else {
            return false;
        };
        *self.tree.borrow_mut() = tree;
        self.pending.set(None);
        tracing::debug!(version, "installed background reparse");
        true
    }
}

impl TextStorage {
    /// Creates a markup storage with the default configuration.
    pub fn new(text: &str) -> Self {
        Self::build(text, StorageConfig::default(), AttributeResolver::standard(), None)
    }

    /// Creates a storage with `config`, starting the background reparse
    /// worker if the config asks for one.
    pub fn with_config(text: &str, config: StorageConfig) -> Result<Self, StorageError> {
        Self::with_resolver(text, config, AttributeResolver::standard())
    }

    /// Like [`with_config`](Self::with_config), with a custom rule table.
    pub fn with_resolver(
        text: &str,
        config: StorageConfig,
        resolver: AttributeResolver,
    ) -> Result<Self, StorageError> {
        let worker = if config.background_full_reparse {
            Some(ReparseWorker::spawn()?)
        } else {
            None
        };
        Ok(Self::build(text, config, resolver, worker))
    }

    /// Creates a storage that never parses markup. Every character reads
    /// back as `attributes`, and each edit reports only the inserted range
    /// as changed.
    pub fn plain(text: &str, attributes: AttributeSet) -> Self {
        let text = PieceTable::from_str(text);
        tracing::debug!(len = text.len(), "created plain text storage");
        Self::assemble(text, Styling::Plain(attributes), StorageConfig::default())
    }

    fn build(
        text: &str,
        config: StorageConfig,
        resolver: AttributeResolver,
        worker: Option<ReparseWorker>,
    ) -> Self {
        let text = PieceTable::from_str(text);
        let tree = parse(&text);
        tracing::debug!(len = text.len(), ?config, "created text storage");
        let markup = Markup {
            tree: RefCell::new(tree),
            resolver: Arc::new(resolver),
            cache: RefCell::new(AttributeCache::new()),
            worker,
            pending: Cell::new(None),
        };
        Self::assemble(text, Styling::Markup(markup), config)
    }

    fn assemble(text: PieceTable, styling: Styling, config: StorageConfig) -> Self {
        Self {
            text: RefCell::new(text),
            styling,
            state: Cell::new(EditState::Idle),
            version: Cell::new(0),
            observer: RefCell::new(ObserverSlot::default()),
            config,
        }
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Replaces `range` with `new_text`.
    ///
    /// On success every read reflects the edit, and the observer (if any) has
    /// been notified exactly once. On error nothing changed and nobody was
    /// notified.
    pub fn edit(&self, range: TextRange, new_text: &str) -> Result<(), StorageError> {
        if self.state.get() == EditState::Applying {
            tracing::warn!(%range, "rejected reentrant edit");
            return Err(StorageError::Reentrancy);
        }
        self.text.borrow().check_range(range)?;

        let _applying = ApplyingGuard::enter(&self.state);
        self.ensure_tree_current();
        let change = self.apply(range, new_text)?;
        self.notify(&change);
        Ok(())
    }

    fn apply(&self, range: TextRange, new_text: &str) -> Result<ChangeDescriptor, StorageError> {
        let delta = self.text.borrow_mut().replace(range, new_text)?;
        let edit = TextEdit::new(range, new_text.chars().count());
        let version = self.version.get() + 1;
        self.version.set(version);

        let changed = match &self.styling {
            Styling::Markup(markup) => {
                markup.apply_edit(&self.text.borrow(), edit, version, &self.config)
            }
            Styling::Plain(_) => edit.new_range(),
        };

        tracing::debug!(%range, delta, version, %changed, "edit applied");
        Ok(ChangeDescriptor {
            old_range: range,
            change_in_length: delta,
            changed_attributes_range: changed,
        })
    }

    fn notify(&self, change: &ChangeDescriptor) {
        // Release the slot before calling out; the observer may replace itself.
        let observer = self.observer.borrow().upgrade();
        if let Some(observer) = observer {
            observer.storage_did_change(self, change);
        }
    }

    fn ensure_tree_current(&self) {
        if let Styling::Markup(markup) = &self.styling {
            markup.ensure_current(&self.text.borrow());
        }
    }

    /// Blocks up to `timeout` for an outstanding background reparse and
    /// installs it. Returns true if the tree is current afterwards.
    ///
    /// Reads never need this; it exists for callers that want to keep the
    /// reparse off their own thread.
    pub fn await_background_reparse(&self, timeout: Duration) -> bool {
        match &self.styling {
            Styling::Markup(markup) => markup.await_reparse(timeout),
            Styling::Plain(_) => true,
        }
    }

    /// Returns true while a background reparse is outstanding.
    pub fn has_pending_reparse(&self) -> bool {
        match &self.styling {
            Styling::Markup(markup) => markup.pending.get().is_some(),
            Styling::Plain(_) => false,
        }
    }

    // =========================================================================
    // Observer
    // =========================================================================

    /// Registers `observer`, replacing any previous one. Only a weak
    /// reference is kept.
    pub fn set_observer<O: ChangeObserver + 'static>(&self, observer: &Rc<O>) {
        self.observer.borrow_mut().set(observer);
    }

    pub fn clear_observer(&self) {
        self.observer.borrow_mut().clear();
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn len(&self) -> usize {
        self.text.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.borrow().is_empty()
    }

    pub fn substring(&self, range: TextRange) -> Result<String, RangeError> {
        self.text.borrow().substring(range)
    }

    pub fn content(&self) -> String {
        self.text.borrow().content()
    }

    /// Attributes of the character at `location`.
    pub fn attributes_at(&self, location: usize) -> Result<AttributeSet, RangeError> {
        match &self.styling {
            Styling::Markup(markup) => {
                markup.ensure_current(&self.text.borrow());
                let tree = markup.tree.borrow();
                markup
                    .resolver
                    .attributes_at(&tree, &mut markup.cache.borrow_mut(), location)
                    .ok_or_else(|| RangeError::at(location, tree.len()))
            }
            Styling::Plain(attributes) => {
                let len = self.len();
                if location < len {
                    Ok(*attributes)
                } else {
                    Err(RangeError::at(location, len))
                }
            }
        }
    }

    /// Maximal runs of uniform attributes over `range`.
    pub fn attribute_runs(&self, range: TextRange) -> Result<Vec<AttributeRun>, RangeError> {
        self.text.borrow().check_range(range)?;
        match &self.styling {
            Styling::Markup(markup) => {
                markup.ensure_current(&self.text.borrow());
                let tree = markup.tree.borrow();
                Ok(markup
                    .resolver
                    .attribute_runs(&tree, &mut markup.cache.borrow_mut(), range))
            }
            Styling::Plain(attributes) => Ok(uniform_runs(range, *attributes)),
        }
    }

    /// The current syntax tree, or `None` for a plain storage. Cheap: the
    /// tree is shared.
    pub fn syntax_tree(&self) -> Option<SyntaxTree> {
        match &self.styling {
            Styling::Markup(markup) => {
                markup.ensure_current(&self.text.borrow());
                Some(markup.tree.borrow().clone())
            }
            Styling::Plain(_) => None,
        }
    }

    /// Returns true if this storage skips markup parsing.
    pub fn is_plain(&self) -> bool {
        matches!(self.styling, Styling::Plain(_))
    }

    /// Number of committed edits.
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    pub fn state(&self) -> EditState {
        self.state.get()
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn resolver(&self) -> Option<&AttributeResolver> {
        match &self.styling {
            Styling::Markup(markup) => Some(&*markup.resolver),
            Styling::Plain(_) => None,
        }
    }

    /// Number of cached attribute sets.
    pub fn cached_attribute_count(&self) -> usize {
        match &self.styling {
            Styling::Markup(markup) => markup.cache.borrow().len(),
            Styling::Plain(_) => 0,
        }
    }

    /// Freezes the current version for reading on any thread.
    pub fn snapshot(&self) -> DocumentSnapshot {
        let text = self.text.borrow().clone();
        let styling = match &self.styling {
            Styling::Markup(markup) => {
                markup.ensure_current(&text);
                SnapshotStyling::Markup {
                    tree: markup.tree.borrow().clone(),
                    resolver: Arc::clone(&markup.resolver),
                }
            }
            Styling::Plain(attributes) => SnapshotStyling::Plain(*attributes),
        };
        DocumentSnapshot::new(text, styling, self.version.get())
    }
}

/// Swaps in a reparsed tree and drops cache entries for retired nodes.
fn install(tree: &mut SyntaxTree, cache: &mut AttributeCache, outcome: ReparseOutcome) -> TextRange {
    match outcome.strategy {
        ReparseStrategy::FullReparse => cache.clear(),
        ReparseStrategy::Splice { .. } => {
            cache.invalidate(&outcome.retired);
        }
    }
    *tree = outcome.tree;
    outcome.changed_range
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_new_storage_is_idle_at_version_zero() {
        let storage = TextStorage::new("abc");
        assert_eq!(storage.state(), EditState::Idle);
        assert_eq!(storage.version(), 0);
        assert_eq!(storage.len(), 3);
    }

    #[test_case(TextRange::new(4, 0) ; "location past end")]
    #[test_case(TextRange::new(2, 2) ; "length past end")]
    #[test_case(TextRange::new(usize::MAX, 2) ; "overflowing end")]
    fn test_out_of_bounds_edit_changes_nothing(range: TextRange) {
        let storage = TextStorage::new("abc");
        let result = storage.edit(range, "x");
        assert!(matches!(result, Err(StorageError::Range(_))));
        assert_eq!(storage.content(), "abc");
        assert_eq!(storage.version(), 0);
        assert_eq!(storage.state(), EditState::Idle);
    }

    #[test]
    fn test_empty_edit_still_counts() {
        let storage = TextStorage::new("abc");
        storage.edit(TextRange::empty(1), "").unwrap();
        assert_eq!(storage.content(), "abc");
        assert_eq!(storage.version(), 1);
    }

    #[test]
    fn test_attributes_at_end_is_range_error() {
        let storage = TextStorage::new("abc");
        assert_eq!(storage.attributes_at(3), Err(RangeError::at(3, 3)));
        assert!(TextStorage::new("").attributes_at(0).is_err());
    }

    #[test]
    fn test_eager_refresh_fills_cache() {
        let storage = TextStorage::new("one\n\ntwo\n");
        storage.edit(TextRange::empty(5), "x").unwrap();
        assert!(storage.cached_attribute_count() > 0);

        let lazy = TextStorage::with_config(
            "one\n\ntwo\n",
            StorageConfig {
                refresh_attributes_eagerly: false,
                ..StorageConfig::default()
            },
        )
        .unwrap();
        lazy.edit(TextRange::empty(5), "x").unwrap();
        assert_eq!(lazy.cached_attribute_count(), 0);
    }

    #[test_case(0 ; "document start")]
    #[test_case(3 ; "inside a word")]
    #[test_case(12 ; "document end")]
    fn test_empty_range_has_no_attribute_runs(location: usize) {
        let storage = TextStorage::new("hello world\n");
        let runs = storage.attribute_runs(TextRange::empty(location)).unwrap();
        assert!(runs.is_empty());
    }

    #[test]
    fn test_repeated_reads_are_stable() {
        let storage = TextStorage::new("# Title\n*a* b\n");
        let first: Vec<AttributeSet> = (0..storage.len())
            .map(|i| storage.attributes_at(i).unwrap())
            .collect();
        let second: Vec<AttributeSet> = (0..storage.len())
            .map(|i| storage.attributes_at(i).unwrap())
            .collect();
        assert_eq!(first, second);
    }
}
