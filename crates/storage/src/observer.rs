// Chunk: docs/chunks/text_storage - Observable text storage adapter

//! Change notification.

use std::fmt;
use std::rc::{Rc, Weak};

use markup_kit_buffer::TextRange;

use crate::storage::TextStorage;

/// What one committed edit changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeDescriptor {
    /// The replaced range, in pre-edit offsets.
    pub old_range: TextRange,
    /// Signed change in document length.
    pub change_in_length: isize,
    /// Post-edit range whose attributes may differ. Always contains the
    /// inserted text.
    pub changed_attributes_range: TextRange,
}

/// Receives a notification after every committed edit.
///
/// The call happens synchronously inside [`TextStorage::edit`], after all
/// reads already reflect the edit. Calling `edit` from here fails with
/// [`StorageError::Reentrancy`](crate::StorageError::Reentrancy).
pub trait ChangeObserver {
    fn storage_did_change(&self, storage: &TextStorage, change: &ChangeDescriptor);
}

/// Holds at most one observer without keeping it alive.
#[derive(Default)]
pub(crate) struct ObserverSlot {
    observer: Option<Weak<dyn ChangeObserver>>,
}

impl ObserverSlot {
    pub(crate) fn set<O: ChangeObserver + 'static>(&mut self, observer: &Rc<O>) {
        let weak: Weak<O> = Rc::downgrade(observer);
        self.observer = Some(weak);
    }

    pub(crate) fn clear(&mut self) {
        self.observer = None;
    }

    /// Returns the observer if it is still alive.
    pub(crate) fn upgrade(&self) -> Option<Rc<dyn ChangeObserver>> {
        self.observer.as_ref().and_then(Weak::upgrade)
    }
}

impl fmt::Debug for ObserverSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverSlot")
            .field("registered", &self.observer.is_some())
            .field("alive", &self.upgrade().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Counter(Cell<usize>);

    impl ChangeObserver for Counter {
        fn storage_did_change(&self, _storage: &TextStorage, _change: &ChangeDescriptor) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_slot_holds_concrete_observer_weakly() {
        let counter = Rc::new(Counter::default());
        let mut slot = ObserverSlot::default();
        slot.set(&counter);

        assert!(slot.upgrade().is_some());
        assert_eq!(Rc::strong_count(&counter), 1);

        slot.clear();
        assert!(slot.upgrade().is_none());
    }

    #[test]
    fn test_slot_forgets_dropped_observer() {
        let mut slot = ObserverSlot::default();
        slot.set(&Rc::new(Counter::default()));
        assert!(slot.upgrade().is_none());
    }
}
