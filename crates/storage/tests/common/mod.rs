#![allow(dead_code)]

use std::cell::RefCell;

use markup_kit_storage::{ChangeDescriptor, ChangeObserver, StorageError, TextStorage};
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output to the test harness. Set `RUST_LOG=debug` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Records every notification, plus what the storage looked like during it.
#[derive(Default)]
pub struct Recorder {
    pub changes: RefCell<Vec<ChangeDescriptor>>,
    pub contents: RefCell<Vec<String>>,
}

impl ChangeObserver for Recorder {
    fn storage_did_change(&self, storage: &TextStorage, change: &ChangeDescriptor) {
        self.changes.borrow_mut().push(*change);
        self.contents.borrow_mut().push(storage.content());
    }
}

/// Tries to edit from inside the notification and keeps the result.
#[derive(Default)]
pub struct Meddler {
    pub results: RefCell<Vec<Result<(), StorageError>>>,
}

impl ChangeObserver for Meddler {
    fn storage_did_change(&self, storage: &TextStorage, change: &ChangeDescriptor) {
        let result = storage.edit(change.changed_attributes_range, "meddled");
        self.results.borrow_mut().push(result);
    }
}
