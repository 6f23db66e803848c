// Chunk: docs/chunks/text_storage - Observable text storage adapter

use markup_kit_buffer::RangeError;

/// Errors from editing or configuring a [`TextStorage`](crate::TextStorage).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error(transparent)]
    Range(#[from] RangeError),

    /// `edit` was called while another edit was still applying, typically
    /// from inside a change notification.
    #[error("edit rejected: another edit is still applying")]
    Reentrancy,

    #[error("invalid storage configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to start the background reparse worker: {0}")]
    Worker(#[source] std::io::Error),
}
