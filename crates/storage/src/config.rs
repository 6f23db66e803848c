// Chunk: docs/chunks/text_storage - Observable text storage adapter

//! Storage configuration.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Tunables for a [`TextStorage`](crate::TextStorage).
///
/// Every field has a default, so a partial (or empty) JSON object is valid.
///
/// # Example
///
/// ```
/// use markup_kit_storage::StorageConfig;
///
/// let config = StorageConfig::from_json(r#"{ "background_full_reparse": true }"#).unwrap();
/// assert!(config.background_full_reparse);
/// assert!(config.refresh_attributes_eagerly);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Hand whole-document reparses to a worker thread instead of running
    /// them inside `edit`.
    pub background_full_reparse: bool,
    /// Resolve attributes over the changed range during `edit`, so the first
    /// reads afterwards hit the cache.
    pub refresh_attributes_eagerly: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            background_full_reparse: false,
            refresh_attributes_eagerly: true,
        }
    }
}

impl StorageConfig {
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
