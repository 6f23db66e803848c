// Chunk: docs/chunks/attribute_resolution - Per-node attribute cache

use std::collections::HashMap;

use crate::attributes::AttributeSet;
use crate::node::NodeId;

/// Resolved attributes keyed by node identity.
///
/// Node ids are never reused, so an entry can only go stale by leaking: a
/// retired node's entry is unreachable but still occupies memory. Callers
/// drop those entries with [`invalidate`](Self::invalidate) after a reparse.
#[derive(Debug, Default)]
pub struct AttributeCache {
    entries: HashMap<NodeId, AttributeSet>,
}

impl AttributeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<AttributeSet> {
        self.entries.get(&id).copied()
    }

    /// Returns the cached set for `id`, resolving and storing it on a miss.
    pub fn get_or_insert_with(
        &mut self,
        id: NodeId,
        resolve: impl FnOnce() -> AttributeSet,
    ) -> AttributeSet {
        *self.entries.entry(id).or_insert_with(resolve)
    }

    /// Drops entries for the given nodes. Returns how many were present.
    pub fn invalidate(&mut self, ids: &[NodeId]) -> usize {
        ids.iter()
            .filter(|&&id| self.entries.remove(&id).is_some())
            .count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
