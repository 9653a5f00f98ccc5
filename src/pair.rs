//! Immutable key/value record stored as the payload of each list node.

use std::sync::Arc;

/// A `(key, value)` pair. The key is what the index hashes; the value is
/// shared through an `Arc` so lookups hand out cheap clones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair<K, V> {
    key: K,
    value: Arc<V>,
}

impl<K, V> Pair<K, V> {
    pub fn new(key: K, value: Arc<V>) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &Arc<V> {
        &self.value
    }

    pub fn into_parts(self) -> (K, Arc<V>) {
        (self.key, self.value)
    }
}
