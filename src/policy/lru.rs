//! # Least Recently Used (LRU) Cache Core
//!
//! Single-threaded storage strategy behind [`LruCache`](crate::LruCache):
//! one [`IntrusiveList`] holding the entries in recency order and one
//! `FxHashMap` from key to the entry's [`NodeHandle`].
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                           LruCore<K, V>                              │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  FxHashMap<K, NodeHandle>                                    │   │
//!   │   │    "a" ──────────────────────────────────────────┐           │   │
//!   │   │    "b" ────────────────────────────┐             │           │   │
//!   │   │    "c" ──────────────┐             │             │           │   │
//!   │   └──────────────────────┼─────────────┼─────────────┼───────────┘   │
//!   │                          ▼             ▼             ▼               │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  IntrusiveList<Pair<K, V>>                                   │   │
//!   │   │  [head] ◄──► [c, C] ◄──► [b, B] ◄──► [a, A] ◄──► [tail]      │   │
//!   │   │               MRU                     LRU                    │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The map and the list stay in bijection: a key is in the map iff a node
//! holding that key is linked. Map entries are created exactly when a node is
//! first linked and removed exactly when it is evicted.
//!
//! ## Operations
//!
//! | Method          | Complexity | Description                                |
//! |-----------------|------------|--------------------------------------------|
//! | `new(capacity)` | O(1)       | Fails on zero capacity                     |
//! | `lookup(&k)`    | O(1) avg   | Value + move to MRU                        |
//! | `insert(k, v)`  | O(1) avg   | Link at MRU, evict LRU when over capacity  |
//! | `peek(&k)`      | O(1) avg   | Value without touching recency             |
//! | `peek_lru()`    | O(1)       | Next eviction victim                       |
//! | `iter()`        | O(n)       | Entries from MRU to LRU                    |
//!
//! ## Existing keys
//!
//! Inserting a key that is already cached always refreshes its recency. What
//! happens to the stored value is an explicit [`ExistingKeyPolicy`]:
//! `Retain` (the default) keeps the first value, `Overwrite` replaces it.
//!
//! ## Thread Safety
//!
//! `LruCore` is **not** thread-safe. Callers sharing one across threads wrap
//! it in their own lock.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::{IntrusiveList, NodeHandle};
use crate::error::{CacheError, InvariantError, Result};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{CoreMetricsRecorder, MetricsSnapshotProvider};
use crate::pair::Pair;
use crate::traits::CacheStorage;

/// Capacity used by `Default` implementations.
pub const DEFAULT_CAPACITY: usize = 32;

/// Upper bound on the entries reserved at construction; larger caches grow
/// on demand.
const PREALLOC_LIMIT: usize = 4096;

/// What `insert` does with the value when the key is already cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExistingKeyPolicy {
    /// Refresh recency and keep the stored value; the new value is dropped.
    #[default]
    Retain,
    /// Refresh recency and replace the stored value.
    Overwrite,
}

pub struct LruCore<K, V> {
    list: IntrusiveList<Pair<K, V>>,
    index: FxHashMap<K, NodeHandle>,
    capacity: usize,
    policy: ExistingKeyPolicy,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty core holding at most `capacity` entries, retaining
    /// stored values on repeated inserts.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_policy(capacity, ExistingKeyPolicy::default())
    }

    /// Creates an empty core with an explicit [`ExistingKeyPolicy`].
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] if `capacity` is zero.
    pub fn with_policy(capacity: usize, policy: ExistingKeyPolicy) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::invalid(format!(
                "capacity should be greater than 0, but {capacity} provided"
            )));
        }
        debug!("creating LRU core: capacity={capacity}, policy={policy:?}");
        Ok(Self::build(capacity, policy))
    }

    fn build(capacity: usize, policy: ExistingKeyPolicy) -> Self {
        // One extra slot: an insert links before it evicts.
        let reserve = capacity.saturating_add(1).min(PREALLOC_LIMIT);
        Self {
            list: IntrusiveList::with_capacity(reserve),
            index: FxHashMap::with_capacity_and_hasher(reserve, Default::default()),
            capacity,
            policy,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        }
    }

    /// Returns the value for `key` and moves it to the MRU position.
    /// Never changes the size and never evicts.
    pub fn lookup(&mut self, key: &K) -> Result<Option<Arc<V>>> {
        let Some(&node) = self.index.get(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return Ok(None);
        };

        self.list.move_to_front(node)?;
        trace!("lookup hit moved entry to front: len={}", self.list.len());
        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();
        Ok(self.list.value(node).map(|pair| Arc::clone(pair.value())))
    }

    /// Inserts `value` under `key` at the MRU position and evicts the LRU
    /// entry if the cache is now over capacity. Returns `true` iff an entry
    /// was evicted. A key is never evicted by its own insert.
    pub fn insert(&mut self, key: K, value: V) -> Result<bool> {
        match self.index.get(&key).copied() {
            Some(node) => {
                self.refresh(node, key, value)?;
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_update();
            },
            None => {
                self.link_new(key, Arc::new(value))?;
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_new();
            },
        }

        if self.list.len() > self.capacity {
            self.evict_lru()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn refresh(&mut self, node: NodeHandle, key: K, value: V) -> Result<()> {
        match self.policy {
            ExistingKeyPolicy::Retain => {
                self.list.move_to_front(node)?;
            },
            ExistingKeyPolicy::Overwrite => {
                let node = self.list.unlink(node)?;
                self.list.discard(node)?;
                self.link_new(key, Arc::new(value))?;
            },
        }
        trace!("insert refreshed existing entry: policy={:?}", self.policy);
        Ok(())
    }

    fn link_new(&mut self, key: K, value: Arc<V>) -> Result<()> {
        let node = self.list.create_node(Pair::new(key.clone(), value));
        self.list.add_front(node)?;
        self.index.insert(key, node);
        Ok(())
    }

    fn evict_lru(&mut self) -> Result<()> {
        let node = self.list.remove_back()?;
        let (key, _) = self.list.discard(node)?.into_parts();
        self.index.remove(&key);
        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry();
        trace!(
            "evicted LRU entry: len={}, capacity={}",
            self.list.len(),
            self.capacity
        );
        Ok(())
    }

    /// Returns the value for `key` without changing recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let node = *self.index.get(key)?;
        self.list.value(node).map(|pair| pair.value().as_ref())
    }

    /// Returns `true` if `key` is cached. Does not change recency.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the entry that the next eviction would remove.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let node = self.list.back()?;
        self.list
            .value(node)
            .map(|pair| (pair.key(), pair.value().as_ref()))
    }

    /// Iterates entries from most to least recently used.
    ///
    /// An external snapshotter can persist this sequence and rebuild an
    /// equivalent cache by inserting it in reverse.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list
            .iter()
            .map(|pair| (pair.key(), pair.value().as_ref()))
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn existing_key_policy(&self) -> ExistingKeyPolicy {
        self.policy
    }

    /// Verifies the map/list bijection and the capacity bound.
    ///
    /// O(n); intended for tests and diagnostics.
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantError> {
        if self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "list holds {} entries, capacity is {}",
                self.list.len(),
                self.capacity
            )));
        }
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys, list holds {} nodes",
                self.index.len(),
                self.list.len()
            )));
        }
        for (node, pair) in self.list.iter_entries() {
            if self.index.get(pair.key()) != Some(&node) {
                return Err(InvariantError::new(
                    "linked node is not the one indexed under its key",
                ));
            }
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        self.snapshot()
    }
}

impl<K, V> CacheStorage<K, V> for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn current_size(&self) -> usize {
        self.len()
    }

    fn current_capacity(&self) -> usize {
        self.capacity
    }

    fn holds_key(&self, key: &K) -> bool {
        self.contains(key)
    }

    fn raw_lookup(&mut self, key: &K) -> Result<Option<Arc<V>>> {
        self.lookup(key)
    }

    fn raw_insert(&mut self, key: K, value: V) -> Result<bool> {
        self.insert(key, value)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCore<K, V> {
    fn snapshot(&self) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            insert_calls: self.metrics.insert_calls,
            insert_new: self.metrics.insert_new,
            insert_updates: self.metrics.insert_updates,
            evicted_entries: self.metrics.evicted_entries,
            cache_len: self.list.len(),
            capacity: self.capacity,
        }
    }
}

impl<K, V> Default for LruCore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::build(DEFAULT_CAPACITY, ExistingKeyPolicy::default())
    }
}

impl<K, V> fmt::Debug for LruCore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCore")
            .field("len", &self.list.len())
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .finish()
    }
}
