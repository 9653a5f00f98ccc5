//! # Cache Traits
//!
//! Two seams separate *what is checked* from *how entries are stored*:
//!
//! ```text
//!   caller
//!     │  Cache<K, V>            lookup / insert, Result-returning
//!     ▼
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ ContractCache<K, V, S>                                       │
//!   │   pre:  0 <= size <= capacity                                │
//!   │   post: capacity unchanged, size delta matches eviction flag │
//!   │         (refreshing a held key leaves size as is)            │
//!   └──────────────────────────────┬───────────────────────────────┘
//!                                  │  CacheStorage<K, V>
//!                                  ▼
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ S: current_size / current_capacity / holds_key               │
//!   │    raw_lookup / raw_insert                                   │
//!   │    (LruCore, or any other storage strategy)                  │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Trait Summary
//!
//! | Trait                | Implemented by    | Purpose                               |
//! |----------------------|-------------------|---------------------------------------|
//! | `Cache`              | `ContractCache`   | Public lookup/insert surface          |
//! | `CacheStorage`       | `LruCore`         | Minimal capability set to be checked  |
//!
//! Any type implementing [`CacheStorage`] can sit behind the wrapper without
//! changing the contract callers rely on.

use std::sync::Arc;

use crate::error::Result;

/// Lookup/insert surface exposed to callers.
///
/// # Example
///
/// ```
/// use recency::traits::Cache;
/// use recency::LruCache;
///
/// fn warm<C: Cache<u64, String>>(cache: &mut C, data: &[(u64, &str)]) -> recency::Result<()> {
///     for (key, value) in data {
///         cache.insert(*key, value.to_string())?;
///     }
///     Ok(())
/// }
///
/// let mut cache = LruCache::new(8).unwrap();
/// warm(&mut cache, &[(1, "one"), (2, "two")]).unwrap();
/// assert_eq!(cache.lookup(&1).unwrap().as_deref(), Some(&"one".to_string()));
/// ```
pub trait Cache<K, V> {
    /// Returns the value for `key` and marks it most recently used.
    fn lookup(&mut self, key: &K) -> Result<Option<Arc<V>>>;

    /// Inserts `value` under `key`. Returns `true` iff another entry was
    /// evicted to make room.
    fn insert(&mut self, key: K, value: V) -> Result<bool>;
}

/// Capability set a storage strategy provides to the contract wrapper.
///
/// Implementations do the storage work only; the wrapper performs every
/// size/capacity check around them.
pub trait CacheStorage<K, V> {
    /// Number of entries currently held.
    fn current_size(&self) -> usize;

    /// Maximum number of entries; fixed for the lifetime of the storage.
    fn current_capacity(&self) -> usize;

    /// Whether `key` is currently stored. Must not touch recency.
    fn holds_key(&self, key: &K) -> bool;

    /// Looks up `key`, refreshing its recency on a hit. Must not change the
    /// size or evict.
    fn raw_lookup(&mut self, key: &K) -> Result<Option<Arc<V>>>;

    /// Stores `value` under `key`, evicting if needed. Returns `true` iff an
    /// eviction happened. A key that is already held is refreshed in place
    /// and never causes an eviction.
    fn raw_insert(&mut self, key: K, value: V) -> Result<bool>;
}
