//! Invariant-checking wrapper around a [`CacheStorage`] strategy.
//!
//! `ContractCache` owns a storage strategy and checks its size/capacity
//! contract around every call, in every build profile:
//!
//! ```text
//!   lookup(k)                          insert(k, v)
//!   ─────────                          ────────────
//!   pre:  size <= capacity             pre:  size <= capacity
//!   call: raw_lookup(k)                      v is present
//!   post: capacity unchanged                 held = holds_key(k)
//!         size unchanged               call: evicted = raw_insert(k, v)
//!                                      post: capacity unchanged
//!                                            held     => !evicted, size unchanged
//!                                            evicted  => size unchanged
//!                                            otherwise   size + 1
//!                                            size <= capacity
//! ```
//!
//! A failed check is logged and reported as
//! [`CacheError::InvariantViolation`]. It signals a bug in the storage
//! strategy, never caller misuse. The wrapper is poisoned from then on: every
//! later `lookup` or `insert` returns the same violation without touching the
//! storage.

use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use log::error;

use crate::error::{CacheError, InvariantError, Result};
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
use crate::policy::lru::{ExistingKeyPolicy, LruCore};
use crate::traits::{Cache, CacheStorage};

/// Cache front-end that enforces the size/capacity contract of `S`.
#[derive(Debug)]
pub struct ContractCache<K, V, S> {
    storage: S,
    poisoned: Option<InvariantError>,
    _marker: PhantomData<fn(K) -> V>,
}

/// The LRU cache: [`LruCore`] storage behind the contract checks.
pub type LruCache<K, V> = ContractCache<K, V, LruCore<K, V>>;

impl<K, V, S> ContractCache<K, V, S>
where
    S: CacheStorage<K, V>,
{
    /// Wraps an existing storage strategy.
    pub fn from_storage(storage: S) -> Self {
        Self {
            storage,
            poisoned: None,
            _marker: PhantomData,
        }
    }

    /// Read access to the wrapped storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Unwraps the storage strategy.
    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn len(&self) -> usize {
        self.storage.current_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.storage.current_capacity()
    }

    /// Returns `true` once a contract check has failed.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.is_some()
    }

    /// Returns the value for `key`, marking it most recently used.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvariantViolation`] if the storage changed its size or
    /// capacity during the lookup, or if an earlier call already failed a
    /// check.
    pub fn lookup(&mut self, key: &K) -> Result<Option<Arc<V>>> {
        self.check_poisoned()?;
        let outcome = self.checked_lookup(key);
        self.poison_on_violation(outcome)
    }

    fn checked_lookup(&mut self, key: &K) -> Result<Option<Arc<V>>> {
        let (size, capacity) = self.check_bounds("before lookup")?;

        let found = self.storage.raw_lookup(key)?;

        self.check_capacity_unchanged(capacity, "lookup")?;
        let after = self.storage.current_size();
        ensure(after == size, || {
            format!("lookup changed size from {size} to {after}")
        })?;
        Ok(found)
    }

    /// Inserts `value` under `key`. Returns `true` iff an entry was evicted.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvariantViolation`] if the size delta does not match the
    /// eviction flag, a bound is broken, or the wrapper is already poisoned.
    /// Storage errors pass through.
    pub fn insert(&mut self, key: K, value: V) -> Result<bool> {
        self.insert_nullable(key, Some(value))
    }

    /// Like [`insert`](Self::insert), for values whose absence is
    /// representable at the call site (deserialized or foreign data).
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] if `value` is `None`; the cache is left
    /// untouched. Otherwise as [`insert`](Self::insert).
    pub fn insert_nullable(&mut self, key: K, value: Option<V>) -> Result<bool> {
        self.check_poisoned()?;
        let outcome = self.checked_insert(key, value);
        self.poison_on_violation(outcome)
    }

    fn checked_insert(&mut self, key: K, value: Option<V>) -> Result<bool> {
        let (old_size, capacity) = self.check_bounds("before insert")?;
        let value = value.ok_or_else(|| CacheError::invalid("value should not be null"))?;
        let held = self.storage.holds_key(&key);

        let evicted = self.storage.raw_insert(key, value)?;

        let size = self.storage.current_size();
        if held {
            ensure(!evicted, || "refreshing a held key evicted an entry".to_string())?;
            ensure(size == old_size, || {
                format!("refreshing a held key moved size from {old_size} to {size}")
            })?;
        } else if evicted {
            ensure(size == old_size, || {
                format!("insert evicted but size moved from {old_size} to {size}")
            })?;
        } else {
            ensure(old_size.checked_add(1) == Some(size), || {
                format!("insert without eviction moved size from {old_size} to {size}")
            })?;
        }
        self.check_capacity_unchanged(capacity, "insert")?;
        self.check_bounds("after insert")?;
        Ok(evicted)
    }

    fn check_poisoned(&self) -> Result<()> {
        match &self.poisoned {
            Some(err) => Err(err.clone().into()),
            None => Ok(()),
        }
    }

    fn poison_on_violation<T>(&mut self, outcome: Result<T>) -> Result<T> {
        if let Err(CacheError::InvariantViolation(err)) = &outcome {
            self.poisoned = Some(err.clone());
        }
        outcome
    }

    fn check_bounds(&self, stage: &str) -> Result<(usize, usize)> {
        let size = self.storage.current_size();
        let capacity = self.storage.current_capacity();
        ensure(size <= capacity, || {
            format!("{stage}: size {size} exceeds capacity {capacity}")
        })?;
        Ok((size, capacity))
    }

    fn check_capacity_unchanged(&self, capacity: usize, op: &str) -> Result<()> {
        let now = self.storage.current_capacity();
        ensure(now == capacity, || {
            format!("{op} changed capacity from {capacity} to {now}")
        })
    }
}

fn ensure(holds: bool, describe: impl FnOnce() -> String) -> Result<()> {
    if holds {
        return Ok(());
    }
    let msg = describe();
    error!("cache contract violated: {msg}");
    Err(InvariantError::new(msg).into())
}

impl<K, V> ContractCache<K, V, LruCore<K, V>>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidArgument`] if `capacity` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use recency::LruCache;
    ///
    /// let mut cache = LruCache::new(2).unwrap();
    /// cache.insert("a", 1).unwrap();
    /// cache.insert("b", 2).unwrap();
    /// cache.lookup(&"a").unwrap();
    ///
    /// // "b" is now least recently used
    /// assert!(cache.insert("c", 3).unwrap());
    /// assert!(cache.contains(&"a"));
    /// assert!(!cache.contains(&"b"));
    /// ```
    pub fn new(capacity: usize) -> Result<Self> {
        LruCore::new(capacity).map(Self::from_storage)
    }

    /// Creates an LRU cache with an explicit [`ExistingKeyPolicy`].
    pub fn with_policy(capacity: usize, policy: ExistingKeyPolicy) -> Result<Self> {
        LruCore::with_policy(capacity, policy).map(Self::from_storage)
    }

    /// Returns the value for `key` without changing recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.storage.peek(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.storage.contains(key)
    }

    /// Entry the next eviction would remove.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.storage.peek_lru()
    }

    /// Entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.storage.iter()
    }

    pub fn existing_key_policy(&self) -> ExistingKeyPolicy {
        self.storage.existing_key_policy()
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        self.storage.metrics_snapshot()
    }
}

impl<K, V> Default for ContractCache<K, V, LruCore<K, V>>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::from_storage(LruCore::default())
    }
}

impl<K, V, S> Cache<K, V> for ContractCache<K, V, S>
where
    S: CacheStorage<K, V>,
{
    fn lookup(&mut self, key: &K) -> Result<Option<Arc<V>>> {
        ContractCache::lookup(self, key)
    }

    fn insert(&mut self, key: K, value: V) -> Result<bool> {
        ContractCache::insert(self, key, value)
    }
}
