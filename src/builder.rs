//! Cache builder.
//!
//! Collects the configuration of an [`LruCache`] and validates it once, at
//! build time.
//!
//! ## Example
//!
//! ```rust
//! use recency::builder::CacheBuilder;
//! use recency::ExistingKeyPolicy;
//!
//! let mut cache = CacheBuilder::new(100)
//!     .existing_key_policy(ExistingKeyPolicy::Overwrite)
//!     .try_build::<u64, String>()
//!     .unwrap();
//! cache.insert(1, "hello".to_string()).unwrap();
//! cache.insert(1, "world".to_string()).unwrap();
//! assert_eq!(cache.peek(&1), Some(&"world".to_string()));
//! ```

use std::hash::Hash;

use crate::contract::LruCache;
use crate::error::ConfigError;
use crate::policy::lru::{DEFAULT_CAPACITY, ExistingKeyPolicy};

/// Builder for [`LruCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheBuilder {
    capacity: usize,
    existing_key_policy: ExistingKeyPolicy,
}

impl CacheBuilder {
    /// Starts a builder for a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            existing_key_policy: ExistingKeyPolicy::default(),
        }
    }

    /// Sets what `insert` does with the value of a key that is already cached.
    pub fn existing_key_policy(mut self, policy: ExistingKeyPolicy) -> Self {
        self.existing_key_policy = policy;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Builds the cache.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if the capacity is zero.
    pub fn try_build<K, V>(self) -> Result<LruCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        if self.capacity == 0 {
            return Err(ConfigError::new("capacity must be greater than 0"));
        }
        LruCache::with_policy(self.capacity, self.existing_key_policy)
            .map_err(|err| ConfigError::new(err.to_string()))
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
