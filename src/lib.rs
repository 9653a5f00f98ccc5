//! recency: a fixed-capacity LRU cache built on an arena-backed intrusive
//! list, with size/capacity contract checks around every call.
//!
//! ```text
//!   caller ─► ContractCache ─► LruCore ─► IntrusiveList ─► SlotArena
//! ```
//!
//! ```
//! use recency::LruCache;
//!
//! let mut cache = LruCache::new(2).unwrap();
//! cache.insert(1, "one").unwrap();
//! assert_eq!(cache.lookup(&1).unwrap().as_deref(), Some(&"one"));
//! assert_eq!(cache.lookup(&2).unwrap(), None);
//! ```

pub mod builder;
pub mod contract;
pub mod ds;
pub mod error;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod pair;
pub mod policy;
pub mod prelude;
pub mod traits;

pub use crate::contract::{ContractCache, LruCache};
pub use crate::ds::{IntrusiveList, ListId, NodeHandle, SlotArena, SlotId};
pub use crate::error::{CacheError, Result};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::LruMetricsSnapshot;
pub use crate::policy::lru::{DEFAULT_CAPACITY, ExistingKeyPolicy, LruCore};
