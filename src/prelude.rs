pub use crate::builder::CacheBuilder;
pub use crate::contract::{ContractCache, LruCache};
pub use crate::error::{CacheError, ConfigError, InvariantError, Result};
pub use crate::policy::lru::{DEFAULT_CAPACITY, ExistingKeyPolicy, LruCore};
pub use crate::traits::{Cache, CacheStorage};
