//! Error types for the recency crate.
//!
//! ## Key Components
//!
//! - [`CacheError`]: Every failure reported by the list, the cache core and
//!   the contract wrapper. Its variants are the three error kinds callers can
//!   observe: invalid arguments, empty collections and invariant violations.
//! - [`InvariantError`]: Description of a contract check that failed. Wrapped
//!   in [`CacheError::InvariantViolation`]; seeing one means the storage
//!   strategy behind the wrapper is broken, not that the caller misused it.
//! - [`ConfigError`]: Returned by [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build)
//!   when configuration parameters are invalid (e.g. zero capacity).
//!
//! ## Example Usage
//!
//! ```
//! use recency::error::CacheError;
//! use recency::LruCache;
//!
//! let bad = LruCache::<u64, u64>::new(0);
//! assert!(matches!(bad, Err(CacheError::InvalidArgument(_))));
//! ```

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CacheError>;

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Failure reported synchronously to the caller of the operation that
/// detected it. Nothing is retried and nothing degrades silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Zero capacity, an absent value, a node handle from another list (or
    /// one that no longer resolves), or a node in the wrong link state.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `unlink`/`remove_back` on a list holding no elements.
    #[error("operation on an empty list")]
    EmptyCollection,

    /// A contract check failed after delegating to the storage strategy.
    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] InvariantError),
}

impl CacheError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Returns `true` for [`CacheError::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Returns `true` for [`CacheError::EmptyCollection`].
    pub fn is_empty_collection(&self) -> bool {
        matches!(self, Self::EmptyCollection)
    }

    /// Returns `true` for [`CacheError::InvariantViolation`].
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

impl From<ConfigError> for CacheError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidArgument(err.0)
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when a cache invariant is violated.
///
/// Produced by [`ContractCache`](crate::contract::ContractCache) when a
/// pre- or post-condition does not hold. Carries a human-readable description
/// of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// # Example
///
/// ```
/// use recency::builder::CacheBuilder;
///
/// let err = CacheBuilder::new(0).try_build::<u64, u64>().unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
