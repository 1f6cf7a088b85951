//! Cache Backend Trait
//!
//! The storage contract an HTTP caching layer programs against.

use std::sync::Arc;

use crate::error::Result;

/// Byte-oriented cache keyed by the HTTP cache key string.
///
/// Implementations must be safe to share across threads.
pub trait CacheBackend: Send + Sync {
    /// Returns a copy of the value stored at `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` at `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    fn delete(&self, key: &str) -> Result<()>;
}

impl<T: CacheBackend + ?Sized> CacheBackend for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}
