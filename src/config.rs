//! Configuration Module
//!
//! Construction-time options for the cache adapter, loadable from the
//! environment or deserialized as part of a larger application config.

use std::env;

use serde::Deserialize;

use crate::cache::DEFAULT_NAMESPACE;
use crate::error::{CacheError, Result};

/// Environment variable overriding the namespace name.
pub const NAMESPACE_ENV: &str = "HTTPCACHE_NAMESPACE";

/// Cache adapter options.
///
/// Validated once at construction; an adapter never observes an invalid set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Name of the table holding cached entries
    pub namespace: String,
}

impl CacheOptions {
    /// Creates options using the given namespace.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Creates options from environment variables.
    ///
    /// # Environment Variables
    /// - `HTTPCACHE_NAMESPACE` - Namespace name (default when unset: `httpcache`)
    ///
    /// A variable set to the empty string is kept as-is, so building a cache
    /// from these options fails with [`CacheError::EmptyNamespaceName`].
    pub fn from_env() -> Self {
        let namespace =
            env::var(NAMESPACE_ENV).unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string());

        Self { namespace }
    }

    /// Checks the options before any store is touched.
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(CacheError::EmptyNamespaceName);
        }
        Ok(())
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}
