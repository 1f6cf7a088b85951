//! redb HTTP cache - a persistent cache backend for HTTP response caching
//!
//! Stores serialized responses in one table of a single-file redb database.
//! Every read and write runs in its own store transaction.
//!
//! ```no_run
//! use redb_httpcache::{CacheOptions, RedbCache};
//!
//! # fn main() -> redb_httpcache::Result<()> {
//! let mut cache = RedbCache::open("responses.redb", CacheOptions::default())?;
//! cache.set("GET https://example.com/", b"HTTP/1.1 200 OK\r\n\r\n")?;
//! assert!(cache.get("GET https://example.com/")?.is_some());
//! cache.close()?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheBackend, CacheStats, RedbCache, DEFAULT_NAMESPACE};
pub use config::CacheOptions;
pub use error::{CacheError, Result};
