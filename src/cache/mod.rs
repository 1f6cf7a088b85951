//! Cache Module
//!
//! Provides a persistent cache backed by a single-file redb database.

mod backend;
mod handle;
mod stats;
mod store;


// Re-export public types
pub use backend::CacheBackend;
pub(crate) use handle::StoreHandle;
pub use stats::CacheStats;
pub use store::RedbCache;

// == Public Constants ==
/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "httpcache";
