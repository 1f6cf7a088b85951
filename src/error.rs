//! Error types for the cache adapter
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache adapter.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Configured namespace name is empty
    #[error("namespace name must not be empty")]
    EmptyNamespaceName,

    /// Store open or namespace initialization failed
    #[error("failed to construct cache: {0}")]
    Construction(#[source] redb::Error),

    /// Namespace vanished after initialization
    #[error("namespace {0:?} is missing from the store")]
    NamespaceMissing(String),

    /// Store failure inside a get, set or delete transaction
    #[error("transaction failed: {0}")]
    Transaction(#[from] redb::Error),

    /// Owned store handle was already closed
    #[error("cache store is closed")]
    Closed,
}

impl CacheError {
    /// Returns true for failures that indicate a broken adapter invariant
    /// rather than an environmental problem.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, CacheError::NamespaceMissing(_))
    }

    /// Returns true for errors raised while building the adapter.
    pub fn is_construction_failure(&self) -> bool {
        matches!(
            self,
            CacheError::Construction(_) | CacheError::EmptyNamespaceName
        )
    }
}

// == redb Conversions ==
impl From<redb::TransactionError> for CacheError {
    fn from(err: redb::TransactionError) -> Self {
        CacheError::Transaction(err.into())
    }
}

impl From<redb::TableError> for CacheError {
    fn from(err: redb::TableError) -> Self {
        CacheError::Transaction(err.into())
    }
}

impl From<redb::StorageError> for CacheError {
    fn from(err: redb::StorageError) -> Self {
        CacheError::Transaction(err.into())
    }
}

impl From<redb::CommitError> for CacheError {
    fn from(err: redb::CommitError) -> Self {
        CacheError::Transaction(err.into())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache adapter.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_violation_classification() {
        assert!(CacheError::NamespaceMissing("httpcache".into()).is_integrity_violation());
        assert!(!CacheError::Closed.is_integrity_violation());
        assert!(!CacheError::EmptyNamespaceName.is_integrity_violation());
    }

    #[test]
    fn test_construction_failure_classification() {
        assert!(CacheError::EmptyNamespaceName.is_construction_failure());
        let storage = redb::StorageError::Io(std::io::Error::other("disk gone"));
        assert!(CacheError::Construction(storage.into()).is_construction_failure());
        assert!(!CacheError::Closed.is_construction_failure());
    }

    #[test]
    fn test_storage_error_maps_to_transaction() {
        let err: CacheError = redb::StorageError::Io(std::io::Error::other("boom")).into();
        assert!(matches!(err, CacheError::Transaction(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CacheError::EmptyNamespaceName.to_string(),
            "namespace name must not be empty"
        );
        assert_eq!(
            CacheError::NamespaceMissing("pages".into()).to_string(),
            "namespace \"pages\" is missing from the store"
        );
    }
}
