//! Cache Store Module
//!
//! The redb-backed cache adapter. Every get runs in its own read transaction
//! and every set or delete in its own write transaction; nothing is retried
//! outside a transaction.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadTransaction, TableDefinition, TableError, TableHandle, WriteTransaction};
use tracing::{debug, error, info, warn};

use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheBackend, CacheStats, StoreHandle};
use crate::config::CacheOptions;
use crate::error::{CacheError, Result};

/// Table layout for one namespace: string keys, opaque byte values.
type NamespaceTable<'a> = TableDefinition<'a, &'static str, &'static [u8]>;

// == Redb Cache ==
/// Persistent cache storing values in one redb table.
#[derive(Debug)]
pub struct RedbCache {
    /// Database handle, `None` once an owned handle is closed
    store: Option<StoreHandle>,
    /// Table name, validated non-empty
    namespace: String,
    /// Activity counters
    stats: StatsRecorder,
}

impl RedbCache {
    // == Constructors ==
    /// Opens or creates the database file at `path` and takes ownership of it.
    ///
    /// Construction is all-or-nothing: if the namespace cannot be created the
    /// database is closed again before the error is returned.
    ///
    /// # Arguments
    /// * `path` - Database file, created if absent
    /// * `options` - Cache options, validated before the file is touched
    pub fn open(path: impl AsRef<Path>, options: CacheOptions) -> Result<Self> {
        options.validate()?;

        let path = path.as_ref();
        let db = Database::create(path).map_err(|err| {
            warn!(path = %path.display(), error = %err, "failed to open cache store");
            CacheError::Construction(err.into())
        })?;

        let cache = Self::init(StoreHandle::Owned(db), options.namespace)?;
        info!(
            path = %path.display(),
            namespace = %cache.namespace,
            "opened cache store"
        );
        Ok(cache)
    }

    /// Opens `path` with the default namespace.
    pub fn open_default(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, CacheOptions::default())
    }

    /// Builds a cache over a database the caller already opened.
    ///
    /// The caller keeps responsibility for the database: [`RedbCache::close`]
    /// never releases it, and a failed construction leaves it open.
    ///
    /// # Arguments
    /// * `db` - An open database shared with the caller
    /// * `options` - Cache options, validated before the namespace is created
    pub fn with_store(db: Arc<Database>, options: CacheOptions) -> Result<Self> {
        options.validate()?;

        let cache = Self::init(StoreHandle::Borrowed(db), options.namespace)?;
        info!(namespace = %cache.namespace, "adopted cache store");
        Ok(cache)
    }

    /// Creates the namespace if absent. Dropping `store` on failure closes an
    /// owned database and only releases our reference to a borrowed one.
    fn init(store: StoreHandle, namespace: String) -> Result<Self> {
        if let Err(err) = create_namespace(&store, &namespace) {
            warn!(namespace = %namespace, error = %err, "namespace initialization failed");
            return Err(CacheError::Construction(err));
        }

        Ok(Self {
            store: Some(store),
            namespace,
            stats: StatsRecorder::default(),
        })
    }

    // == Get ==
    /// Retrieves a copy of the value stored at `key`.
    ///
    /// Returns `Ok(None)` when the key is absent. Errors only when the
    /// transaction fails or the namespace has disappeared.
    ///
    /// # Arguments
    /// * `key` - The cache key to look up
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let result = self.view(|txn| {
            let table = match txn.open_table(self.table()) {
                Ok(table) => table,
                Err(TableError::TableDoesNotExist(_)) => return Err(self.missing_namespace()),
                Err(err) => return Err(err.into()),
            };

            let value = table.get(key)?.map(|guard| guard.value().to_vec());
            Ok(value)
        });

        let value = self.observe("get", key, result)?;
        match &value {
            Some(bytes) => {
                self.stats.record_hit();
                debug!(namespace = %self.namespace, key, bytes = bytes.len(), "cache hit");
            }
            None => {
                self.stats.record_miss();
                debug!(namespace = %self.namespace, key, "cache miss");
            }
        }
        Ok(value)
    }

    // == Set ==
    /// Stores `value` at `key`, overwriting any previous value.
    ///
    /// The write is visible to readers only once its transaction commits.
    ///
    /// # Arguments
    /// * `key` - The cache key to store under
    /// * `value` - The bytes to store
    pub fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let result = self.update(|txn| {
            self.ensure_namespace(txn)?;
            let mut table = txn.open_table(self.table())?;
            table.insert(key, value)?;
            Ok(())
        });

        self.observe("set", key, result)?;
        self.stats.record_write();
        debug!(namespace = %self.namespace, key, bytes = value.len(), "cache set");
        Ok(())
    }

    // == Delete ==
    /// Removes `key`. Deleting an absent key is not an error.
    ///
    /// # Arguments
    /// * `key` - The cache key to remove
    pub fn delete(&self, key: &str) -> Result<()> {
        let result = self.update(|txn| {
            self.ensure_namespace(txn)?;
            let mut table = txn.open_table(self.table())?;
            let removed = table.remove(key)?.is_some();
            Ok(removed)
        });

        let removed = self.observe("delete", key, result)?;
        self.stats.record_delete();
        debug!(namespace = %self.namespace, key, removed, "cache delete");
        Ok(())
    }

    // == Close ==
    /// Releases the database if this cache owns it.
    ///
    /// A no-op for borrowed databases and for caches already closed.
    pub fn close(&mut self) -> Result<()> {
        match self.store.take() {
            Some(StoreHandle::Owned(db)) => {
                drop(db);
                info!(namespace = %self.namespace, "closed cache store");
            }
            Some(borrowed @ StoreHandle::Borrowed(_)) => {
                self.store = Some(borrowed);
                debug!(namespace = %self.namespace, "close skipped, store is borrowed");
            }
            None => {
                debug!(namespace = %self.namespace, "close skipped, store already closed");
            }
        }
        Ok(())
    }

    // == Accessors ==
    /// Returns the namespace (table) name.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns true if [`RedbCache::close`] releases the database.
    pub fn owns_store(&self) -> bool {
        self.store.as_ref().is_some_and(StoreHandle::is_owned)
    }

    /// Returns true once an owned database has been closed.
    pub fn is_closed(&self) -> bool {
        self.store.is_none()
    }

    /// Returns current activity statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Transaction Helpers ==
    fn table(&self) -> NamespaceTable<'_> {
        TableDefinition::new(&self.namespace)
    }

    fn database(&self) -> Result<&Database> {
        self.store.as_deref().ok_or(CacheError::Closed)
    }

    /// Runs `f` inside a read transaction.
    fn view<T>(&self, f: impl FnOnce(&ReadTransaction) -> Result<T>) -> Result<T> {
        let txn = self.database()?.begin_read()?;
        f(&txn)
    }

    /// Runs `f` inside a write transaction, committing on success and
    /// aborting on error.
    fn update<T>(&self, f: impl FnOnce(&WriteTransaction) -> Result<T>) -> Result<T> {
        let txn = self.database()?.begin_write()?;

        match f(&txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(abort_err) = txn.abort() {
                    warn!(
                        namespace = %self.namespace,
                        error = %abort_err,
                        "failed to abort write transaction"
                    );
                }
                Err(err)
            }
        }
    }

    /// Write transactions would silently recreate a dropped table, so the
    /// namespace is checked before it is opened.
    fn ensure_namespace(&self, txn: &WriteTransaction) -> Result<()> {
        let present = txn
            .list_tables()?
            .any(|table| table.name() == self.namespace);

        if present {
            Ok(())
        } else {
            Err(self.missing_namespace())
        }
    }

    fn missing_namespace(&self) -> CacheError {
        CacheError::NamespaceMissing(self.namespace.clone())
    }

    /// Logs and counts a failed operation.
    fn observe<T>(&self, op: &'static str, key: &str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.stats.record_failure();
            if err.is_integrity_violation() {
                error!(
                    namespace = %self.namespace,
                    op,
                    key,
                    error = %err,
                    "cache integrity violation"
                );
            } else {
                warn!(
                    namespace = %self.namespace,
                    op,
                    key,
                    error = %err,
                    "cache operation failed"
                );
            }
        }
        result
    }
}

/// Create-if-absent in a single write transaction.
fn create_namespace(db: &Database, namespace: &str) -> std::result::Result<(), redb::Error> {
    let txn = db.begin_write()?;
    txn.open_table(NamespaceTable::new(namespace))?;
    txn.commit()?;
    Ok(())
}

impl CacheBackend for RedbCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        RedbCache::get(self, key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        RedbCache::set(self, key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        RedbCache::delete(self, key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, RedbCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = RedbCache::open_default(dir.path().join("cache.redb")).unwrap();
        (dir, cache)
    }

    #[test]
    fn test_get_missing_key() {
        let (_dir, cache) = open_temp();

        assert_eq!(cache.get("test").unwrap(), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_set_and_get() {
        let (_dir, cache) = open_temp();

        cache.set("foo", b"bar").unwrap();

        assert_eq!(cache.get("foo").unwrap().as_deref(), Some(&b"bar"[..]));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().writes, 1);
    }

    #[test]
    fn test_set_overwrites() {
        let (_dir, cache) = open_temp();

        cache.set("foo", b"first").unwrap();
        cache.set("foo", b"second").unwrap();

        assert_eq!(cache.get("foo").unwrap(), Some(b"second".to_vec()));
    }

    #[test]
    fn test_delete() {
        let (_dir, cache) = open_temp();

        cache.set("foo", b"bar").unwrap();
        cache.delete("foo").unwrap();

        assert_eq!(cache.get("foo").unwrap(), None);
    }

    #[test]
    fn test_delete_missing_key_is_noop() {
        let (_dir, cache) = open_temp();

        cache.delete("never-set").unwrap();
        assert_eq!(cache.stats().failures, 0);
    }

    #[test]
    fn test_empty_key_and_value() {
        let (_dir, cache) = open_temp();

        cache.set("", b"").unwrap();
        assert_eq!(cache.get("").unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_empty_namespace_rejected_before_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.redb");

        let result = RedbCache::open(&path, CacheOptions::with_namespace(""));

        assert!(matches!(result, Err(CacheError::EmptyNamespaceName)));
        assert!(!path.exists());
    }

    #[test]
    fn test_open_directory_fails() {
        let dir = tempfile::tempdir().unwrap();

        let result = RedbCache::open_default(dir.path());
        assert!(matches!(result, Err(CacheError::Construction(_))));
    }

    #[test]
    fn test_owned_close() {
        let (_dir, mut cache) = open_temp();
        assert!(cache.owns_store());

        cache.close().unwrap();
        assert!(cache.is_closed());
        assert!(!cache.owns_store());

        // Idempotent
        cache.close().unwrap();

        assert!(matches!(cache.get("foo"), Err(CacheError::Closed)));
        assert!(matches!(cache.set("foo", b"bar"), Err(CacheError::Closed)));
        assert!(matches!(cache.delete("foo"), Err(CacheError::Closed)));
        assert_eq!(cache.stats().failures, 3);
    }

    #[test]
    fn test_borrowed_close_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::create(dir.path().join("cache.redb")).unwrap());

        let mut cache = RedbCache::with_store(Arc::clone(&db), CacheOptions::default()).unwrap();
        assert!(!cache.owns_store());

        cache.close().unwrap();
        assert!(!cache.is_closed());

        cache.set("foo", b"bar").unwrap();
        assert_eq!(cache.get("foo").unwrap(), Some(b"bar".to_vec()));
    }

    #[test]
    fn test_custom_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RedbCache::open(
            dir.path().join("cache.redb"),
            CacheOptions::with_namespace("responses"),
        )
        .unwrap();

        assert_eq!(cache.namespace(), "responses");
        cache.set("k", b"v").unwrap();
        assert_eq!(cache.get("k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_used_through_backend_trait() {
        let (_dir, cache) = open_temp();
        let backend: Arc<dyn CacheBackend> = Arc::new(cache);

        backend.set("foo", b"bar").unwrap();
        assert_eq!(backend.get("foo").unwrap(), Some(b"bar".to_vec()));
        backend.delete("foo").unwrap();
        assert_eq!(backend.get("foo").unwrap(), None);
    }
}
