//! Store Handle Module
//!
//! Records whether the adapter owns its database or borrows the caller's.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use redb::Database;

// == Store Handle ==
/// A redb database handle tagged with its ownership.
///
/// Only an `Owned` handle may be released by the adapter.
pub(crate) enum StoreHandle {
    /// Opened by the adapter; closed when the adapter closes
    Owned(Database),
    /// Supplied by the caller, who stays responsible for closing it
    Borrowed(Arc<Database>),
}

impl StoreHandle {
    /// Returns true if closing the adapter releases this handle.
    pub(crate) fn is_owned(&self) -> bool {
        matches!(self, StoreHandle::Owned(_))
    }
}

impl Deref for StoreHandle {
    type Target = Database;

    fn deref(&self) -> &Database {
        match self {
            StoreHandle::Owned(db) => db,
            StoreHandle::Borrowed(db) => db,
        }
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreHandle::Owned(_) => f.write_str("StoreHandle::Owned"),
            StoreHandle::Borrowed(_) => f.write_str("StoreHandle::Borrowed"),
        }
    }
}
