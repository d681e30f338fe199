//! Store traits shared by the on-disk readers and the in-memory store.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::header::StoreHeader;
use crate::vector::Vector;

/// One record of a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectVectorPair {
    /// Record key; not necessarily unique within a store.
    pub identifier: String,
    /// Record vector.
    pub vector: Vector,
}

impl ObjectVectorPair {
    /// Creates a pair.
    pub fn new(identifier: impl Into<String>, vector: Vector) -> Self {
        Self {
            identifier: identifier.into(),
            vector,
        }
    }
}

/// Boxed enumeration of a store's records.
pub type PairIter<'a> = Box<dyn Iterator<Item = Result<ObjectVectorPair>> + 'a>;

/// A re-enumerable sequence of records.
///
/// Every call to [`enumerate`](Self::enumerate) starts from the first record,
/// and independent enumerations do not affect each other.
pub trait VectorStore {
    /// Returns a fresh enumeration of all records in store order.
    fn enumerate(&self) -> PairIter<'_>;

    /// Counts records by exhausting one enumeration. O(n), not cached.
    ///
    /// # Errors
    ///
    /// Returns the first error met while enumerating.
    fn count(&self) -> Result<usize> {
        let mut n = 0;
        for pair in self.enumerate() {
            pair?;
            n += 1;
        }
        Ok(n)
    }
}

/// A store opened from disk: keyed lookup plus an explicit close.
pub trait CloseableVectorStore: VectorStore + Send + Sync {
    /// Header read at open time.
    fn header(&self) -> &StoreHeader;

    /// Finds the vector stored under `identifier`.
    ///
    /// With duplicate identifiers, returns the first match on the path used.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is closed or cannot be read.
    fn lookup(&self, identifier: &str) -> Result<Option<Vector>>;

    /// Returns true if `identifier` has a record.
    ///
    /// # Errors
    ///
    /// Same as [`lookup`](Self::lookup).
    fn contains(&self, identifier: &str) -> Result<bool> {
        Ok(self.lookup(identifier)?.is_some())
    }

    /// Releases file handles. Idempotent; failures are logged, not returned.
    fn close(&self);
}

impl VectorStore for [ObjectVectorPair] {
    fn enumerate(&self) -> PairIter<'_> {
        Box::new(self.iter().cloned().map(Ok))
    }

    fn count(&self) -> Result<usize> {
        Ok(self.len())
    }
}

impl VectorStore for Vec<ObjectVectorPair> {
    fn enumerate(&self) -> PairIter<'_> {
        self.as_slice().enumerate()
    }

    fn count(&self) -> Result<usize> {
        Ok(self.len())
    }
}

impl<S: VectorStore + ?Sized> VectorStore for Box<S> {
    fn enumerate(&self) -> PairIter<'_> {
        (**self).enumerate()
    }

    fn count(&self) -> Result<usize> {
        (**self).count()
    }
}
