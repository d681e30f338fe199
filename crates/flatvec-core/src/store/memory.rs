//! In-memory vector store.

use indexmap::IndexMap;

use super::traits::{ObjectVectorPair, PairIter, VectorStore};
use crate::error::Result;
use crate::header::StoreHeader;
use crate::vector::Vector;

/// Insertion-ordered store with unique identifiers.
///
/// Every vector shares the header's type and dimension. Enumeration order is
/// insertion order, so writing this store to disk preserves it.
#[derive(Debug, Clone)]
pub struct InMemoryVectorStore {
    header: StoreHeader,
    vectors: IndexMap<String, Vector>,
}

impl InMemoryVectorStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(header: StoreHeader) -> Self {
        Self {
            header,
            vectors: IndexMap::new(),
        }
    }

    /// Copies every record of `source` into memory.
    ///
    /// A later duplicate identifier overwrites the earlier vector in place.
    ///
    /// # Errors
    ///
    /// Returns the first enumeration error, or a shape mismatch against `header`.
    pub fn load<S: VectorStore + ?Sized>(header: StoreHeader, source: &S) -> Result<Self> {
        let mut store = Self::new(header);
        for pair in source.enumerate() {
            let pair = pair?;
            store.insert(pair.identifier, pair.vector)?;
        }
        Ok(store)
    }

    /// Header shared by every vector.
    #[must_use]
    pub fn header(&self) -> &StoreHeader {
        &self.header
    }

    /// Inserts or replaces a vector, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns a mismatch error if `vector` does not fit the header.
    pub fn insert(&mut self, identifier: impl Into<String>, vector: Vector) -> Result<Option<Vector>> {
        self.header.check_vector(&vector)?;
        Ok(self.vectors.insert(identifier.into(), vector))
    }

    /// Returns the vector stored under `identifier`.
    #[must_use]
    pub fn get(&self, identifier: &str) -> Option<&Vector> {
        self.vectors.get(identifier)
    }

    /// Removes a vector, keeping the order of the remaining ones.
    pub fn remove(&mut self, identifier: &str) -> Option<Vector> {
        self.vectors.shift_remove(identifier)
    }

    /// Number of vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Returns true if the store holds no vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl VectorStore for InMemoryVectorStore {
    fn enumerate(&self) -> PairIter<'_> {
        Box::new(
            self.vectors
                .iter()
                .map(|(identifier, vector)| Ok(ObjectVectorPair::new(identifier.clone(), vector.clone()))),
        )
    }

    fn count(&self) -> Result<usize> {
        Ok(self.len())
    }
}
