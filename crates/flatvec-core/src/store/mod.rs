//! Vector stores: readers, writer and the in-memory store.
//!
//! # Public Types
//!
//! - [`VectorStore`], [`CloseableVectorStore`]: store traits
//! - [`VectorStoreReader`]: binary store reader with offset-index lookups
//! - [`TextVectorStoreReader`]: text store reader
//! - [`InMemoryVectorStore`]: insertion-ordered in-memory store
//! - [`VectorStoreWriter`]: binary and text writer with disk preflight
//! - [`open_store`], [`translate`]: format-agnostic helpers

mod cursor;
mod memory;
mod reader;
mod text_reader;
mod traits;
mod translate;
mod writer;

#[cfg(test)]
mod memory_tests;
#[cfg(test)]
mod text_reader_tests;

pub use memory::InMemoryVectorStore;
pub use reader::{VectorStoreReader, DEFAULT_READ_BUFFER_SIZE};
pub use text_reader::TextVectorStoreReader;
pub use traits::{CloseableVectorStore, ObjectVectorPair, PairIter, VectorStore};
pub use translate::{open_store, translate};
pub use writer::{VectorStoreWriter, WriteSummary};
