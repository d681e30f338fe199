//! # `flatvec` Core
//!
//! Flat-file vector store engine.
//!
//! A vector store is a file of `(identifier, vector)` records that share one
//! vector type and dimension. Stores are written once in a single pass and
//! then read by any number of threads without loading them into memory.
//!
//! ## Features
//!
//! - **Two formats**: compact binary records, or human-readable `id|vector` lines
//! - **Indexed lookups**: a sorted `.map` offset index enables binary search
//! - **Concurrent reads**: positioned reads, one cursor per enumeration or lookup
//! - **Disk preflight**: writes refuse to start on a nearly full filesystem
//! - **Cancellation**: long writes poll a shared flag between records
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flatvec_core::{
//!     CloseableVectorStore, InMemoryVectorStore, StoreHeader, Vector, VectorStoreReader,
//!     VectorStoreWriter, VectorType,
//! };
//!
//! # fn main() -> flatvec_core::Result<()> {
//! let header = StoreHeader::new(VectorType::Real, 3)?;
//! let mut vectors = InMemoryVectorStore::new(header.clone());
//! vectors.insert("apple", Vector::Real(vec![0.1, 0.2, 0.3]))?;
//!
//! VectorStoreWriter::new().write_binary("vectors.bin", &header, &vectors)?;
//!
//! let reader = VectorStoreReader::open("vectors.bin")?;
//! let apple = reader.lookup("apple")?;
//! reader.close();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
// =============================================================================
// NUMERIC CAST LINTS
// =============================================================================
// Offsets and lengths move between u64 (file positions) and usize (buffers).
// Every such cast is bounded by a file length checked beforehand.
// For new code: prefer try_from() where no bound has been checked.
// =============================================================================
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
// =============================================================================
// STYLISTIC LINTS - Safe to allow globally (no bug risk)
// =============================================================================
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::missing_errors_doc)]

pub mod codec;
#[cfg(test)]
mod codec_tests;
pub mod config;
#[cfg(test)]
mod config_tests;
pub mod disk;
pub mod error;
pub mod format;
#[cfg(test)]
mod format_tests;
pub mod header;
pub mod store;
pub mod vector;

pub use codec::{BigEndianCodec, VectorCodec};
pub use config::{ConfigError, DiskConfig, FlatvecConfig, LoggingConfig, StorageConfig};
pub use disk::{DiskSpace, DiskSpaceGuard, DiskStatus, FsSpaceProbe, SpaceProbe};
pub use error::{Error, Result};
pub use format::{escape_identifier, offset_index_path, StoreFormat};
pub use header::StoreHeader;
pub use store::{
    open_store, translate, CloseableVectorStore, InMemoryVectorStore, ObjectVectorPair,
    TextVectorStoreReader, VectorStore, VectorStoreReader, VectorStoreWriter, WriteSummary,
};
pub use vector::{Vector, VectorType};
