//! Binary vector store reader.
//!
//! Opening a store reads only the header. Records are streamed on demand
//! through positioned reads over one shared file handle:
//!
//! - [`enumerate`](VectorStore::enumerate) walks records from just past the
//!   header, one independent cursor per call.
//! - [`lookup`](CloseableVectorStore::lookup) binary-searches the memory-mapped
//!   `.map` offset index when one was present at open time, and falls back to
//!   a linear scan otherwise.
//!
//! Nothing on the read path takes a lock beyond cloning the handle `Arc`, so
//! a reader can be shared across threads as-is.

use std::cmp::Ordering;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use memmap2::Mmap;
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::cursor::RecordCursor;
use super::traits::{CloseableVectorStore, ObjectVectorPair, PairIter, VectorStore};
use crate::codec::{BigEndianCodec, VectorCodec};
use crate::error::{Error, Result};
use crate::format::{offset_index_path, OFFSET_ENTRY_SIZE};
use crate::header::StoreHeader;
use crate::vector::Vector;

/// Default buffer size of an enumeration cursor.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Buffer size of the binary-search probe cursor. Identifiers are short, so
/// one probe rarely needs more than a single read.
const PROBE_BUFFER_SIZE: usize = 256;

/// Memory-mapped `.map` file: big-endian record offsets sorted by identifier.
struct OffsetIndex {
    /// `None` for an empty index (zero-length files cannot be mapped).
    mmap: Option<Mmap>,
    entries: usize,
}

impl OffsetIndex {
    /// Maps the index next to `store`, if there is one.
    fn open(store: &Path) -> Result<Option<Self>> {
        let path = offset_index_path(store);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let len = file.metadata()?.len();
        if len % OFFSET_ENTRY_SIZE as u64 != 0 {
            warn!(
                index = %path.display(),
                len,
                "Offset index length is not a multiple of 8, ignoring trailing bytes"
            );
        }
        let entries = (len / OFFSET_ENTRY_SIZE as u64) as usize;
        if entries == 0 {
            return Ok(Some(Self {
                mmap: None,
                entries: 0,
            }));
        }

        // SAFETY: the index is written once by the store writer and never
        // modified in place; a rewrite deletes and recreates the file, which
        // leaves this mapping pointing at the old inode.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Some(Self {
            mmap: Some(mmap),
            entries,
        }))
    }

    fn len(&self) -> usize {
        self.entries
    }

    fn offset(&self, i: usize) -> u64 {
        let Some(mmap) = &self.mmap else {
            return 0;
        };
        let start = i * OFFSET_ENTRY_SIZE;
        let mut bytes = [0u8; OFFSET_ENTRY_SIZE];
        bytes.copy_from_slice(&mmap[start..start + OFFSET_ENTRY_SIZE]);
        u64::from_be_bytes(bytes)
    }
}

/// Read-only handle on a binary store.
pub struct VectorStoreReader {
    path: PathBuf,
    header: StoreHeader,
    record_size: usize,
    /// Offset of the first record, just past the header.
    data_start: u64,
    file_len: u64,
    buffer_size: usize,
    codec: Arc<dyn VectorCodec>,
    /// `None` once closed.
    file: RwLock<Option<Arc<File>>>,
    offset_index: RwLock<Option<Arc<OffsetIndex>>>,
}

impl fmt::Debug for VectorStoreReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorStoreReader")
            .field("path", &self.path)
            .field("header", &self.header)
            .field("record_size", &self.record_size)
            .field("closed", &self.is_closed())
            .field("has_offset_index", &self.has_offset_index())
            .finish_non_exhaustive()
    }
}

impl VectorStoreReader {
    /// Opens a binary store with the default codec.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreNotFound`] if the file cannot be opened, or
    /// [`Error::MalformedHeader`] if the header record is unreadable.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_codec(path, Arc::new(BigEndianCodec))
    }

    /// Opens a binary store with a custom codec.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn open_with_codec(path: impl AsRef<Path>, codec: Arc<dyn VectorCodec>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| Error::StoreNotFound {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let file_len = file.metadata()?.len();
        let file = Arc::new(file);

        let mut cursor = RecordCursor::new(Arc::clone(&file), file_len, 0, PROBE_BUFFER_SIZE);
        let line = cursor.read_string().map_err(|e| {
            Error::MalformedHeader(format!("cannot read header of '{}': {e}", path.display()))
        })?;
        let header = StoreHeader::parse(&line)?;
        let record_size = codec.record_byte_size(header.vector_type(), header.dimension())?;
        let data_start = cursor.position();

        let offset_index = OffsetIndex::open(&path)?.map(Arc::new);
        debug!(
            store = %path.display(),
            header = %header,
            indexed = offset_index.is_some(),
            "Opened vector store"
        );

        Ok(Self {
            path,
            header,
            record_size,
            data_start,
            file_len,
            buffer_size: DEFAULT_READ_BUFFER_SIZE,
            codec,
            file: RwLock::new(Some(file)),
            offset_index: RwLock::new(offset_index),
        })
    }

    /// Sets the buffer size of enumeration and scan cursors.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Path of the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes per encoded vector.
    #[must_use]
    pub const fn record_byte_size(&self) -> usize {
        self.record_size
    }

    /// Returns true if an offset index was found at open time and the
    /// reader is still open.
    #[must_use]
    pub fn has_offset_index(&self) -> bool {
        self.offset_index.read().is_some()
    }

    /// Returns true after [`close`](CloseableVectorStore::close).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.file.read().is_none()
    }

    /// Finds `identifier` by scanning every record, ignoring any index.
    ///
    /// Vector payloads of non-matching records are skipped, not decoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreClosed`] after close, or an I/O error on a
    /// truncated or unreadable record.
    pub fn scan_for(&self, identifier: &str) -> Result<Option<Vector>> {
        let mut cursor = self.cursor(self.buffer_size)?;
        while !cursor.is_at_end() {
            let id = cursor.read_string()?;
            if id == identifier {
                return self.read_vector(&mut cursor).map(Some);
            }
            cursor.skip(self.record_size as u64)?;
        }
        debug!(identifier, store = %self.path.display(), "Identifier not found by scan");
        Ok(None)
    }

    fn binary_search(&self, index: &OffsetIndex, identifier: &str) -> Result<Option<Vector>> {
        let mut cursor = self.cursor(PROBE_BUFFER_SIZE)?;
        let mut low = 0;
        let mut high = index.len();

        while low < high {
            let mid = low + (high - low) / 2;
            let offset = index.offset(mid);
            cursor.seek(offset);
            let probed = match cursor.read_string() {
                Ok(id) => id,
                Err(e) => {
                    warn!(
                        store = %self.path.display(),
                        offset,
                        "Failed to read identifier during index lookup: {e}"
                    );
                    return Ok(None);
                }
            };
            match probed.as_str().cmp(identifier) {
                Ordering::Less => low = mid + 1,
                Ordering::Greater => high = mid,
                Ordering::Equal => {
                    return match self.read_vector(&mut cursor) {
                        Ok(vector) => Ok(Some(vector)),
                        Err(e) => {
                            warn!(
                                store = %self.path.display(),
                                identifier,
                                "Failed to read vector during index lookup: {e}"
                            );
                            Ok(None)
                        }
                    };
                }
            }
        }
        debug!(identifier, store = %self.path.display(), "Identifier not in offset index");
        Ok(None)
    }

    fn read_vector(&self, cursor: &mut RecordCursor) -> Result<Vector> {
        let mut bytes = vec![0u8; self.record_size];
        cursor.read_exact(&mut bytes)?;
        self.codec
            .decode(self.header.vector_type(), self.header.dimension(), &bytes)
    }

    fn file_handle(&self) -> Result<Arc<File>> {
        self.file
            .read()
            .clone()
            .ok_or_else(|| Error::StoreClosed(self.path.clone()))
    }

    fn cursor(&self, capacity: usize) -> Result<RecordCursor> {
        Ok(RecordCursor::new(
            self.file_handle()?,
            self.file_len,
            self.data_start,
            capacity,
        ))
    }
}

impl VectorStore for VectorStoreReader {
    fn enumerate(&self) -> PairIter<'_> {
        match self.cursor(self.buffer_size) {
            Ok(cursor) => Box::new(VectorEnumeration {
                cursor,
                reader: self,
                done: false,
            }),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }
}

impl CloseableVectorStore for VectorStoreReader {
    fn header(&self) -> &StoreHeader {
        &self.header
    }

    fn lookup(&self, identifier: &str) -> Result<Option<Vector>> {
        let index = self.offset_index.read().clone();
        match index {
            Some(index) => self.binary_search(&index, identifier),
            None => self.scan_for(identifier),
        }
    }

    fn close(&self) {
        let file = self.file.write().take();
        let index = self.offset_index.write().take();
        if file.is_none() && index.is_none() {
            debug!(store = %self.path.display(), "Vector store already closed");
            return;
        }
        debug!(store = %self.path.display(), "Closed vector store");
    }
}

/// One pass over a binary store's records.
///
/// Fuses after the first error: a truncated record ends the enumeration.
struct VectorEnumeration<'a> {
    cursor: RecordCursor,
    reader: &'a VectorStoreReader,
    done: bool,
}

impl VectorEnumeration<'_> {
    fn read_pair(&mut self) -> Result<ObjectVectorPair> {
        let identifier = self.cursor.read_string()?;
        let vector = self.reader.read_vector(&mut self.cursor)?;
        Ok(ObjectVectorPair { identifier, vector })
    }
}

impl Iterator for VectorEnumeration<'_> {
    type Item = Result<ObjectVectorPair>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cursor.is_at_end() {
            self.done = true;
            return None;
        }
        let pair = self.read_pair();
        if pair.is_err() {
            self.done = true;
        }
        Some(pair)
    }
}
