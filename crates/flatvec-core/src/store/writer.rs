//! Vector store writer.
//!
//! A write replaces whatever was at the target path: the store file and its
//! `.map` index are deleted first, then rewritten in one pass. The overwrite
//! is not atomic; a failed or cancelled write leaves a partial store behind
//! and no index.
//!
//! Binary writes record the offset of every identifier while streaming
//! records out, then sort the `(identifier, offset)` pairs and emit the
//! offsets as the `.map` index. Sorting is stable, so duplicate identifiers
//! keep their write order in the index.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use super::traits::VectorStore;
use crate::codec::{BigEndianCodec, VectorCodec};
use crate::config::FlatvecConfig;
use crate::disk::DiskSpaceGuard;
use crate::error::{Error, Result};
use crate::format::{escape_identifier, offset_index_path, write_string, StoreFormat, TEXT_DELIMITER};
use crate::header::StoreHeader;

/// Output buffer size for store files.
const WRITE_BUFFER_SIZE: usize = 256 * 1024;

/// Result of a completed write.
#[derive(Debug, Clone, Serialize)]
pub struct WriteSummary {
    /// Store file written.
    pub path: PathBuf,
    /// Encoding used.
    pub format: StoreFormat,
    /// Records written, duplicates included.
    pub records: usize,
    /// Size of the store file in bytes.
    pub bytes: u64,
    /// Entries in the `.map` index; zero for text stores.
    pub index_entries: usize,
    /// Wall time of the write, preflight included.
    pub elapsed: Duration,
}

/// Writes binary and text stores.
#[derive(Debug, Clone)]
pub struct VectorStoreWriter {
    codec: Arc<dyn VectorCodec>,
    disk_guard: Option<DiskSpaceGuard>,
}

impl Default for VectorStoreWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorStoreWriter {
    /// Creates a writer with the default codec and a disk guard configured
    /// from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            codec: Arc::new(BigEndianCodec),
            disk_guard: Some(DiskSpaceGuard::from_env()),
        }
    }

    /// Creates a writer from loaded configuration.
    #[must_use]
    pub fn from_config(config: &FlatvecConfig) -> Self {
        let disk_guard = config
            .disk
            .preflight
            .then(|| DiskSpaceGuard::from_config(&config.disk));
        Self {
            codec: Arc::new(BigEndianCodec),
            disk_guard,
        }
    }

    /// Replaces the codec.
    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn VectorCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Replaces the disk guard.
    #[must_use]
    pub fn with_disk_guard(mut self, guard: DiskSpaceGuard) -> Self {
        self.disk_guard = Some(guard);
        self
    }

    /// Disables the disk-space preflight.
    #[must_use]
    pub fn without_disk_guard(mut self) -> Self {
        self.disk_guard = None;
        self
    }

    /// Disk guard run before each write, if any.
    #[must_use]
    pub fn disk_guard(&self) -> Option<&DiskSpaceGuard> {
        self.disk_guard.as_ref()
    }

    /// Writes `store` to `path` in the given format.
    ///
    /// # Errors
    ///
    /// See [`write_binary_cancellable`](Self::write_binary_cancellable).
    pub fn write<S: VectorStore + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        format: StoreFormat,
        header: &StoreHeader,
        store: &S,
    ) -> Result<WriteSummary> {
        self.write_cancellable(path, format, header, store, &AtomicBool::new(false))
    }

    /// Writes `store` to `path` in the given format, polling `cancel` between records.
    ///
    /// # Errors
    ///
    /// See [`write_binary_cancellable`](Self::write_binary_cancellable).
    pub fn write_cancellable<S: VectorStore + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        format: StoreFormat,
        header: &StoreHeader,
        store: &S,
        cancel: &AtomicBool,
    ) -> Result<WriteSummary> {
        match format {
            StoreFormat::Binary => self.write_binary_cancellable(path, header, store, cancel),
            StoreFormat::Text => self.write_text_cancellable(path, header, store, cancel),
        }
    }

    /// Writes a binary store and its `.map` index.
    ///
    /// # Errors
    ///
    /// See [`write_binary_cancellable`](Self::write_binary_cancellable).
    pub fn write_binary<S: VectorStore + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        header: &StoreHeader,
        store: &S,
    ) -> Result<WriteSummary> {
        self.write_binary_cancellable(path, header, store, &AtomicBool::new(false))
    }

    /// Writes a binary store and its `.map` index, polling `cancel` before
    /// each record.
    ///
    /// # Errors
    ///
    /// - [`Error::InsufficientDiskSpace`] from the preflight; nothing is touched.
    /// - [`Error::WriteCancelled`] once `cancel` is observed set.
    /// - A mismatch error if a vector does not fit `header`.
    /// - Any I/O or enumeration error.
    pub fn write_binary_cancellable<S: VectorStore + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        header: &StoreHeader,
        store: &S,
        cancel: &AtomicBool,
    ) -> Result<WriteSummary> {
        let started = Instant::now();
        let path = path.as_ref();
        let index_path = offset_index_path(path);

        self.preflight(path)?;
        remove_if_exists(path)?;
        remove_if_exists(&index_path)?;

        let record_size = self
            .codec
            .record_byte_size(header.vector_type(), header.dimension())?;
        let mut out = BufWriter::with_capacity(WRITE_BUFFER_SIZE, File::create(path)?);
        let mut offset = write_string(&mut out, &header.generate())?;

        let mut entries: Vec<(String, u64)> = Vec::new();
        let mut record = Vec::with_capacity(record_size);
        for pair in store.enumerate() {
            if cancel.load(Ordering::Relaxed) {
                out.flush()?;
                return Err(cancelled(path, entries.len()));
            }
            let pair = pair?;
            header.check_vector(&pair.vector)?;
            record.clear();
            self.codec.encode(&pair.vector, &mut record)?;
            if record.len() != record_size {
                return Err(Error::InvalidVector(format!(
                    "codec produced {} bytes for '{}', expected {record_size}",
                    record.len(),
                    pair.identifier
                )));
            }

            let identifier_offset = offset;
            offset += write_string(&mut out, &pair.identifier)?;
            out.write_all(&record)?;
            offset += record.len() as u64;
            entries.push((pair.identifier, identifier_offset));
        }
        out.flush()?;

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let mut index_out = BufWriter::new(File::create(&index_path)?);
        for (_, identifier_offset) in &entries {
            index_out.write_all(&identifier_offset.to_be_bytes())?;
        }
        index_out.flush()?;

        let summary = WriteSummary {
            path: path.to_path_buf(),
            format: StoreFormat::Binary,
            records: entries.len(),
            bytes: offset,
            index_entries: entries.len(),
            elapsed: started.elapsed(),
        };
        log_summary(&summary);
        Ok(summary)
    }

    /// Writes a text store.
    ///
    /// # Errors
    ///
    /// See [`write_text_cancellable`](Self::write_text_cancellable).
    pub fn write_text<S: VectorStore + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        header: &StoreHeader,
        store: &S,
    ) -> Result<WriteSummary> {
        self.write_text_cancellable(path, header, store, &AtomicBool::new(false))
    }

    /// Writes a text store, polling `cancel` before each record.
    ///
    /// `|` inside identifiers is written as `;`. No index is produced.
    ///
    /// # Errors
    ///
    /// Same as [`write_binary_cancellable`](Self::write_binary_cancellable),
    /// plus [`Error::InvalidIdentifier`] for an identifier containing a line
    /// break. Records before it stay on disk.
    pub fn write_text_cancellable<S: VectorStore + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        header: &StoreHeader,
        store: &S,
        cancel: &AtomicBool,
    ) -> Result<WriteSummary> {
        let started = Instant::now();
        let path = path.as_ref();

        self.preflight(path)?;
        remove_if_exists(path)?;

        let mut out = BufWriter::with_capacity(WRITE_BUFFER_SIZE, File::create(path)?);
        let header_line = header.generate();
        writeln!(out, "{header_line}")?;
        let mut bytes = header_line.len() as u64 + 1;

        let mut records = 0;
        for pair in store.enumerate() {
            if cancel.load(Ordering::Relaxed) {
                out.flush()?;
                return Err(cancelled(path, records));
            }
            let pair = pair?;
            header.check_vector(&pair.vector)?;
            if pair.identifier.contains(['\n', '\r']) {
                out.flush()?;
                return Err(Error::InvalidIdentifier {
                    identifier: pair.identifier,
                    message: "line breaks cannot be stored in a text store".to_string(),
                });
            }
            let identifier = escape_identifier(&pair.identifier);
            let vector = self.codec.encode_text(&pair.vector);
            writeln!(out, "{identifier}{TEXT_DELIMITER}{vector}")?;
            bytes += (identifier.len() + TEXT_DELIMITER.len_utf8() + vector.len() + 1) as u64;
            records += 1;
        }
        out.flush()?;

        let summary = WriteSummary {
            path: path.to_path_buf(),
            format: StoreFormat::Text,
            records,
            bytes,
            index_entries: 0,
            elapsed: started.elapsed(),
        };
        log_summary(&summary);
        Ok(summary)
    }

    fn preflight(&self, path: &Path) -> Result<()> {
        if let Some(guard) = &self.disk_guard {
            guard.check(path)?;
        }
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed existing file before write");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn cancelled(path: &Path, records_written: usize) -> Error {
    info!(
        store = %path.display(),
        records_written,
        "Vector store write cancelled, partial output left on disk"
    );
    Error::WriteCancelled {
        path: path.to_path_buf(),
        records_written,
    }
}

fn log_summary(summary: &WriteSummary) {
    info!(
        store = %summary.path.display(),
        format = %summary.format,
        records = summary.records,
        bytes = summary.bytes,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "Finished writing vector store"
    );
}
