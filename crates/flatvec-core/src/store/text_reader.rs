//! Text vector store reader.
//!
//! Text stores carry no index: every enumeration re-opens the file and every
//! lookup is a linear scan.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::traits::{CloseableVectorStore, ObjectVectorPair, PairIter, VectorStore};
use crate::codec::{BigEndianCodec, VectorCodec};
use crate::error::{Error, Result};
use crate::format::{escape_identifier, TEXT_DELIMITER};
use crate::header::StoreHeader;
use crate::vector::Vector;

/// Read-only handle on a text store.
#[derive(Debug)]
pub struct TextVectorStoreReader {
    path: PathBuf,
    header: StoreHeader,
    codec: Arc<dyn VectorCodec>,
    closed: AtomicBool,
}

impl TextVectorStoreReader {
    /// Opens a text store and parses its header line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreNotFound`] if the file cannot be opened, or
    /// [`Error::MalformedHeader`] if the first line is not a header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_codec(path, Arc::new(BigEndianCodec))
    }

    /// Opens a text store with a custom codec.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn open_with_codec(path: impl AsRef<Path>, codec: Arc<dyn VectorCodec>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut lines = open_lines(&path)?;
        let line = lines
            .next()
            .transpose()?
            .ok_or_else(|| Error::MalformedHeader(format!("'{}' is empty", path.display())))?;
        let header = StoreHeader::parse(&line)?;

        Ok(Self {
            path,
            header,
            codec,
            closed: AtomicBool::new(false),
        })
    }

    /// Path of the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true after [`close`](CloseableVectorStore::close).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn records(&self) -> Result<TextEnumeration<'_>> {
        if self.is_closed() {
            return Err(Error::StoreClosed(self.path.clone()));
        }
        let mut lines = open_lines(&self.path)?;
        // Header was validated at open time.
        lines.next().transpose()?;
        Ok(TextEnumeration {
            lines,
            reader: self,
            done: false,
        })
    }

    fn parse_line(&self, line: &str) -> Result<ObjectVectorPair> {
        let (identifier, vector) = line.split_once(TEXT_DELIMITER).ok_or_else(|| {
            Error::InvalidVector(format!(
                "line without '{TEXT_DELIMITER}' delimiter in '{}'",
                self.path.display()
            ))
        })?;
        let vector =
            self.codec
                .decode_text(self.header.vector_type(), self.header.dimension(), vector)?;
        Ok(ObjectVectorPair {
            identifier: identifier.to_string(),
            vector,
        })
    }
}

impl VectorStore for TextVectorStoreReader {
    fn enumerate(&self) -> PairIter<'_> {
        match self.records() {
            Ok(records) => Box::new(records),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }
}

impl CloseableVectorStore for TextVectorStoreReader {
    fn header(&self) -> &StoreHeader {
        &self.header
    }

    fn lookup(&self, identifier: &str) -> Result<Option<Vector>> {
        let target = escape_identifier(identifier);
        for pair in self.records()? {
            let pair = pair?;
            if pair.identifier == target {
                return Ok(Some(pair.vector));
            }
        }
        debug!(identifier, store = %self.path.display(), "Identifier not found in text store");
        Ok(None)
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!(store = %self.path.display(), "Text vector store already closed");
        }
    }
}

fn open_lines(path: &Path) -> Result<Lines<BufReader<File>>> {
    let file = File::open(path).map_err(|e| Error::StoreNotFound {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(BufReader::new(file).lines())
}

struct TextEnumeration<'a> {
    lines: Lines<BufReader<File>>,
    reader: &'a TextVectorStoreReader,
    done: bool,
}

impl Iterator for TextEnumeration<'_> {
    type Item = Result<ObjectVectorPair>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let line = match self.lines.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                Some(Ok(line)) => line,
            };
            // Tolerate blank lines and a CRLF-terminated file.
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let pair = self.reader.parse_line(line);
            if pair.is_err() {
                self.done = true;
            }
            return Some(pair);
        }
    }
}
