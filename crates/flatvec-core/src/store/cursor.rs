//! Buffered positioned-read cursor over a shared store file.
//!
//! Each enumeration and each lookup owns one cursor. Cursors never move the
//! file's own seek position, so any number of them can share one
//! `Arc<File>` across threads without locking.

use std::fs::File;
use std::io::{self, Read};
use std::sync::Arc;

use crate::format::decode_vint;

/// Reads `buf.len()` bytes or fewer at `offset` without touching the file position.
#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::unix::fs::FileExt::read_at(file, buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::windows::fs::FileExt::seek_read(file, buf, offset)
}

/// Forward-moving reader at an explicit offset.
#[derive(Debug)]
pub(crate) struct RecordCursor {
    file: Arc<File>,
    len: u64,
    /// Logical position of the next byte handed out.
    pos: u64,
    buf: Vec<u8>,
    /// File offset of `buf[0]`.
    buf_start: u64,
    filled: usize,
}

impl RecordCursor {
    pub(crate) fn new(file: Arc<File>, len: u64, pos: u64, capacity: usize) -> Self {
        Self {
            file,
            len,
            pos,
            buf: vec![0; capacity.max(1)],
            buf_start: pos,
            filled: 0,
        }
    }

    pub(crate) const fn position(&self) -> u64 {
        self.pos
    }

    pub(crate) const fn is_at_end(&self) -> bool {
        self.pos >= self.len
    }

    pub(crate) fn seek(&mut self, pos: u64) {
        self.pos = pos;
    }

    /// Moves forward `n` bytes, failing if that passes the end of the file.
    pub(crate) fn skip(&mut self, n: u64) -> io::Result<()> {
        let target = self.pos.saturating_add(n);
        if target > self.len {
            return Err(unexpected_eof(self.pos, n));
        }
        self.pos = target;
        Ok(())
    }

    pub(crate) fn read_vint(&mut self) -> io::Result<u32> {
        decode_vint(|| {
            let mut byte = [0u8; 1];
            self.read_exact(&mut byte)?;
            Ok(byte[0])
        })
    }

    /// Reads a VInt-prefixed UTF-8 string.
    pub(crate) fn read_string(&mut self) -> io::Result<String> {
        let len = u64::from(self.read_vint()?);
        if len > self.len.saturating_sub(self.pos) {
            return Err(unexpected_eof(self.pos, len));
        }
        let mut bytes = vec![0u8; len as usize];
        self.read_exact(&mut bytes)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn buffered(&self) -> Option<&[u8]> {
        let end = self.buf_start + self.filled as u64;
        if self.pos >= self.buf_start && self.pos < end {
            let from = (self.pos - self.buf_start) as usize;
            Some(&self.buf[from..self.filled])
        } else {
            None
        }
    }

    fn refill(&mut self) -> io::Result<()> {
        self.buf_start = self.pos;
        self.filled = read_at(&self.file, &mut self.buf, self.pos)?;
        Ok(())
    }
}

impl Read for RecordCursor {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() || self.is_at_end() {
            return Ok(0);
        }
        if self.buffered().is_none() {
            // Large reads bypass the buffer.
            if out.len() >= self.buf.len() {
                let n = read_at(&self.file, out, self.pos)?;
                self.pos += n as u64;
                return Ok(n);
            }
            self.refill()?;
        }
        let available = self.buffered().unwrap_or_default();
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.pos += n as u64;
        Ok(n)
    }
}

fn unexpected_eof(pos: u64, wanted: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("record at offset {pos} needs {wanted} bytes past end of file"),
    )
}
