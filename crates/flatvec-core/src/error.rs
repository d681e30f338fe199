//! Error types for `flatvec`.
//!
//! A single error enum covers the read path, the write path and the disk-space
//! preflight, so callers can match on one type regardless of store format.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for `flatvec` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `flatvec` operations.
///
/// Error codes follow the pattern `FLATVEC-XXX` for easy debugging.
#[derive(Error, Debug)]
pub enum Error {
    /// Store file missing or unreadable (FLATVEC-001).
    #[error("[FLATVEC-001] Vector store '{}' not found: {reason}", path.display())]
    StoreNotFound {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying OS message.
        reason: String,
    },

    /// Header record missing mandatory fields or unparsable (FLATVEC-002).
    #[error("[FLATVEC-002] Malformed store header: {0}")]
    MalformedHeader(String),

    /// Disk-space preflight failed (FLATVEC-003).
    #[error(
        "[FLATVEC-003] Insufficient disk space at '{}': {available} bytes available, at least {required} required",
        path.display()
    )]
    InsufficientDiskSpace {
        /// Location that was checked.
        path: PathBuf,
        /// Bytes available to this process.
        available: u64,
        /// Configured hard limit in bytes.
        required: u64,
    },

    /// Cooperative cancellation was observed mid-write (FLATVEC-004).
    ///
    /// Partial output may remain on disk.
    #[error("[FLATVEC-004] Write to '{}' cancelled after {records_written} records", path.display())]
    WriteCancelled {
        /// Store being written.
        path: PathBuf,
        /// Records fully written before cancellation.
        records_written: usize,
    },

    /// IO error (FLATVEC-005).
    #[error("[FLATVEC-005] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Reader used after `close()` (FLATVEC-006).
    #[error("[FLATVEC-006] Vector store '{}' is closed", .0.display())]
    StoreClosed(PathBuf),

    /// Vector dimension does not match the store header (FLATVEC-007).
    #[error("[FLATVEC-007] Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension declared by the header.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },

    /// Vector type does not match the store header (FLATVEC-008).
    #[error("[FLATVEC-008] Vector type mismatch: expected {expected}, got {actual}")]
    VectorTypeMismatch {
        /// Type declared by the header.
        expected: String,
        /// Type of the offending vector.
        actual: String,
    },

    /// Invalid vector shape or encoding (FLATVEC-009).
    #[error("[FLATVEC-009] Invalid vector: {0}")]
    InvalidVector(String),

    /// Header option rejected while building a header (FLATVEC-010).
    #[error("[FLATVEC-010] Invalid header option '{key}': {message}")]
    InvalidHeaderOption {
        /// Option key.
        key: String,
        /// Why it was rejected.
        message: String,
    },

    /// Configuration error (FLATVEC-011).
    #[error("[FLATVEC-011] Configuration error: {0}")]
    Config(String),

    /// Translation input and output resolve to the same file (FLATVEC-012).
    #[error("[FLATVEC-012] Cannot translate '{}' onto itself", .0.display())]
    SameSourceAndTarget(PathBuf),

    /// Identifier cannot be stored in the target format (FLATVEC-013).
    #[error("[FLATVEC-013] Invalid identifier {identifier:?}: {message}")]
    InvalidIdentifier {
        /// Offending identifier.
        identifier: String,
        /// Why it was rejected.
        message: String,
    },
}

impl Error {
    /// Returns the error code (e.g., "FLATVEC-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::StoreNotFound { .. } => "FLATVEC-001",
            Self::MalformedHeader(_) => "FLATVEC-002",
            Self::InsufficientDiskSpace { .. } => "FLATVEC-003",
            Self::WriteCancelled { .. } => "FLATVEC-004",
            Self::Io(_) => "FLATVEC-005",
            Self::StoreClosed(_) => "FLATVEC-006",
            Self::DimensionMismatch { .. } => "FLATVEC-007",
            Self::VectorTypeMismatch { .. } => "FLATVEC-008",
            Self::InvalidVector(_) => "FLATVEC-009",
            Self::InvalidHeaderOption { .. } => "FLATVEC-010",
            Self::Config(_) => "FLATVEC-011",
            Self::SameSourceAndTarget(_) => "FLATVEC-012",
            Self::InvalidIdentifier { .. } => "FLATVEC-013",
        }
    }

    /// Returns true if retrying the operation could succeed.
    ///
    /// Malformed data and closed stores never recover on their own.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::MalformedHeader(_)
                | Self::StoreClosed(_)
                | Self::InvalidVector(_)
                | Self::SameSourceAndTarget(_)
                | Self::InvalidIdentifier { .. }
        )
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
