//! Disk-space preflight for store writes.
//!
//! A store is written in one pass whose final size is not known up front, so
//! writers check once, before touching any existing file, that the target
//! filesystem is not nearly full.
//!
//! - Below the hard limit (default 512 MiB): the write is refused.
//! - Below the soft limit (default 5 GiB): a warning is logged.
//!
//! The check is advisory: nothing is reserved and nothing is re-checked while
//! the write runs.
//!
//! The hard limit comes from `FLATVEC_DISK__MIN_FREE_SPACE` or
//! `disk.min_free_space` in `flatvec.toml`, e.g. `"0.5GB"`, `"500mb"`,
//! `"1,5GB"` or a plain byte count.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::config::{ConfigError, DiskConfig};
use crate::error::{Error, Result};

/// Default hard limit: 512 MiB.
pub const DEFAULT_HARD_LIMIT: u64 = 512 * 1024 * 1024;

/// Default soft limit: 5 GiB.
pub const DEFAULT_SOFT_LIMIT: u64 = 5 * 1024 * 1024 * 1024;

/// Environment variable holding the hard limit.
pub const MIN_FREE_SPACE_ENV: &str = "FLATVEC_DISK__MIN_FREE_SPACE";

const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Parses a byte size such as `"100gb"`, `"10.5MB"`, `"0,5 GB"` or `"1048576"`.
///
/// Suffixes are case-insensitive; `,` and `.` are both accepted as the
/// decimal separator. Fractional byte counts are truncated.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if the value is blank, negative or
/// not a number.
pub fn parse_byte_size(value: &str) -> std::result::Result<u64, ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidValue {
        key: "byte size".to_string(),
        message: format!("'{value}' {message}; supported formats: 0.5GB, 500MB, 536870912"),
    };

    let lower = value.trim().to_ascii_lowercase();
    let (number, multiplier) = if let Some(n) = lower.strip_suffix("gb") {
        (n, GIB)
    } else if let Some(n) = lower.strip_suffix("mb") {
        (n, MIB)
    } else {
        (lower.as_str(), 1.0)
    };

    let number = number.trim().replace(',', ".");
    if number.is_empty() {
        return Err(invalid("is empty"));
    }
    let parsed: f64 = number.parse().map_err(|_| invalid("is not a number"))?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(invalid("must be a non-negative number"));
    }
    Ok((parsed * multiplier) as u64)
}

/// Resolves a configured hard limit, falling back to the default.
///
/// A missing or blank value yields [`DEFAULT_HARD_LIMIT`] silently; a
/// malformed one yields the default with a warning.
#[must_use]
pub fn resolve_hard_limit(value: Option<&str>) -> u64 {
    match value.map(str::trim) {
        None | Some("") => DEFAULT_HARD_LIMIT,
        Some(raw) => parse_byte_size(raw).unwrap_or_else(|e| {
            warn!(
                value = raw,
                default = DEFAULT_HARD_LIMIT,
                "Invalid minimal free disk space setting, using default: {e}"
            );
            DEFAULT_HARD_LIMIT
        }),
    }
}

/// Space figures for one filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskSpace {
    /// Bytes available to this process.
    pub available: u64,
    /// Bytes free on the filesystem.
    pub free: u64,
}

impl DiskSpace {
    /// The figure the limits are compared against.
    #[must_use]
    pub fn usable(&self) -> u64 {
        self.available.min(self.free)
    }
}

/// Source of disk-space figures.
pub trait SpaceProbe: Send + Sync + fmt::Debug {
    /// Reports space on the filesystem containing `path` (which exists).
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the filesystem cannot be queried.
    fn probe(&self, path: &Path) -> io::Result<DiskSpace>;
}

/// Probe backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSpaceProbe;

impl SpaceProbe for FsSpaceProbe {
    fn probe(&self, path: &Path) -> io::Result<DiskSpace> {
        Ok(DiskSpace {
            available: fs2::available_space(path)?,
            free: fs2::free_space(path)?,
        })
    }
}

/// Outcome of a passing preflight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskStatus {
    /// Above the soft limit.
    Healthy {
        /// Usable bytes.
        usable: u64,
    },
    /// Between the hard and soft limits; a warning was logged.
    Low {
        /// Usable bytes.
        usable: u64,
    },
}

/// Disk-space preflight with explicit limits.
#[derive(Debug, Clone)]
pub struct DiskSpaceGuard {
    hard_limit: u64,
    soft_limit: u64,
    probe: Arc<dyn SpaceProbe>,
}

impl Default for DiskSpaceGuard {
    fn default() -> Self {
        Self::with_limits(DEFAULT_HARD_LIMIT, DEFAULT_SOFT_LIMIT)
    }
}

impl DiskSpaceGuard {
    /// Creates a guard with explicit limits and the OS probe.
    #[must_use]
    pub fn with_limits(hard_limit: u64, soft_limit: u64) -> Self {
        Self {
            hard_limit,
            soft_limit,
            probe: Arc::new(FsSpaceProbe),
        }
    }

    /// Creates a guard whose hard limit comes from [`MIN_FREE_SPACE_ENV`].
    ///
    /// The variable is read once, here; build the guard once and reuse it.
    #[must_use]
    pub fn from_env() -> Self {
        let value = std::env::var(MIN_FREE_SPACE_ENV).ok();
        Self::with_limits(resolve_hard_limit(value.as_deref()), DEFAULT_SOFT_LIMIT)
    }

    /// Creates a guard from the `[disk]` configuration section.
    #[must_use]
    pub fn from_config(config: &DiskConfig) -> Self {
        let soft_limit = parse_byte_size(&config.low_space_warning).unwrap_or_else(|e| {
            warn!("Invalid low disk space warning threshold, using default: {e}");
            DEFAULT_SOFT_LIMIT
        });
        Self::with_limits(
            resolve_hard_limit(config.min_free_space.as_deref()),
            soft_limit,
        )
    }

    /// Replaces the space probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn SpaceProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Hard limit in bytes.
    #[must_use]
    pub const fn hard_limit(&self) -> u64 {
        self.hard_limit
    }

    /// Soft limit in bytes.
    #[must_use]
    pub const fn soft_limit(&self) -> u64 {
        self.soft_limit
    }

    /// Checks the filesystem that would hold `path`.
    ///
    /// `path` need not exist; its nearest existing ancestor is probed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientDiskSpace`] below the hard limit, or an
    /// I/O error if the filesystem cannot be queried.
    pub fn check(&self, path: &Path) -> Result<DiskStatus> {
        let location = existing_ancestor(path);
        let usable = self.probe.probe(&location)?.usable();

        if usable < self.hard_limit {
            return Err(Error::InsufficientDiskSpace {
                path: location,
                available: usable,
                required: self.hard_limit,
            });
        }
        if usable < self.soft_limit {
            warn!(
                location = %location.display(),
                remaining_bytes = usable,
                "Location is running out of disk space"
            );
            return Ok(DiskStatus::Low { usable });
        }
        Ok(DiskStatus::Healthy { usable })
    }
}

fn existing_ancestor(path: &Path) -> PathBuf {
    path.ancestors()
        .find(|p| !p.as_os_str().is_empty() && p.exists())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
