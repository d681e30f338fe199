//! `flatvec` Configuration Module
//!
//! Provides configuration file support via `flatvec.toml`, environment variables,
//! and runtime overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Runtime overrides (CLI flags)
//! 2. Environment variables (`FLATVEC_*`, nested keys separated by `__`)
//! 3. Configuration file (`flatvec.toml`)
//! 4. Default values
//!
//! For example `FLATVEC_DISK__MIN_FREE_SPACE=2GB` overrides `disk.min_free_space`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::disk::parse_byte_size;
use crate::format::StoreFormat;

/// Environment variable prefix for all settings.
pub const ENV_PREFIX: &str = "FLATVEC_";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A byte size as it may appear in TOML or the environment.
///
/// The env provider turns `1048576` and `0.5` into numbers, so both numbers
/// and strings are accepted and kept as text for [`parse_byte_size`].
#[derive(Deserialize)]
#[serde(untagged)]
enum ByteSizeValue {
    Text(String),
    Bytes(u64),
    Fraction(f64),
}

impl From<ByteSizeValue> for String {
    fn from(value: ByteSizeValue) -> Self {
        match value {
            ByteSizeValue::Text(s) => s,
            ByteSizeValue::Bytes(n) => n.to_string(),
            ByteSizeValue::Fraction(f) => f.to_string(),
        }
    }
}

fn byte_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    ByteSizeValue::deserialize(deserializer).map(String::from)
}

fn optional_byte_size<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<ByteSizeValue>::deserialize(deserializer).map(|v| v.map(String::from))
}

/// Disk-space preflight section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    /// Hard limit below which writes are refused, e.g. `"512MB"`, `"0,5GB"`
    /// or a plain byte count. `None` = built-in default (512 MiB).
    #[serde(deserialize_with = "optional_byte_size")]
    pub min_free_space: Option<String>,
    /// Soft threshold below which a warning is logged, same syntax.
    #[serde(deserialize_with = "byte_size")]
    pub low_space_warning: String,
    /// Run the preflight before every write.
    pub preflight: bool,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            min_free_space: None,
            low_space_warning: "5GB".to_string(),
            preflight: true,
        }
    }
}

/// Store I/O section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Format used when it cannot be inferred from a file name.
    pub default_format: StoreFormat,
    /// Buffer size of each positioned-read cursor, in bytes.
    pub read_buffer_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_format: StoreFormat::Binary,
            read_buffer_size: crate::store::DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
    /// Include the module target in log lines.
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: false,
        }
    }
}

/// Main `flatvec` configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FlatvecConfig {
    /// Disk-space preflight configuration.
    pub disk: DiskConfig,
    /// Store I/O configuration.
    pub storage: StorageConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl FlatvecConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < file < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("flatvec.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// The disk hard limit is deliberately not validated here: a malformed
    /// value falls back to the default when the guard is built.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Err(e) = parse_byte_size(&self.disk.low_space_warning) {
            return Err(ConfigError::InvalidValue {
                key: "disk.low_space_warning".to_string(),
                message: e.to_string(),
            });
        }

        if !(512..=64 * 1024 * 1024).contains(&self.storage.read_buffer_size) {
            return Err(ConfigError::InvalidValue {
                key: "storage.read_buffer_size".to_string(),
                message: format!(
                    "value {} is out of range [512, 67108864]",
                    self.storage.read_buffer_size
                ),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
