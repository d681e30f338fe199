//! Vector value types stored in a vector store.
//!
//! Only shape and construction live here. Vector algebra belongs to the
//! producers and consumers of a store, not to the store itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Number of bits in one binary vector word.
pub const BINARY_WORD_BITS: usize = 64;

/// Element type shared by every vector in a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorType {
    /// `dimension` f32 coordinates.
    #[default]
    Real,
    /// `dimension` complex coordinates, stored as interleaved (re, im) f32 pairs.
    Complex,
    /// `dimension` bits packed into u64 words; `dimension` is a multiple of 64.
    Binary,
}

impl VectorType {
    /// Name used in store headers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Complex => "complex",
            Self::Binary => "binary",
        }
    }

    /// Checks that `dimension` is usable with this type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVector`] for a zero dimension, or a binary
    /// dimension that is not a multiple of 64.
    pub fn validate_dimension(&self, dimension: usize) -> Result<()> {
        if dimension == 0 {
            return Err(Error::InvalidVector(
                "dimension must be a positive integer".to_string(),
            ));
        }
        if *self == Self::Binary && dimension % BINARY_WORD_BITS != 0 {
            return Err(Error::InvalidVector(format!(
                "binary dimension must be a multiple of {BINARY_WORD_BITS}, got {dimension}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for VectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VectorType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "real" => Ok(Self::Real),
            "complex" => Ok(Self::Complex),
            "binary" => Ok(Self::Binary),
            other => Err(Error::InvalidVector(format!("unknown vector type '{other}'"))),
        }
    }
}

/// A fixed-shape vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum Vector {
    /// Real coordinates.
    Real(Vec<f32>),
    /// Interleaved (re, im) pairs; always an even number of floats.
    Complex(Vec<f32>),
    /// Packed bits, bit `i` is `(words[i / 64] >> (i % 64)) & 1`.
    Binary(Vec<u64>),
}

impl Vector {
    /// Creates a zero vector of the given shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension is invalid for the type.
    pub fn zero(vector_type: VectorType, dimension: usize) -> Result<Self> {
        vector_type.validate_dimension(dimension)?;
        Ok(match vector_type {
            VectorType::Real => Self::Real(vec![0.0; dimension]),
            VectorType::Complex => Self::Complex(vec![0.0; dimension * 2]),
            VectorType::Binary => Self::Binary(vec![0; dimension / BINARY_WORD_BITS]),
        })
    }

    /// Creates a complex vector from interleaved (re, im) pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidVector`] if `interleaved` is empty or odd-length.
    pub fn complex(interleaved: Vec<f32>) -> Result<Self> {
        if interleaved.is_empty() || interleaved.len() % 2 != 0 {
            return Err(Error::InvalidVector(format!(
                "complex vector needs a non-empty even number of floats, got {}",
                interleaved.len()
            )));
        }
        Ok(Self::Complex(interleaved))
    }

    /// Returns the element type.
    #[must_use]
    pub const fn vector_type(&self) -> VectorType {
        match self {
            Self::Real(_) => VectorType::Real,
            Self::Complex(_) => VectorType::Complex,
            Self::Binary(_) => VectorType::Binary,
        }
    }

    /// Returns the logical dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        match self {
            Self::Real(values) => values.len(),
            Self::Complex(values) => values.len() / 2,
            Self::Binary(words) => words.len() * BINARY_WORD_BITS,
        }
    }

    /// Returns true if every coordinate (or bit) is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Real(values) | Self::Complex(values) => values.iter().all(|v| *v == 0.0),
            Self::Binary(words) => words.iter().all(|w| *w == 0),
        }
    }

    /// Returns the real coordinates, if this is a real vector.
    #[must_use]
    pub fn as_real(&self) -> Option<&[f32]> {
        match self {
            Self::Real(values) => Some(values),
            _ => None,
        }
    }
}

impl From<Vec<f32>> for Vector {
    fn from(values: Vec<f32>) -> Self {
        Self::Real(values)
    }
}
