//! Fixed-size record encoding for vectors.
//!
//! A codec turns one vector into exactly [`VectorCodec::record_byte_size`]
//! bytes and back. Record size depends only on `(vector_type, dimension)`, so
//! the binary format carries no per-record length prefix.

use std::fmt::{self, Write as _};

use crate::error::{Error, Result};
use crate::vector::{Vector, VectorType, BINARY_WORD_BITS};

/// Encodes and decodes single vectors.
pub trait VectorCodec: Send + Sync + fmt::Debug {
    /// Bytes occupied by one encoded vector of the given shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimension is invalid for the type.
    fn record_byte_size(&self, vector_type: VectorType, dimension: usize) -> Result<usize>;

    /// Appends the binary record for `vector` to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vector cannot be encoded.
    fn encode(&self, vector: &Vector, out: &mut Vec<u8>) -> Result<()>;

    /// Decodes one record of exactly `record_byte_size` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` has the wrong length.
    fn decode(&self, vector_type: VectorType, dimension: usize, bytes: &[u8]) -> Result<Vector>;

    /// Renders a vector for the text format. Must never contain `|` or a newline.
    fn encode_text(&self, vector: &Vector) -> String;

    /// Parses the text rendering of a vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not describe a vector of this shape.
    fn decode_text(&self, vector_type: VectorType, dimension: usize, text: &str)
        -> Result<Vector>;
}

/// Default codec: big-endian f32 coordinates and big-endian u64 bit words.
#[derive(Debug, Default, Clone, Copy)]
pub struct BigEndianCodec;

impl VectorCodec for BigEndianCodec {
    fn record_byte_size(&self, vector_type: VectorType, dimension: usize) -> Result<usize> {
        vector_type.validate_dimension(dimension)?;
        Ok(match vector_type {
            VectorType::Real => dimension * 4,
            VectorType::Complex => dimension * 8,
            VectorType::Binary => dimension / 8,
        })
    }

    fn encode(&self, vector: &Vector, out: &mut Vec<u8>) -> Result<()> {
        match vector {
            Vector::Real(values) | Vector::Complex(values) => {
                out.reserve(values.len() * 4);
                for v in values {
                    out.extend_from_slice(&v.to_be_bytes());
                }
            }
            Vector::Binary(words) => {
                out.reserve(words.len() * 8);
                for w in words {
                    out.extend_from_slice(&w.to_be_bytes());
                }
            }
        }
        Ok(())
    }

    fn decode(&self, vector_type: VectorType, dimension: usize, bytes: &[u8]) -> Result<Vector> {
        let expected = self.record_byte_size(vector_type, dimension)?;
        if bytes.len() != expected {
            return Err(Error::InvalidVector(format!(
                "record is {} bytes, expected {expected}",
                bytes.len()
            )));
        }
        Ok(match vector_type {
            VectorType::Real => Vector::Real(decode_floats(bytes)),
            VectorType::Complex => Vector::Complex(decode_floats(bytes)),
            VectorType::Binary => Vector::Binary(
                bytes
                    .chunks_exact(8)
                    .map(|c| u64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                    .collect(),
            ),
        })
    }

    fn encode_text(&self, vector: &Vector) -> String {
        match vector {
            Vector::Real(values) | Vector::Complex(values) => {
                let mut out = String::with_capacity(values.len() * 10);
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    let _ = write!(out, "{v}");
                }
                out
            }
            Vector::Binary(words) => {
                let dimension = words.len() * BINARY_WORD_BITS;
                (0..dimension)
                    .map(|i| {
                        if (words[i / BINARY_WORD_BITS] >> (i % BINARY_WORD_BITS)) & 1 == 1 {
                            '1'
                        } else {
                            '0'
                        }
                    })
                    .collect()
            }
        }
    }

    fn decode_text(
        &self,
        vector_type: VectorType,
        dimension: usize,
        text: &str,
    ) -> Result<Vector> {
        vector_type.validate_dimension(dimension)?;
        match vector_type {
            VectorType::Real | VectorType::Complex => {
                let values = text
                    .split_whitespace()
                    .map(|t| {
                        t.parse::<f32>()
                            .map_err(|e| Error::InvalidVector(format!("bad coordinate '{t}': {e}")))
                    })
                    .collect::<Result<Vec<f32>>>()?;
                let expected = if vector_type == VectorType::Complex {
                    dimension * 2
                } else {
                    dimension
                };
                if values.len() != expected {
                    return Err(Error::InvalidVector(format!(
                        "expected {expected} coordinates, got {}",
                        values.len()
                    )));
                }
                Ok(if vector_type == VectorType::Complex {
                    Vector::Complex(values)
                } else {
                    Vector::Real(values)
                })
            }
            VectorType::Binary => {
                let bits = text.trim();
                if bits.len() != dimension {
                    return Err(Error::InvalidVector(format!(
                        "expected {dimension} bits, got {}",
                        bits.len()
                    )));
                }
                let mut words = vec![0u64; dimension / BINARY_WORD_BITS];
                for (i, c) in bits.bytes().enumerate() {
                    match c {
                        b'0' => {}
                        b'1' => words[i / BINARY_WORD_BITS] |= 1 << (i % BINARY_WORD_BITS),
                        other => {
                            return Err(Error::InvalidVector(format!(
                                "bad bit '{}' at position {i}",
                                char::from(other)
                            )))
                        }
                    }
                }
                Ok(Vector::Binary(words))
            }
        }
    }
}

fn decode_floats(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
