//! Store header: the first record of every store.
//!
//! The header is a single flag-style line, e.g.
//! `-vectortype real -dimension 200 -seedlength 10`, readable by humans and
//! parsed back losslessly. Vector type and dimension are mandatory because the
//! record size of every following vector is derived from them.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::vector::{Vector, VectorType};

const VECTOR_TYPE_FLAG: &str = "vectortype";
const DIMENSION_FLAG: &str = "dimension";

/// Value recorded for a flag given without a value.
const FLAG_PRESENT: &str = "true";

/// Parsed store header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHeader {
    vector_type: VectorType,
    dimension: usize,
    /// Extra writer-declared options, in declaration order.
    options: Vec<(String, String)>,
}

impl StoreHeader {
    /// Creates a header with no extra options.
    ///
    /// # Errors
    ///
    /// Returns an error if `dimension` is invalid for `vector_type`.
    pub fn new(vector_type: VectorType, dimension: usize) -> Result<Self> {
        vector_type.validate_dimension(dimension)?;
        Ok(Self {
            vector_type,
            dimension,
            options: Vec::new(),
        })
    }

    /// Adds an extra option, replacing any previous value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeaderOption`] if the key is reserved, empty or
    /// not a valid flag name, or the value contains whitespace.
    pub fn with_option(mut self, key: &str, value: &str) -> Result<Self> {
        validate_option(key, value)?;
        if let Some(slot) = self.options.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value.to_string();
        } else {
            self.options.push((key.to_string(), value.to_string()));
        }
        Ok(self)
    }

    /// Vector type of every record.
    #[must_use]
    pub const fn vector_type(&self) -> VectorType {
        self.vector_type
    }

    /// Dimension of every record.
    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Looks up an extra option.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Extra options in declaration order.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Renders the header line.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut line = format!(
            "-{VECTOR_TYPE_FLAG} {} -{DIMENSION_FLAG} {}",
            self.vector_type, self.dimension
        );
        for (key, value) in &self.options {
            line.push_str(" -");
            line.push_str(key);
            line.push(' ');
            line.push_str(value);
        }
        line
    }

    /// Parses a header line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedHeader`] if vector type or dimension is
    /// missing, either is invalid, a token is not a flag where one is
    /// expected, or a flag is repeated.
    pub fn parse(line: &str) -> Result<Self> {
        let mut vector_type = None;
        let mut dimension = None;
        let mut options: Vec<(String, String)> = Vec::new();

        let mut tokens = line.split_whitespace().peekable();
        while let Some(token) = tokens.next() {
            let Some(key) = flag_name(token) else {
                return Err(Error::MalformedHeader(format!(
                    "expected a flag, found '{token}' in '{line}'"
                )));
            };
            let value = match tokens.peek() {
                Some(next) if flag_name(next).is_none() => tokens.next().unwrap_or(FLAG_PRESENT),
                _ => FLAG_PRESENT,
            };

            match key {
                VECTOR_TYPE_FLAG => {
                    let parsed = value
                        .parse::<VectorType>()
                        .map_err(|e| Error::MalformedHeader(e.to_string()))?;
                    if vector_type.replace(parsed).is_some() {
                        return Err(duplicate(key));
                    }
                }
                DIMENSION_FLAG => {
                    let parsed = value.parse::<usize>().map_err(|_| {
                        Error::MalformedHeader(format!(
                            "dimension '{value}' is not a positive integer"
                        ))
                    })?;
                    if dimension.replace(parsed).is_some() {
                        return Err(duplicate(key));
                    }
                }
                _ => {
                    if options.iter().any(|(k, _)| k == key) {
                        return Err(duplicate(key));
                    }
                    options.push((key.to_string(), value.to_string()));
                }
            }
        }

        let vector_type = vector_type
            .ok_or_else(|| Error::MalformedHeader(format!("missing -{VECTOR_TYPE_FLAG} in '{line}'")))?;
        let dimension = dimension
            .ok_or_else(|| Error::MalformedHeader(format!("missing -{DIMENSION_FLAG} in '{line}'")))?;
        vector_type
            .validate_dimension(dimension)
            .map_err(|e| Error::MalformedHeader(e.to_string()))?;

        Ok(Self {
            vector_type,
            dimension,
            options,
        })
    }

    /// Checks that a vector matches this header's shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VectorTypeMismatch`] or [`Error::DimensionMismatch`].
    pub fn check_vector(&self, vector: &Vector) -> Result<()> {
        if vector.vector_type() != self.vector_type {
            return Err(Error::VectorTypeMismatch {
                expected: self.vector_type.to_string(),
                actual: vector.vector_type().to_string(),
            });
        }
        if vector.dimension() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: vector.dimension(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for StoreHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.generate())
    }
}

impl FromStr for StoreHeader {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Returns the flag name if `token` is `-name` with `name` starting with a letter.
///
/// `-5` is a value, not a flag.
fn flag_name(token: &str) -> Option<&str> {
    let name = token.strip_prefix('-')?;
    name.chars()
        .next()
        .filter(char::is_ascii_alphabetic)
        .map(|_| name)
}

fn duplicate(key: &str) -> Error {
    Error::MalformedHeader(format!("flag -{key} given more than once"))
}

fn validate_option(key: &str, value: &str) -> Result<()> {
    let reject = |message: &str| {
        Err(Error::InvalidHeaderOption {
            key: key.to_string(),
            message: message.to_string(),
        })
    };
    if key == VECTOR_TYPE_FLAG || key == DIMENSION_FLAG {
        return reject("reserved key");
    }
    if flag_name(&format!("-{key}")) != Some(key) || key.chars().any(char::is_whitespace) {
        return reject("key must start with a letter and contain no whitespace");
    }
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return reject("value must be non-empty and contain no whitespace");
    }
    if flag_name(value).is_some() {
        return reject("value must not look like a flag");
    }
    Ok(())
}
