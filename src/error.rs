//! Error types for XDL/JSON parsing, encoding and value access.
//!
//! The text decoders in this crate have two faces. [`decode_xdl`](crate::decode_xdl)
//! and [`decode_json`](crate::decode_json) collapse every failure into the
//! [`Var::None`](crate::Var::None) sentinel, while the `parse_*` functions return
//! a [`Result`] carrying one of the variants below together with the byte offset
//! where parsing stopped.
//!
//! ## Error Categories
//!
//! - **Syntax Errors**: unexpected token, bad escape, mismatched bracket
//! - **Limits**: nesting deeper than the configured maximum, reference cycles
//! - **Access Errors**: writing a field into a non-object, index out of range
//! - **Codec Errors**: malformed Base64 or hex input
//!
//! ## Examples
//!
//! ```rust
//! use serde_xdl::{parse_xdl, Error};
//!
//! let err = parse_xdl("[Y, N)").unwrap_err();
//! assert!(matches!(err, Error::Syntax { .. }));
//! assert_eq!(err.offset(), Some(5));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors produced by this crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed input at the given byte offset
    #[error("Syntax error at offset {offset}: {msg}")]
    Syntax { offset: usize, msg: String },

    /// Input ended in the middle of a value
    #[error("Unexpected end of input at offset {offset}, expected {expected}")]
    UnexpectedEof { offset: usize, expected: String },

    /// Nesting exceeded the configured maximum depth
    #[error("Nesting deeper than {limit} levels")]
    DepthLimit { limit: usize },

    /// A container was reached again while it was still being encoded
    #[error("Reference cycle detected while encoding")]
    Cycle,

    /// Operation requires a value of a different kind
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Array index outside `0..len`
    #[error("Index {index} out of bounds for array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Object tag that is not a bare identifier
    #[error("Invalid type tag: {0:?}")]
    InvalidTag(String),

    /// Base64 or hex decoding failure
    #[error("Codec error: {0}")]
    Codec(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error at a byte offset.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_xdl::Error;
    ///
    /// let err = Error::syntax(10, "unexpected token");
    /// assert!(err.to_string().contains("offset 10"));
    /// ```
    pub fn syntax(offset: usize, msg: &str) -> Self {
        Error::Syntax {
            offset,
            msg: msg.to_string(),
        }
    }

    /// Creates an unexpected end-of-input error.
    pub fn unexpected_eof(offset: usize, expected: &str) -> Self {
        Error::UnexpectedEof {
            offset,
            expected: expected.to_string(),
        }
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_xdl::Error;
    ///
    /// let err = Error::type_mismatch("OBJECT", "NUMBER");
    /// assert!(err.to_string().contains("expected OBJECT"));
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates a codec error for malformed Base64/hex input.
    pub fn codec<T: fmt::Display>(msg: T) -> Self {
        Error::Codec(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Byte offset into the source text, for errors raised while parsing.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::Syntax { offset, .. } | Error::UnexpectedEof { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_only_for_parse_errors() {
        assert_eq!(Error::syntax(7, "x").offset(), Some(7));
        assert_eq!(Error::unexpected_eof(3, "value").offset(), Some(3));
        assert_eq!(Error::Cycle.offset(), None);
        assert_eq!(Error::type_mismatch("ARRAY", "BOOL").offset(), None);
    }

    #[test]
    fn test_display_messages() {
        let err = Error::IndexOutOfBounds { index: 4, len: 2 };
        assert_eq!(
            err.to_string(),
            "Index 4 out of bounds for array of length 2"
        );
        assert_eq!(
            Error::DepthLimit { limit: 8 }.to_string(),
            "Nesting deeper than 8 levels"
        );
    }
}
