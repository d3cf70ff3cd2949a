//! Base64 and hex codecs for raw bytes carried inside documents.
//!
//! Binary payloads travel through XDL and JSON as strings. Base64 uses the
//! standard alphabet with `=` padding; hex is lowercase.
//!
//! ```rust
//! use serde_xdl::codec::{decode_base64, encode_base64, encode_hex};
//!
//! let bytes = [5u8, 0xf0, 0x7a, 0x45];
//! assert_eq!(encode_base64(&bytes), "BfB6RQ==");
//! assert_eq!(encode_hex(&bytes), "05f07a45");
//!
//! // Line-wrapped input decodes the same as the unwrapped form
//! assert_eq!(decode_base64("BfB6\nRQ==\n").unwrap(), bytes);
//! ```

use crate::{Error, Result};
use base64::Engine;

#[must_use]
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decodes standard Base64, ignoring any ASCII whitespace in the input.
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(Error::codec)
}

#[must_use]
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Decodes hex pairs; either case is accepted.
pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    hex::decode(text.trim()).map_err(Error::codec)
}
