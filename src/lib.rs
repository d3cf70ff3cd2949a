//! # serde_xdl
//!
//! A dynamic value model and text codec for XDL, a relaxed JSON-like notation
//! for configuration data, and for strict JSON.
//!
//! ## What is XDL?
//!
//! XDL reads like JSON with the rough edges filed off: comments, bare keys,
//! `=` separators, `Y`/`N` booleans, a `NUL` keyword and optional type tags
//! naming an object:
//!
//! ```text
//! // camera setup
//! Camera{
//!     name = "front",
//!     fov = 72.5,
//!     enabled = Y,
//!     /* pixels */ size = [1920, 1080]
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Dynamic values**: [`Var`] holds any document; arrays and objects are
//!   shared handles with an explicit [`Var::deep_clone`]
//! - **Two grammars**: XDL and strict JSON, selected through [`XdlOptions`]
//! - **Canonical output**: compact encoding is deterministic and byte-exact
//! - **Safe on hostile input**: nesting limits in the parser and cycle
//!   detection in the encoder
//! - **Serde compatible**: convert typed data to and from [`Var`] or text
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_xdl::{decode_xdl, encode_json, encode_xdl, Kind};
//!
//! let v = decode_xdl("A{x=3.5, // comment\n y=\"s\", z=[Y,N]}");
//! assert!(v.is("A"));
//! assert_eq!(v.get("x"), 3.5);
//!
//! assert_eq!(encode_xdl(&v).unwrap(), "A{x=3.5,y=\"s\",z=[Y,N]}");
//! assert_eq!(encode_json(&v).unwrap(), "{\"x\":3.5,\"y\":\"s\",\"z\":[true,false]}");
//!
//! // Malformed text decodes to the NONE sentinel
//! assert!(decode_xdl("[Y, N)").is(Kind::None));
//! ```
//!
//! ### Typed data
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_xdl::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let text = to_string(&Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(text, "Point{x=1,y=2}");
//!
//! let back: Point = from_str(&text).unwrap();
//! assert_eq!(back, Point { x: 1, y: 2 });
//! ```
//!
//! ### Building values
//!
//! ```rust
//! use serde_xdl::{encode_xdl, xdl, Var};
//!
//! let built = Var::tagged("Server").with("port", 8080).with("tls", true);
//! assert_eq!(encode_xdl(&built).unwrap(), "Server{port=8080,tls=Y}");
//!
//! let literal = xdl!({ "port": 8080, "tls": true });
//! assert_eq!(literal, built);
//! ```
//!
//! ## Logging
//!
//! Parse and encode failures are reported through `tracing` at `debug`
//! level; the library never installs a subscriber.

pub mod access;
pub mod codec;
pub mod de;
pub mod error;
pub mod lexer;
pub mod macros;
pub mod map;
pub mod options;
pub mod ser;
pub mod value;

pub use access::TypeTest;
pub use de::Parser;
pub use error::{Error, Result};
pub use map::Dict;
pub use options::{Syntax, XdlOptions, DEFAULT_MAX_DEPTH};
pub use ser::{Encoder, VarSerializer};
pub use value::{ArrayRef, Kind, ObjectRef, Var};

use serde::{de::DeserializeOwned, Serialize};
use std::io;
use tracing::{debug, trace};

/// Parses text under the given options.
///
/// Input after the first complete value is ignored.
///
/// # Errors
///
/// Returns the first syntax error, with its byte offset, or
/// [`Error::DepthLimit`] when nesting exceeds `options.max_depth`.
pub fn parse_with_options(input: &str, options: &XdlOptions) -> Result<Var> {
    match Parser::new(input, options).parse_document() {
        Ok(value) => {
            trace!(syntax = options.syntax.as_str(), kind = %value.kind(), "parsed document");
            Ok(value)
        }
        Err(e) => {
            debug!(
                syntax = options.syntax.as_str(),
                offset = ?e.offset(),
                error = %e,
                "parse failed"
            );
            Err(e)
        }
    }
}

/// Parses XDL text.
///
/// # Examples
///
/// ```rust
/// use serde_xdl::{parse_xdl, Error};
///
/// let v = parse_xdl("{name=\"x\", size=[1, 2]}").unwrap();
/// assert_eq!(v.get("size").len(), 2);
///
/// let err = parse_xdl("{name=}").unwrap_err();
/// assert_eq!(err.offset(), Some(6));
/// ```
///
/// # Errors
///
/// Returns the first syntax error with its byte offset.
pub fn parse_xdl(input: &str) -> Result<Var> {
    parse_with_options(input, &XdlOptions::new())
}

/// Parses strict JSON.
///
/// # Errors
///
/// Returns the first syntax error with its byte offset.
pub fn parse_json(input: &str) -> Result<Var> {
    parse_with_options(input, &XdlOptions::json())
}

/// Parses XDL text, returning [`Var::None`] on malformed input.
#[must_use]
pub fn decode_xdl(input: &str) -> Var {
    parse_xdl(input).unwrap_or_default()
}

/// Parses strict JSON, returning [`Var::None`] on malformed input.
///
/// ```rust
/// use serde_xdl::{decode_json, Kind};
///
/// let v = decode_json("{\"x\":null,\"y\":3}");
/// assert!(v.get("x").is(Kind::Nul));
/// assert_eq!(v.get("y"), 3);
/// ```
#[must_use]
pub fn decode_json(input: &str) -> Var {
    parse_json(input).unwrap_or_default()
}

/// Encodes a value under the given options.
///
/// # Errors
///
/// [`Error::Cycle`] for self-referential trees, [`Error::DepthLimit`] past
/// `options.max_depth` and [`Error::InvalidTag`] for tags that are not bare
/// identifiers.
pub fn encode_with_options(value: &Var, options: &XdlOptions) -> Result<String> {
    let mut encoder = Encoder::new(options);
    if let Err(e) = encoder.encode(value) {
        debug!(syntax = options.syntax.as_str(), error = %e, "encode failed");
        return Err(e);
    }
    Ok(encoder.into_inner())
}

/// Compact XDL text.
///
/// # Errors
///
/// See [`encode_with_options`].
pub fn encode_xdl(value: &Var) -> Result<String> {
    encode_with_options(value, &XdlOptions::new())
}

/// Compact JSON text. Tags are dropped and non-finite numbers become `null`.
///
/// # Errors
///
/// See [`encode_with_options`].
pub fn encode_json(value: &Var) -> Result<String> {
    encode_with_options(value, &XdlOptions::json())
}

/// Convert any `T: Serialize` to a [`Var`].
///
/// # Examples
///
/// ```rust
/// use serde_xdl::to_value;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is("Point"));
/// assert_eq!(value.get("y"), 2);
/// ```
///
/// # Errors
///
/// Returns an error for maps whose keys are not strings or numbers.
pub fn to_value<T>(value: &T) -> Result<Var>
where
    T: ?Sized + Serialize,
{
    value.serialize(VarSerializer)
}

/// Deserialize an instance of type `T` from a [`Var`].
///
/// # Errors
///
/// Returns an error when the tree does not match the shape of `T`.
pub fn from_value<T>(value: Var) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(value)
}

/// Serialize any `T: Serialize` to an encoded string with custom options.
///
/// # Errors
///
/// Returns an error if the value cannot be converted or encoded.
pub fn to_string_with_options<T>(value: &T, options: &XdlOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    encode_with_options(&to_value(value)?, options)
}

/// Serialize any `T: Serialize` to compact XDL.
///
/// # Errors
///
/// Returns an error if the value cannot be converted or encoded.
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &XdlOptions::new())
}

/// Serialize any `T: Serialize` to pretty-printed XDL.
///
/// # Errors
///
/// Returns an error if the value cannot be converted or encoded.
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &XdlOptions::pretty())
}

/// Serialize any `T: Serialize` to compact JSON.
///
/// # Errors
///
/// Returns an error if the value cannot be converted or encoded.
pub fn to_json_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, &XdlOptions::json())
}

/// Serialize any `T: Serialize` to a writer as compact XDL.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string(value)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))
}

/// Deserialize an instance of type `T` from XDL text.
///
/// # Errors
///
/// Returns an error if the text is malformed or does not match `T`.
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(parse_xdl(s)?)
}

/// Deserialize an instance of type `T` from JSON text.
///
/// # Errors
///
/// Returns an error if the text is malformed or does not match `T`.
pub fn from_json_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(parse_json(s)?)
}

/// Deserialize an instance of type `T` from an I/O stream of XDL.
///
/// # Examples
///
/// ```rust
/// use serde_xdl::from_reader;
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_reader(Cursor::new(b"{x=1, y=2}")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is not valid XDL, or the data
/// does not match `T`.
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}
