//! XDL and JSON encoding, and serialization into [`Var`].
//!
//! This module provides:
//!
//! - [`Encoder`]: writes a [`Var`] tree as XDL or JSON text, compact or
//!   pretty-printed
//! - [`VarSerializer`]: a [`serde::Serializer`] that builds a [`Var`] from any
//!   `Serialize` type
//!
//! ## Compact output
//!
//! Compact output is canonical: no whitespace is inserted, fields keep their
//! insertion order and numbers are written in the shortest form that parses
//! back to the same value.
//!
//! ```rust
//! use serde_xdl::{encode_json, encode_xdl, Var};
//!
//! let v = Var::tagged("A")
//!     .with("x", 3.5)
//!     .with("y", "s")
//!     .with("z", Var::array_from([true, false]));
//!
//! assert_eq!(encode_xdl(&v).unwrap(), "A{x=3.5,y=\"s\",z=[Y,N]}");
//! assert_eq!(encode_json(&v).unwrap(), "{\"x\":3.5,\"y\":\"s\",\"z\":[true,false]}");
//! ```
//!
//! ## Self-referential trees
//!
//! The encoder tracks the containers on the current path and fails with
//! [`Error::Cycle`] instead of recursing forever.
//!
//! ```rust
//! use serde_xdl::{encode_xdl, Error, Var};
//!
//! let mut a = Var::array();
//! let alias = a.clone();
//! a.push(alias).unwrap();
//! assert_eq!(encode_xdl(&a), Err(Error::Cycle));
//! # a.remove_at(0);
//! ```

use crate::lexer::is_identifier;
use crate::value::{exact_i64, ArrayRef, ObjectRef};
use crate::{Dict, Error, Result, Syntax, Var, XdlOptions};
use serde::{ser, Serialize};
use std::fmt::Write as _;

/// Text encoder for [`Var`] trees.
///
/// Created via [`Encoder::new`]; most callers use
/// [`encode_with_options`](crate::encode_with_options) instead.
pub struct Encoder<'o> {
    output: String,
    options: &'o XdlOptions,
    indent_level: usize,
    path: Vec<usize>,
}

impl<'o> Encoder<'o> {
    #[must_use]
    pub fn new(options: &'o XdlOptions) -> Self {
        Encoder {
            output: String::with_capacity(256),
            options,
            indent_level: 0,
            path: Vec::new(),
        }
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.output
    }

    /// Appends the encoding of `value` to the output.
    ///
    /// On failure nothing is appended and the encoder can be reused.
    pub fn encode(&mut self, value: &Var) -> Result<()> {
        let mark = self.output.len();
        let result = self.encode_value(value);
        if result.is_err() {
            self.output.truncate(mark);
            self.indent_level = 0;
            self.path.clear();
        }
        result
    }

    fn encode_value(&mut self, value: &Var) -> Result<()> {
        match value {
            Var::None | Var::Nul => self.write_null(),
            Var::Bool(b) => self.write_bool(*b),
            Var::Number(n) => self.write_number(*n),
            Var::String(s) => self.write_string(s),
            Var::Array(array) => self.write_array(array)?,
            Var::Object(object) => self.write_object(object)?,
        }
        Ok(())
    }

    fn is_xdl(&self) -> bool {
        self.options.syntax == Syntax::Xdl
    }

    fn enter(&mut self, addr: usize) -> Result<()> {
        if self.path.contains(&addr) {
            return Err(Error::Cycle);
        }
        if self.path.len() >= self.options.max_depth {
            return Err(Error::DepthLimit {
                limit: self.options.max_depth,
            });
        }
        self.path.push(addr);
        Ok(())
    }

    fn leave(&mut self) {
        self.path.pop();
    }

    fn write_newline(&mut self) {
        if self.options.pretty {
            self.output.push('\n');
            for _ in 0..self.indent_level * self.options.indent {
                self.output.push(' ');
            }
        }
    }

    fn write_null(&mut self) {
        self.output
            .push_str(if self.is_xdl() { "NUL" } else { "null" });
    }

    fn write_bool(&mut self, b: bool) {
        let text = match (self.is_xdl(), b) {
            (true, true) => "Y",
            (true, false) => "N",
            (false, true) => "true",
            (false, false) => "false",
        };
        self.output.push_str(text);
    }

    fn write_number(&mut self, n: f64) {
        if n.is_finite() {
            push_number(&mut self.output, n);
        } else if !self.is_xdl() {
            self.output.push_str("null");
        } else if n.is_nan() {
            self.output.push_str("NaN");
        } else if n > 0.0 {
            self.output.push_str("Infinity");
        } else {
            self.output.push_str("-Infinity");
        }
    }

    #[inline]
    fn write_string(&mut self, s: &str) {
        self.output.push('"');
        for ch in s.chars() {
            match ch {
                '"' => self.output.push_str("\\\""),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\r' => self.output.push_str("\\r"),
                '\t' => self.output.push_str("\\t"),
                c if (c as u32) < 0x20 => {
                    let _ = write!(self.output, "\\u{:04x}", c as u32);
                }
                _ => self.output.push(ch),
            }
        }
        self.output.push('"');
    }

    fn write_key(&mut self, key: &str) {
        if self.is_xdl() && is_identifier(key) {
            self.output.push_str(key);
        } else {
            self.write_string(key);
        }
    }

    fn write_array(&mut self, array: &ArrayRef) -> Result<()> {
        self.enter(array.addr())?;
        let items = array.borrow();

        if items.is_empty() {
            self.output.push_str("[]");
            self.leave();
            return Ok(());
        }

        // Arrays of scalars stay on one line when pretty-printing
        let multiline =
            self.options.pretty && items.iter().any(|v| matches!(v, Var::Array(_) | Var::Object(_)));

        self.output.push('[');
        self.indent_level += 1;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.output.push(',');
                if self.options.pretty && !multiline {
                    self.output.push(' ');
                }
            }
            if multiline {
                self.write_newline();
            }
            self.encode_value(item)?;
        }
        self.indent_level -= 1;
        if multiline {
            self.write_newline();
        }
        self.output.push(']');

        self.leave();
        Ok(())
    }

    fn write_object(&mut self, object: &ObjectRef) -> Result<()> {
        self.enter(object.addr())?;
        let dict = object.borrow();

        if self.is_xdl() {
            if let Some(tag) = dict.tag() {
                if !is_identifier(tag) {
                    return Err(Error::InvalidTag(tag.to_string()));
                }
                self.output.push_str(tag);
            }
        }

        if dict.is_empty() {
            self.output.push_str("{}");
            self.leave();
            return Ok(());
        }

        let separator = match (self.is_xdl(), self.options.pretty) {
            (true, false) => "=",
            (true, true) => " = ",
            (false, false) => ":",
            (false, true) => ": ",
        };

        self.output.push('{');
        self.indent_level += 1;
        for (i, (key, value)) in dict.iter().enumerate() {
            if i > 0 {
                self.output.push(',');
            }
            self.write_newline();
            self.write_key(key);
            self.output.push_str(separator);
            self.encode_value(value)?;
        }
        self.indent_level -= 1;
        self.write_newline();
        self.output.push('}');

        self.leave();
        Ok(())
    }
}

/// Shortest decimal text that parses back to `n`, switching to exponent
/// notation for very large and very small magnitudes.
fn push_number(output: &mut String, n: f64) {
    let magnitude = n.abs();
    if magnitude != 0.0 && !(1e-5..1e16).contains(&magnitude) {
        let _ = write!(output, "{:e}", n);
    } else {
        let _ = write!(output, "{}", n);
    }
}

/// Serializer producing a [`Var`] tree.
///
/// Structs become objects tagged with the struct name, so `Point { x: 1 }`
/// encodes as `Point{x=1}` in XDL. Enum variants carrying data become
/// single-field objects keyed by the variant name.
pub struct VarSerializer;

pub struct SerializeVec {
    vec: Vec<Var>,
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    map: Dict,
    current_key: Option<String>,
    variant: Option<&'static str>,
}

impl ser::Serializer for VarSerializer {
    type Ok = Var;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Var> {
        Ok(Var::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Var> {
        Ok(Var::Number(f64::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Var> {
        Ok(Var::Number(f64::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Var> {
        Ok(Var::Number(f64::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Var> {
        Ok(Var::Number(v as f64))
    }

    fn serialize_u8(self, v: u8) -> Result<Var> {
        Ok(Var::Number(f64::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Var> {
        Ok(Var::Number(f64::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Var> {
        Ok(Var::Number(f64::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Var> {
        Ok(Var::Number(v as f64))
    }

    fn serialize_f32(self, v: f32) -> Result<Var> {
        Ok(Var::Number(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Var> {
        Ok(Var::Number(v))
    }

    fn serialize_char(self, v: char) -> Result<Var> {
        Ok(Var::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Var> {
        Ok(Var::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Var> {
        let vec: Vec<Var> = v.iter().map(|&b| Var::Number(f64::from(b))).collect();
        Ok(Var::from(vec))
    }

    fn serialize_none(self) -> Result<Var> {
        Ok(Var::Nul)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Var>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Var> {
        Ok(Var::Nul)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Var> {
        Ok(Var::Nul)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Var> {
        Ok(Var::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Var>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Var>
    where
        T: ?Sized + Serialize,
    {
        Ok(Var::field(variant, to_var(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Dict::new(), None))
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeMap> {
        let mut map = Dict::with_capacity(len);
        if is_identifier(name) {
            map.set_tag(Some(name.to_string()));
        }
        Ok(SerializeMap::new(map, None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Dict::with_capacity(len), Some(variant)))
    }
}

impl SerializeVec {
    fn new(len: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(len),
            variant,
        }
    }

    fn finish(self) -> Var {
        let array = Var::from(self.vec);
        match self.variant {
            Some(variant) => Var::field(variant, array),
            None => array,
        }
    }
}

impl SerializeMap {
    fn new(map: Dict, variant: Option<&'static str>) -> Self {
        SerializeMap {
            map,
            current_key: None,
            variant,
        }
    }

    fn finish(self) -> Var {
        let object = Var::from(self.map);
        match self.variant {
            Some(variant) => Var::field(variant, object),
            None => object,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Var;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_var(value)?);
        Ok(())
    }

    fn end(self) -> Result<Var> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Var;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_var(value)?);
        Ok(())
    }

    fn end(self) -> Result<Var> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Var;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_var(value)?);
        Ok(())
    }

    fn end(self) -> Result<Var> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Var;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_var(value)?);
        Ok(())
    }

    fn end(self) -> Result<Var> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Var;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_var(key)? {
            Var::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            Var::Number(n) => {
                let mut text = String::new();
                match exact_i64(n) {
                    Some(i) => {
                        let _ = write!(text, "{}", i);
                    }
                    None => push_number(&mut text, n),
                }
                self.current_key = Some(text);
                Ok(())
            }
            other => Err(Error::type_mismatch("string map key", other.kind().name())),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_var(value)?);
        Ok(())
    }

    fn end(self) -> Result<Var> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Var;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_var(value)?);
        Ok(())
    }

    fn end(self) -> Result<Var> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Var;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key.to_string(), to_var(value)?);
        Ok(())
    }

    fn end(self) -> Result<Var> {
        Ok(self.finish())
    }
}

fn to_var<T: Serialize + ?Sized>(value: &T) -> Result<Var> {
    value.serialize(VarSerializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xdl(v: &Var) -> Result<String> {
        let options = XdlOptions::new();
        let mut encoder = Encoder::new(&options);
        encoder.encode(v)?;
        Ok(encoder.into_inner())
    }

    fn json(v: &Var) -> Result<String> {
        let options = XdlOptions::json();
        let mut encoder = Encoder::new(&options);
        encoder.encode(v)?;
        Ok(encoder.into_inner())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(xdl(&Var::None).unwrap(), "NUL");
        assert_eq!(xdl(&Var::Nul).unwrap(), "NUL");
        assert_eq!(json(&Var::None).unwrap(), "null");
        assert_eq!(xdl(&Var::from(true)).unwrap(), "Y");
        assert_eq!(xdl(&Var::from(false)).unwrap(), "N");
        assert_eq!(json(&Var::from(true)).unwrap(), "true");
        assert_eq!(xdl(&Var::from("a\nb")).unwrap(), "\"a\\nb\"");
    }

    #[test]
    fn test_numbers() {
        let cases = [
            (3.0, "3"),
            (3.5, "3.5"),
            (-0.25, "-0.25"),
            (0.0, "0"),
            (1.25e8, "125000000"),
            (1e16, "1e16"),
            (1.5e20, "1.5e20"),
            (0.00001, "0.00001"),
            (1e-7, "1e-7"),
            (-2.5e-9, "-2.5e-9"),
            (0.1, "0.1"),
        ];
        for (n, expected) in cases {
            assert_eq!(xdl(&Var::from(n)).unwrap(), expected, "{}", n);
        }
    }

    #[test]
    fn test_non_finite_numbers() {
        assert_eq!(xdl(&Var::from(f64::NAN)).unwrap(), "NaN");
        assert_eq!(xdl(&Var::from(f64::INFINITY)).unwrap(), "Infinity");
        assert_eq!(xdl(&Var::from(f64::NEG_INFINITY)).unwrap(), "-Infinity");
        assert_eq!(json(&Var::from(f64::NAN)).unwrap(), "null");
        assert_eq!(json(&Var::from(f64::INFINITY)).unwrap(), "null");
    }

    #[test]
    fn test_string_escaping() {
        let v = Var::from("q\"b\\t\tr\r\u{1}");
        assert_eq!(xdl(&v).unwrap(), "\"q\\\"b\\\\t\\tr\\r\\u0001\"");
        assert_eq!(xdl(&Var::from("héllo")).unwrap(), "\"héllo\"");
    }

    #[test]
    fn test_keys() {
        let v = Var::object()
            .with("plain", 1)
            .with("with space", 2)
            .with("9lives", 3)
            .with("", 4);
        assert_eq!(
            xdl(&v).unwrap(),
            "{plain=1,\"with space\"=2,\"9lives\"=3,\"\"=4}"
        );
    }

    #[test]
    fn test_tags() {
        let v = Var::tagged("Point").with("x", 1);
        assert_eq!(xdl(&v).unwrap(), "Point{x=1}");
        assert_eq!(json(&v).unwrap(), "{\"x\":1}");

        let bad = Var::tagged("not a tag");
        assert_eq!(
            xdl(&bad).unwrap_err(),
            Error::InvalidTag("not a tag".to_string())
        );
        assert_eq!(json(&bad).unwrap(), "{}");
    }

    #[test]
    fn test_shared_subtree_is_not_a_cycle() {
        let shared = Var::array_from([1, 2]);
        let v = Var::array_from([shared.clone(), shared]);
        assert_eq!(xdl(&v).unwrap(), "[[1,2],[1,2]]");
    }

    #[test]
    fn test_object_cycle() {
        let mut a = Var::object();
        let alias = a.clone();
        a.set("self", alias).unwrap();
        assert_eq!(xdl(&a), Err(Error::Cycle));
        assert_eq!(json(&a), Err(Error::Cycle));
        a.remove("self");
    }

    #[test]
    fn test_encoder_reusable_after_error() {
        let options = XdlOptions::pretty();
        let mut encoder = Encoder::new(&options);
        encoder.encode(&Var::from(1)).unwrap();

        let mut a = Var::object();
        let alias = a.clone();
        a.set("inner", Var::object().with("self", alias)).unwrap();
        assert_eq!(encoder.encode(&a), Err(Error::Cycle));

        encoder.encode(&Var::object().with("k", 2)).unwrap();
        assert_eq!(encoder.into_inner(), "1{\n  k = 2\n}");
        a.remove("inner");
    }

    #[test]
    fn test_serialize_bytes() {
        let v = serde::Serializer::serialize_bytes(VarSerializer, &[0, 255]).unwrap();
        assert_eq!(xdl(&v).unwrap(), "[0,255]");
    }

    #[test]
    fn test_depth_limit() {
        let options = XdlOptions::new().with_max_depth(2);
        let v = Var::array_from([Var::array_from([Var::array()])]);
        let mut encoder = Encoder::new(&options);
        assert_eq!(encoder.encode(&v), Err(Error::DepthLimit { limit: 2 }));
    }

    #[test]
    fn test_pretty() {
        let options = XdlOptions::pretty();
        let v = Var::tagged("A")
            .with("x", 1)
            .with("list", Var::array_from([1, 2]))
            .with("nested", Var::array_from([Var::object().with("k", "v")]))
            .with("empty", Var::object());
        let mut encoder = Encoder::new(&options);
        encoder.encode(&v).unwrap();
        assert_eq!(
            encoder.into_inner(),
            "A{\n  x = 1,\n  list = [1, 2],\n  nested = [\n    {\n      k = \"v\"\n    }\n  ],\n  empty = {}\n}"
        );

        let options = XdlOptions::pretty().with_syntax(Syntax::Json).with_indent(4);
        let mut encoder = Encoder::new(&options);
        encoder.encode(&Var::object().with("a", Var::Nul)).unwrap();
        assert_eq!(encoder.into_inner(), "{\n    \"a\": null\n}");
    }

    #[test]
    fn test_var_serializer() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
            y: Option<f64>,
        }

        #[derive(Serialize)]
        enum Shape {
            Empty,
            Circle(f64),
            Pair(u8, u8),
            Rect { w: u32, h: u32 },
        }

        let v = Point { x: 1, y: None }.serialize(VarSerializer).unwrap();
        assert_eq!(xdl(&v).unwrap(), "Point{x=1,y=NUL}");

        let shapes = vec![
            Shape::Empty,
            Shape::Circle(1.5),
            Shape::Pair(1, 2),
            Shape::Rect { w: 2, h: 3 },
        ];
        let v = shapes.serialize(VarSerializer).unwrap();
        assert_eq!(
            xdl(&v).unwrap(),
            "[\"Empty\",{Circle=1.5},{Pair=[1,2]},{Rect={w=2,h=3}}]"
        );
    }

    #[test]
    fn test_map_keys() {
        use std::collections::BTreeMap;

        let mut map = BTreeMap::new();
        map.insert(1, "one");
        map.insert(2, "two");
        let v = map.serialize(VarSerializer).unwrap();
        assert_eq!(xdl(&v).unwrap(), "{\"1\"=\"one\",\"2\"=\"two\"}");

        let mut bad = BTreeMap::new();
        bad.insert(vec![1], 1);
        assert!(bad.serialize(VarSerializer).is_err());
    }
}
