//! XDL and JSON parsing, and deserialization out of [`Var`].
//!
//! This module provides:
//!
//! - [`Parser`]: a recursive-descent parser building a [`Var`] tree from the
//!   tokens produced by [`Lexer`]
//! - a [`serde::Deserializer`] implementation for [`Var`], used by
//!   [`from_value`](crate::from_value) to turn a tree into typed Rust data
//!
//! ## Overview
//!
//! The parser is fail-fast and all-or-nothing: the first structural error
//! aborts the parse and no partial tree is returned. Input following the
//! first complete value is ignored.
//!
//! ```rust
//! use serde_xdl::{parse_xdl, Kind};
//!
//! let v = parse_xdl("Point{x=1, y=2} trailing text is ignored").unwrap();
//! assert!(v.is("Point"));
//! assert!(v.get("x").is(Kind::Number));
//!
//! assert!(parse_xdl("[Y, N)").is_err());
//! ```
//!
//! ## Grammar
//!
//! ```text
//! value   := [ tag ] literal
//! literal := object | array | string | number | bool | 'NUL'
//! object  := '{' [ key '=' value (',' key '=' value)* ] '}'
//! key     := identifier | string
//! array   := '[' [ value (',' value)* ] ']'
//! bool    := 'Y' | 'N'
//! ```
//!
//! JSON mode accepts only the strict JSON subset: quoted keys, `:`
//! separators, `true`/`false`/`null`, no tags and no comments.

use crate::lexer::{Lexer, Spanned, Token};
use crate::value::{exact_i64, ArrayRef, ObjectRef};
use crate::{Dict, Error, Result, Syntax, Var, XdlOptions};
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;
use std::cell::RefCell;
use std::rc::Rc;

/// Recursive-descent parser over a [`Lexer`].
///
/// Created via [`Parser::new`]; most callers use
/// [`parse_with_options`](crate::parse_with_options) instead.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Spanned>,
    max_depth: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(input: &'a str, options: &XdlOptions) -> Self {
        Parser {
            lexer: Lexer::new(input, options.syntax),
            peeked: None,
            max_depth: options.max_depth,
            depth: 0,
        }
    }

    fn syntax(&self) -> Syntax {
        self.lexer.syntax()
    }

    fn peek(&mut self) -> Result<Option<&Spanned>> {
        if self.peeked.is_none() {
            self.peeked = self.lexer.next_token()?;
        }
        Ok(self.peeked.as_ref())
    }

    fn next(&mut self, expected: &str) -> Result<Spanned> {
        let next = match self.peeked.take() {
            Some(token) => Some(token),
            None => self.lexer.next_token()?,
        };
        next.ok_or_else(|| Error::unexpected_eof(self.lexer.position(), expected))
    }

    fn eat(&mut self, expected: &Token) -> Result<bool> {
        if self.peek()?.is_some_and(|t| &t.token == expected) {
            self.peeked = None;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(Error::DepthLimit {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Parses one complete value; anything after it is left unread.
    pub fn parse_document(&mut self) -> Result<Var> {
        self.parse_value()
    }

    fn parse_value(&mut self) -> Result<Var> {
        let Spanned { token, offset } = self.next("value")?;
        match token {
            Token::LBrace => self.parse_object(None),
            Token::LBracket => self.parse_array(),
            Token::Str(s) => Ok(Var::String(s)),
            Token::Number(n) => Ok(Var::Number(n)),
            Token::Ident(word) => self.parse_word(word, offset),
            other => Err(Error::syntax(
                offset,
                &format!("unexpected {}", other.describe()),
            )),
        }
    }

    fn parse_word(&mut self, word: String, offset: usize) -> Result<Var> {
        match self.syntax() {
            Syntax::Json => match word.as_str() {
                "true" => Ok(Var::Bool(true)),
                "false" => Ok(Var::Bool(false)),
                "null" => Ok(Var::Nul),
                _ => Err(Error::syntax(offset, "unknown keyword")),
            },
            Syntax::Xdl => {
                // A tag is only legal immediately before '{'
                if self.peeked.is_none() && self.lexer.next_is('{') {
                    self.next("'{'")?;
                    return self.parse_object(Some(word));
                }
                match word.as_str() {
                    "Y" => Ok(Var::Bool(true)),
                    "N" => Ok(Var::Bool(false)),
                    "NUL" => Ok(Var::Nul),
                    "NaN" => Ok(Var::Number(f64::NAN)),
                    "Infinity" => Ok(Var::Number(f64::INFINITY)),
                    _ => Err(Error::syntax(offset, "type tag must be followed by '{'")),
                }
            }
        }
    }

    fn parse_array(&mut self) -> Result<Var> {
        self.enter()?;
        let mut items = Vec::new();

        if !self.eat(&Token::RBracket)? {
            loop {
                items.push(self.parse_value()?);
                let Spanned { token, offset } = self.next("',' or ']'")?;
                match token {
                    Token::Comma => continue,
                    Token::RBracket => break,
                    other => {
                        return Err(Error::syntax(
                            offset,
                            &format!("expected ',' or ']', found {}", other.describe()),
                        ))
                    }
                }
            }
        }

        self.leave();
        Ok(Var::Array(ArrayRef::from_vec(items)))
    }

    fn parse_object(&mut self, tag: Option<String>) -> Result<Var> {
        self.enter()?;
        let mut dict = match tag {
            Some(tag) => Dict::tagged(tag),
            None => Dict::new(),
        };
        let separator = match self.syntax() {
            Syntax::Xdl => Token::Equals,
            Syntax::Json => Token::Colon,
        };

        if !self.eat(&Token::RBrace)? {
            loop {
                let key = self.parse_key()?;

                let Spanned { token, offset } = self.next(separator.describe())?;
                if token != separator {
                    return Err(Error::syntax(
                        offset,
                        &format!(
                            "expected {} after key, found {}",
                            separator.describe(),
                            token.describe()
                        ),
                    ));
                }

                let value = self.parse_value()?;
                dict.insert(key, value);

                let Spanned { token, offset } = self.next("',' or '}'")?;
                match token {
                    Token::Comma => continue,
                    Token::RBrace => break,
                    other => {
                        return Err(Error::syntax(
                            offset,
                            &format!("expected ',' or '}}', found {}", other.describe()),
                        ))
                    }
                }
            }
        }

        self.leave();
        Ok(Var::from(dict))
    }

    fn parse_key(&mut self) -> Result<String> {
        let Spanned { token, offset } = self.next("key")?;
        match (token, self.syntax()) {
            (Token::Str(key), _) => Ok(key),
            (Token::Ident(key), Syntax::Xdl) => Ok(key),
            (Token::Ident(_), Syntax::Json) => {
                Err(Error::syntax(offset, "object keys must be quoted in JSON"))
            }
            (other, _) => Err(Error::syntax(
                offset,
                &format!("expected key, found {}", other.describe()),
            )),
        }
    }
}

impl<'de> de::Deserializer<'de> for Var {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        VarDeserializer::new(self).deserialize_any(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        VarDeserializer::new(self).deserialize_option(visitor)
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        VarDeserializer::new(self).deserialize_newtype_struct(name, visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        VarDeserializer::new(self).deserialize_enum(name, variants, visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

impl<'de> IntoDeserializer<'de, Error> for Var {
    type Deserializer = Var;

    fn into_deserializer(self) -> Var {
        self
    }
}

// Containers currently being visited, shared by every nested deserializer of
// one `from_value` call. Re-entering one of them means the tree has a cycle.
type Path = Rc<RefCell<Vec<usize>>>;

struct VarDeserializer {
    value: Var,
    path: Path,
}

impl VarDeserializer {
    fn new(value: Var) -> Self {
        VarDeserializer {
            value,
            path: Path::default(),
        }
    }

    fn nested(value: Var, path: &Path) -> Self {
        VarDeserializer {
            value,
            path: Rc::clone(path),
        }
    }

    fn visit_array<'de, V>(path: &Path, array: &ArrayRef, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Self::enter(path, array.addr())?;
        let items = array.borrow().clone();
        let result = visitor.visit_seq(SeqDeserializer::new(items, path));
        path.borrow_mut().pop();
        result
    }

    fn visit_object<'de, V>(path: &Path, object: &ObjectRef, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Self::enter(path, object.addr())?;
        let dict = object.borrow().clone();
        let result = visitor.visit_map(MapDeserializer::new(dict, path));
        path.borrow_mut().pop();
        result
    }

    fn enter(path: &Path, addr: usize) -> Result<()> {
        let mut path = path.borrow_mut();
        if path.contains(&addr) {
            return Err(Error::Cycle);
        }
        path.push(addr);
        Ok(())
    }
}

impl<'de> de::Deserializer<'de> for VarDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Var::None | Var::Nul => visitor.visit_unit(),
            Var::Bool(b) => visitor.visit_bool(b),
            Var::Number(n) => match exact_i64(n) {
                Some(i) => visitor.visit_i64(i),
                None => visitor.visit_f64(n),
            },
            Var::String(s) => visitor.visit_string(s),
            Var::Array(array) => Self::visit_array(&self.path, &array, visitor),
            Var::Object(object) => Self::visit_object(&self.path, &object, visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Var::None | Var::Nul => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Var::String(s) => visitor.visit_enum(s.into_deserializer()),
            Var::Object(object) => {
                let dict = object.borrow().clone();
                let mut entries = dict.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => {
                        Self::enter(&self.path, object.addr())?;
                        let result = visitor.visit_enum(EnumDeserializer {
                            variant,
                            value,
                            path: Rc::clone(&self.path),
                        });
                        self.path.borrow_mut().pop();
                        result
                    }
                    _ => Err(Error::custom("expected object with a single enum variant")),
                }
            }
            other => Err(Error::type_mismatch("enum", other.kind().name())),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Var>,
    path: Path,
}

impl SeqDeserializer {
    fn new(vec: Vec<Var>, path: &Path) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
            path: Rc::clone(path),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(VarDeserializer::nested(value, &self.path))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Var>,
    value: Option<Var>,
    path: Path,
}

impl MapDeserializer {
    fn new(map: Dict, path: &Path) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
            path: Rc::clone(path),
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(Var::String(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(VarDeserializer::nested(value, &self.path)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Var,
    path: Path,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(Var::String(self.variant))?;
        Ok((
            variant,
            VariantDeserializer {
                value: self.value,
                path: self.path,
            },
        ))
    }
}

struct VariantDeserializer {
    value: Var,
    path: Path,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Var::None | Var::Nul => Ok(()),
            _ => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(VarDeserializer::nested(self.value, &self.path))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Var::Array(array) => VarDeserializer::visit_array(&self.path, &array, visitor),
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Var::Object(object) => VarDeserializer::visit_object(&self.path, &object, visitor),
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}
