//! Reading, writing and building [`Var`] trees.
//!
//! Reads never fail: a missing key, an out-of-range index or a receiver of
//! the wrong kind yields [`Var::None`]. Writes return a [`Result`] because
//! they can hit a receiver of the wrong kind.
//!
//! ```rust
//! use serde_xdl::{Kind, Var};
//!
//! let config = Var::tagged("Server")
//!     .with("host", "localhost")
//!     .with("port", 8080);
//!
//! assert!(config.is("Server"));
//! assert!(config.has_kind("port", Kind::Number));
//! assert_eq!(config.get_or("timeout", 30), 30);
//!
//! let mut port = 0;
//! assert!(config.read("port", &mut port));
//! assert_eq!(port, 8080);
//! ```

use crate::value::{ArrayRef, ObjectRef};
use crate::{Dict, Error, Kind, Result, Var};
use std::ops::BitOr;

/// A type predicate accepted by [`Var::is`]: either a [`Kind`] or a type tag.
pub trait TypeTest {
    fn test(&self, value: &Var) -> bool;
}

impl TypeTest for Kind {
    fn test(&self, value: &Var) -> bool {
        value.kind() == *self
    }
}

/// Matches objects whose type tag equals the string.
impl TypeTest for &str {
    fn test(&self, value: &Var) -> bool {
        match value {
            Var::Object(object) => object.borrow().tag() == Some(*self),
            _ => false,
        }
    }
}

impl Var {
    /// `v.is(Kind::Array)` tests the kind, `v.is("Point")` the type tag.
    #[must_use]
    pub fn is<T: TypeTest>(&self, test: T) -> bool {
        test.test(self)
    }

    /// Field lookup. Returns `None` when the key is absent or `self` is not an
    /// object. Containers come back as aliasing handles.
    #[must_use]
    pub fn get(&self, key: &str) -> Var {
        match self {
            Var::Object(object) => object.borrow().get(key).cloned().unwrap_or_default(),
            _ => Var::None,
        }
    }

    /// Sets a field, inserting the key if absent.
    ///
    /// A `None` receiver becomes an empty object first.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] when `self` is neither an object nor `None`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Var>) -> Result<()> {
        if self.is_none() {
            *self = Var::object();
        }
        match self {
            Var::Object(object) => {
                object.borrow_mut().insert(key.into(), value.into());
                Ok(())
            }
            other => Err(Error::type_mismatch("OBJECT", other.kind().name())),
        }
    }

    /// Element lookup. Returns `None` when out of range or `self` is not an
    /// array.
    #[must_use]
    pub fn at(&self, index: usize) -> Var {
        match self {
            Var::Array(array) => array.borrow().get(index).cloned().unwrap_or_default(),
            _ => Var::None,
        }
    }

    /// Replaces the element at `index`.
    pub fn set_at(&mut self, index: usize, value: impl Into<Var>) -> Result<()> {
        match self {
            Var::Array(array) => {
                let mut items = array.borrow_mut();
                let len = items.len();
                match items.get_mut(index) {
                    Some(slot) => {
                        *slot = value.into();
                        Ok(())
                    }
                    None => Err(Error::IndexOutOfBounds { index, len }),
                }
            }
            other => Err(Error::type_mismatch("ARRAY", other.kind().name())),
        }
    }

    /// Appends an element. A `None` receiver becomes an empty array first.
    pub fn push(&mut self, value: impl Into<Var>) -> Result<()> {
        if self.is_none() {
            *self = Var::array();
        }
        match self {
            Var::Array(array) => {
                array.borrow_mut().push(value.into());
                Ok(())
            }
            other => Err(Error::type_mismatch("ARRAY", other.kind().name())),
        }
    }

    /// Removes a field, returning its value or `None`.
    pub fn remove(&mut self, key: &str) -> Var {
        match self {
            Var::Object(object) => object.borrow_mut().remove(key).unwrap_or_default(),
            _ => Var::None,
        }
    }

    /// Removes an element, shifting the rest down. Returns `None` when out of
    /// range.
    pub fn remove_at(&mut self, index: usize) -> Var {
        match self {
            Var::Array(array) => {
                let mut items = array.borrow_mut();
                if index < items.len() {
                    items.remove(index)
                } else {
                    Var::None
                }
            }
            _ => Var::None,
        }
    }

    /// Number of elements or fields; zero for scalars.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Var::Array(array) => array.len(),
            Var::Object(object) => object.len(),
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an array holds an element equal to `value`.
    #[must_use]
    pub fn contains(&self, value: &Var) -> bool {
        match self {
            Var::Array(array) => array.borrow().iter().any(|item| item == value),
            _ => false,
        }
    }

    /// Field names in insertion order; empty for non-objects.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        match self {
            Var::Object(object) => object.borrow().keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        match self {
            Var::Object(object) => object.borrow().contains_key(key),
            _ => false,
        }
    }

    /// Whether the field exists and passes the type test.
    #[must_use]
    pub fn has_kind<T: TypeTest>(&self, key: &str, test: T) -> bool {
        match self {
            Var::Object(object) => object.borrow().get(key).is_some_and(|v| test.test(v)),
            _ => false,
        }
    }

    /// The field when present and of the same kind as `default`, otherwise
    /// `default`.
    #[must_use]
    pub fn get_or(&self, key: &str, default: impl Into<Var>) -> Var {
        let default = default.into();
        let value = self.get(key);
        if value.kind() == default.kind() {
            value
        } else {
            default
        }
    }

    /// Overwrites `out` when the field exists and converts to `T`.
    ///
    /// Returns whether `out` was written; a `false` leaves `out` untouched.
    pub fn read<T: TryFrom<Var>>(&self, key: &str, out: &mut T) -> bool {
        match self.as_object().and_then(|o| o.borrow().get(key).cloned()) {
            Some(value) => match T::try_from(value) {
                Ok(converted) => {
                    *out = converted;
                    true
                }
                Err(_) => false,
            },
            None => false,
        }
    }

    /// Builder form of [`set`](Var::set): `Var::object().with("x", 3).with("y", 2)`.
    ///
    /// Non-object receivers are replaced by a fresh object.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Var>) -> Var {
        if !self.is(Kind::Object) {
            self = Var::object();
        }
        if let Var::Object(object) = &self {
            object.borrow_mut().insert(key.into(), value.into());
        }
        self
    }

    /// A single-field object.
    #[must_use]
    pub fn field(key: impl Into<String>, value: impl Into<Var>) -> Var {
        Var::object().with(key, value)
    }

    /// An empty object carrying a type tag.
    #[must_use]
    pub fn tagged(tag: impl Into<String>) -> Var {
        Var::Object(ObjectRef::from_dict(Dict::tagged(tag)))
    }

    #[must_use]
    pub fn array_from<I>(items: I) -> Var
    where
        I: IntoIterator,
        I::Item: Into<Var>,
    {
        Var::Array(ArrayRef::from_vec(items.into_iter().map(Into::into).collect()))
    }

    /// Sets or clears the type tag of an object. Other kinds are left alone.
    pub fn set_tag(&mut self, tag: Option<&str>) {
        if let Var::Object(object) = self {
            object.borrow_mut().set_tag(tag.map(str::to_string));
        }
    }
}

/// `a | b` is `a` unless `a` is `None`.
impl BitOr for Var {
    type Output = Var;

    fn bitor(self, rhs: Var) -> Var {
        if self.is_none() {
            rhs
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_set() {
        let mut v = Var::object();
        v.set("a", 1).unwrap();
        v.set("b", "two").unwrap();
        v.set("a", 3).unwrap();
        assert_eq!(v.get("a"), 3);
        assert_eq!(v.get("b"), "two");
        assert!(v.get("missing").is_none());
        assert_eq!(v.keys(), vec!["a", "b"]);
        assert!(Var::from(1).get("a").is_none());
    }

    #[test]
    fn test_set_on_none_vivifies() {
        let mut v = Var::None;
        v.set("x", true).unwrap();
        assert!(v.is(Kind::Object));
        assert_eq!(v.get("x"), true);
    }

    #[test]
    fn test_set_on_scalar_fails() {
        let mut v = Var::from(1);
        assert_eq!(
            v.set("x", 1),
            Err(Error::TypeMismatch {
                expected: "OBJECT".to_string(),
                found: "NUMBER".to_string()
            })
        );
        assert!(Var::from("s").push(1).is_err());
    }

    #[test]
    fn test_push_on_none() {
        let mut v = Var::None;
        v.push(1).unwrap();
        v.push(Var::Nul).unwrap();
        v.push(false).unwrap();
        assert_eq!(crate::encode_json(&v).unwrap(), "[1,null,false]");
    }

    #[test]
    fn test_index_access() {
        let mut v = Var::array_from([1, 2, 3]);
        assert_eq!(v.at(1), 2);
        assert!(v.at(9).is_none());
        v.set_at(1, "b").unwrap();
        assert_eq!(v.at(1), "b");
        assert_eq!(
            v.set_at(5, 0),
            Err(Error::IndexOutOfBounds { index: 5, len: 3 })
        );
        assert_eq!(v.remove_at(0), 1);
        assert!(v.remove_at(10).is_none());
        assert_eq!(v.len(), 2);
        assert!(v.contains(&Var::from(3)));
        assert!(!v.contains(&Var::from(1)));
    }

    #[test]
    fn test_remove() {
        let mut v = Var::object().with("a", 1).with("b", 2).with("c", 3);
        assert_eq!(v.remove("a"), 1);
        assert!(v.remove("a").is_none());
        assert_eq!(v.keys(), vec!["b", "c"]);
    }

    #[test]
    fn test_type_predicates() {
        let v = Var::tagged("Point").with("x", 1);
        assert!(v.is(Kind::Object));
        assert!(v.is("Point"));
        assert!(!v.is("Other"));
        assert!(!Var::object().is("Point"));
        assert!(!Var::from("Point").is("Point"));
        assert!(v.has("x"));
        assert!(!v.has("y"));
        assert!(v.has_kind("x", Kind::Number));
        assert!(!v.has_kind("x", Kind::String));
    }

    #[test]
    fn test_get_or() {
        let v = Var::object().with("n", 5).with("s", "text");
        assert_eq!(v.get_or("n", 0), 5);
        assert_eq!(v.get_or("s", 0), 0);
        assert_eq!(v.get_or("missing", "d"), "d");
        assert!(!v.has("missing"));
    }

    #[test]
    fn test_read() {
        let v = Var::object().with("n", 5).with("s", "text").with("f", 1.5);
        let mut n = 0i64;
        assert!(v.read("n", &mut n));
        assert_eq!(n, 5);

        let mut untouched = 42i64;
        assert!(!v.read("missing", &mut untouched));
        assert!(!v.read("s", &mut untouched));
        assert!(!v.read("f", &mut untouched));
        assert_eq!(untouched, 42);

        let mut s = String::new();
        assert!(v.read("s", &mut s));
        assert_eq!(s, "text");
    }

    #[test]
    fn test_builder_preserves_order() {
        let v = Var::object().with("z", 1).with("a", 2).with("m", 3);
        assert_eq!(v.keys(), vec!["z", "a", "m"]);
        assert_eq!(Var::field("k", "v").get("k"), "v");
        assert_eq!(Var::from(1).with("x", 2).get("x"), 2);
    }

    #[test]
    fn test_set_tag() {
        let mut v = Var::object();
        v.set_tag(Some("T"));
        assert!(v.is("T"));
        v.set_tag(None);
        assert_eq!(v.tag(), None);
    }

    #[test]
    fn test_coalesce() {
        assert_eq!(Var::None | Var::from(1), 1);
        assert_eq!(Var::from(2) | Var::from(1), 2);
        assert!((Var::Nul | Var::from(1)).is(Kind::Nul));
    }
}
