//! Dynamic value representation.
//!
//! This module provides [`Var`], a tagged union able to hold any XDL or JSON
//! value, and the reference-counted handles [`ArrayRef`] and [`ObjectRef`]
//! that back its containers.
//!
//! ## Sharing
//!
//! Arrays and objects are *implicitly shared*. Cloning a `Var` with
//! [`Clone::clone`] copies the handle, so both values alias the same backing
//! store and see each other's mutations. [`Var::deep_clone`] is the only way
//! to detach: it copies the whole tree recursively.
//!
//! ```rust
//! use serde_xdl::Var;
//!
//! let a = Var::object().with("x", 1);
//! let alias = a.clone();
//! let copy = a.deep_clone();
//!
//! let mut a = a;
//! a.set("x", 2).unwrap();
//! assert_eq!(alias.get("x"), 2);
//! assert_eq!(copy.get("x"), 1);
//! ```
//!
//! Because the handles are `Rc<RefCell<..>>`, a `Var` is not `Send`. Values
//! cross thread boundaries as text (see [`encode_xdl`](crate::encode_xdl)) or
//! through serde.
//!
//! ## Truthiness
//!
//! ```rust
//! use serde_xdl::Var;
//!
//! assert!(!Var::from("").is_truthy());
//! assert!(!Var::from("false").is_truthy());
//! assert!(!Var::from("0").is_truthy());
//! assert!(Var::from("c").is_truthy());
//! assert!(!Var::None.is_truthy());
//! ```

use crate::Dict;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// A dynamically-typed value.
///
/// `None` doubles as the "no value" marker and as the parse-failure sentinel
/// returned by [`decode_xdl`](crate::decode_xdl) and
/// [`decode_json`](crate::decode_json). `Nul` is an explicit null.
///
/// # Examples
///
/// ```rust
/// use serde_xdl::{Kind, Var};
///
/// let num = Var::from(42);
/// let text = Var::from("hello");
///
/// assert!(num.is(Kind::Number));
/// assert!(text.is(Kind::String));
/// assert!(Var::default().is(Kind::None));
/// ```
#[derive(Clone, Debug, Default)]
pub enum Var {
    #[default]
    None,
    Nul,
    Bool(bool),
    Number(f64),
    String(String),
    Array(ArrayRef),
    Object(ObjectRef),
}

/// The kind of a [`Var`], used by type predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    None,
    Nul,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Kind::None => "NONE",
            Kind::Nul => "NUL",
            Kind::Bool => "BOOL",
            Kind::Number => "NUMBER",
            Kind::String => "STRING",
            Kind::Array => "ARRAY",
            Kind::Object => "OBJECT",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared handle to the elements of an array value.
#[derive(Clone, Default)]
pub struct ArrayRef(Rc<RefCell<Vec<Var>>>);

impl ArrayRef {
    #[must_use]
    pub fn new() -> Self {
        ArrayRef::default()
    }

    #[must_use]
    pub fn from_vec(items: Vec<Var>) -> Self {
        ArrayRef(Rc::new(RefCell::new(items)))
    }

    /// Borrows the elements.
    ///
    /// # Panics
    ///
    /// Panics if the array is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, Vec<Var>> {
        self.0.borrow()
    }

    /// Mutably borrows the elements. Every alias of this handle observes the change.
    ///
    /// # Panics
    ///
    /// Panics if the array is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, Vec<Var>> {
        self.0.borrow_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns `true` if both handles alias the same backing store.
    #[must_use]
    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

thread_local! {
    // Containers being formatted by `Debug` on this thread.
    static DEBUG_PATH: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

// Formats a container with `body` unless it is already being formatted
// further up, in which case `<cycle>` is written instead.
fn debug_guarded(
    addr: usize,
    f: &mut fmt::Formatter<'_>,
    body: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    let entered = DEBUG_PATH.with(|path| {
        let mut path = path.borrow_mut();
        if path.contains(&addr) {
            false
        } else {
            path.push(addr);
            true
        }
    });
    if !entered {
        return f.write_str("<cycle>");
    }
    let result = body(f);
    DEBUG_PATH.with(|path| {
        path.borrow_mut().pop();
    });
    result
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_guarded(self.addr(), f, |f| {
            f.debug_list().entries(self.0.borrow().iter()).finish()
        })
    }
}

/// Shared handle to the fields (and tag) of an object value.
#[derive(Clone, Default)]
pub struct ObjectRef(Rc<RefCell<Dict>>);

impl ObjectRef {
    #[must_use]
    pub fn new() -> Self {
        ObjectRef::default()
    }

    #[must_use]
    pub fn from_dict(dict: Dict) -> Self {
        ObjectRef(Rc::new(RefCell::new(dict)))
    }

    /// Borrows the fields.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, Dict> {
        self.0.borrow()
    }

    /// Mutably borrows the fields. Every alias of this handle observes the change.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, Dict> {
        self.0.borrow_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns `true` if both handles alias the same backing store.
    #[must_use]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_guarded(self.addr(), f, |f| {
            let dict = self.0.borrow();
            if let Some(tag) = dict.tag() {
                write!(f, "{} ", tag)?;
            }
            f.debug_map().entries(dict.iter()).finish()
        })
    }
}

/// Integral value of `n` if it is exactly representable as `i64`.
pub(crate) fn exact_i64(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

impl Var {
    /// Creates an empty, untagged object.
    #[must_use]
    pub fn object() -> Var {
        Var::Object(ObjectRef::new())
    }

    /// Creates an empty array.
    #[must_use]
    pub fn array() -> Var {
        Var::Array(ArrayRef::new())
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Var::None => Kind::None,
            Var::Nul => Kind::Nul,
            Var::Bool(_) => Kind::Bool,
            Var::Number(_) => Kind::Number,
            Var::String(_) => Kind::String,
            Var::Array(_) => Kind::Array,
            Var::Object(_) => Kind::Object,
        }
    }

    /// Returns `true` for `None`, the absence / parse-failure marker.
    #[inline]
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Var::None)
    }

    /// Truthiness coercion.
    ///
    /// Falsy values are `None`, `Nul`, `false`, numeric zero, empty strings,
    /// empty containers and the strings `"false"` and `"0"`. NaN is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Var::None | Var::Nul => false,
            Var::Bool(b) => *b,
            Var::Number(n) => *n != 0.0,
            Var::String(s) => !(s.is_empty() || s == "false" || s == "0"),
            Var::Array(a) => !a.is_empty(),
            Var::Object(o) => !o.is_empty(),
        }
    }

    /// If the value is a boolean, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Var::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a number, returns it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Var::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// If the value is a whole number that fits in `i64`, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_xdl::Var;
    ///
    /// assert_eq!(Var::from(42.0).as_i64(), Some(42));
    /// assert_eq!(Var::from(42.5).as_i64(), None);
    /// assert_eq!(Var::from("42").as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().and_then(exact_i64)
    }

    /// If the value is a string, returns a reference to it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Var::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Var::Array(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Var::Object(o) => Some(o),
            _ => None,
        }
    }

    /// The type tag of a named object, `None` for anything else.
    #[must_use]
    pub fn tag(&self) -> Option<String> {
        self.as_object()
            .and_then(|o| o.borrow().tag().map(str::to_string))
    }

    /// Produces a fully independent copy of the tree.
    ///
    /// Containers reached twice through different paths become two separate
    /// copies. A container that contains itself is reproduced as a cycle
    /// inside the copy rather than being expanded forever.
    #[must_use]
    pub fn deep_clone(&self) -> Var {
        self.deep_clone_inner(&mut Vec::new())
    }

    fn deep_clone_inner(&self, path: &mut Vec<(usize, Var)>) -> Var {
        match self {
            Var::Array(array) => {
                let addr = array.addr();
                if let Some((_, copy)) = path.iter().find(|(a, _)| *a == addr) {
                    return copy.clone();
                }
                let copy = ArrayRef::new();
                path.push((addr, Var::Array(copy.clone())));
                let items: Vec<Var> = array
                    .borrow()
                    .iter()
                    .map(|item| item.deep_clone_inner(path))
                    .collect();
                path.pop();
                *copy.borrow_mut() = items;
                Var::Array(copy)
            }
            Var::Object(object) => {
                let addr = object.addr();
                if let Some((_, copy)) = path.iter().find(|(a, _)| *a == addr) {
                    return copy.clone();
                }
                let copy = ObjectRef::new();
                path.push((addr, Var::Object(copy.clone())));
                let (tag, entries) = {
                    let dict = object.borrow();
                    let entries: Vec<(String, Var)> = dict
                        .iter()
                        .map(|(k, v)| (k.clone(), v.deep_clone_inner(path)))
                        .collect();
                    (dict.tag().map(str::to_string), entries)
                };
                path.pop();
                let mut dict: Dict = entries.into_iter().collect();
                dict.set_tag(tag);
                *copy.borrow_mut() = dict;
                Var::Object(copy)
            }
            other => other.clone(),
        }
    }

    /// Deep equality that also requires object type tags to match.
    ///
    /// `==` ignores tags; this is the comparison used for round-trip checks.
    #[must_use]
    pub fn strict_eq(&self, other: &Var) -> bool {
        equals(self, other, true, &mut Vec::new())
    }
}

fn equals(a: &Var, b: &Var, tags: bool, seen: &mut Vec<(usize, usize)>) -> bool {
    match (a, b) {
        (Var::None, Var::None) | (Var::Nul, Var::Nul) => true,
        (Var::Bool(x), Var::Bool(y)) => x == y,
        (Var::Number(x), Var::Number(y)) => x == y,
        (Var::String(x), Var::String(y)) => x == y,
        (Var::Array(x), Var::Array(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            let pair = (x.addr(), y.addr());
            // A pair already under comparison is assumed equal; cyclic trees terminate.
            if seen.contains(&pair) {
                return true;
            }
            let (xs, ys) = (x.borrow(), y.borrow());
            if xs.len() != ys.len() {
                return false;
            }
            seen.push(pair);
            let result = xs.iter().zip(ys.iter()).all(|(p, q)| equals(p, q, tags, seen));
            seen.pop();
            result
        }
        (Var::Object(x), Var::Object(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            let pair = (x.addr(), y.addr());
            if seen.contains(&pair) {
                return true;
            }
            let (xd, yd) = (x.borrow(), y.borrow());
            if xd.len() != yd.len() || (tags && xd.tag() != yd.tag()) {
                return false;
            }
            seen.push(pair);
            let result = xd
                .iter()
                .zip(yd.iter())
                .all(|((k, v), (l, w))| k == l && equals(v, w, tags, seen));
            seen.pop();
            result
        }
        _ => false,
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Var) -> bool {
        equals(self, other, false, &mut Vec::new())
    }
}

impl PartialEq<f64> for Var {
    fn eq(&self, other: &f64) -> bool {
        self.as_f64() == Some(*other)
    }
}

impl PartialEq<i32> for Var {
    fn eq(&self, other: &i32) -> bool {
        self.as_f64() == Some(f64::from(*other))
    }
}

impl PartialEq<bool> for Var {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

impl PartialEq<&str> for Var {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<str> for Var {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

/// Compact XDL text. Formatting fails on self-referential trees.
impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = crate::encode_xdl(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

// Serialization walks the tree with the set of containers on the current path,
// so a self-referential value yields an error instead of unbounded recursion.
struct Guarded<'a> {
    value: &'a Var,
    path: &'a RefCell<Vec<usize>>,
}

impl Guarded<'_> {
    fn enter<E: serde::ser::Error>(&self, addr: usize) -> Result<(), E> {
        let mut path = self.path.borrow_mut();
        if path.contains(&addr) {
            return Err(E::custom("reference cycle detected"));
        }
        path.push(addr);
        Ok(())
    }

    fn leave(&self) {
        self.path.borrow_mut().pop();
    }
}

impl Serialize for Guarded<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.value {
            Var::None | Var::Nul => serializer.serialize_unit(),
            Var::Bool(b) => serializer.serialize_bool(*b),
            Var::Number(n) => match exact_i64(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Var::String(s) => serializer.serialize_str(s),
            Var::Array(array) => {
                use serde::ser::SerializeSeq;
                self.enter::<S::Error>(array.addr())?;
                let items = array.borrow();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(&Guarded {
                        value: item,
                        path: self.path,
                    })?;
                }
                self.leave();
                seq.end()
            }
            Var::Object(object) => {
                use serde::ser::SerializeMap;
                self.enter::<S::Error>(object.addr())?;
                let dict = object.borrow();
                let mut map = serializer.serialize_map(Some(dict.len()))?;
                for (k, v) in dict.iter() {
                    map.serialize_entry(
                        k,
                        &Guarded {
                            value: v,
                            path: self.path,
                        },
                    )?;
                }
                self.leave();
                map.end()
            }
        }
    }
}

impl Serialize for Var {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let path = RefCell::new(Vec::new());
        Guarded { value: self, path: &path }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Var {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct VarVisitor;

        impl<'de> Visitor<'de> for VarVisitor {
            type Value = Var;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any XDL value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Var, E> {
                Ok(Var::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Var, E> {
                Ok(Var::Number(value as f64))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Var, E> {
                Ok(Var::Number(value as f64))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Var, E> {
                Ok(Var::Number(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Var, E> {
                Ok(Var::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Var, E> {
                Ok(Var::String(value))
            }

            fn visit_unit<E>(self) -> Result<Var, E> {
                Ok(Var::Nul)
            }

            fn visit_none<E>(self) -> Result<Var, E> {
                Ok(Var::Nul)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Var, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Var, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Var::Array(ArrayRef::from_vec(vec)))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Var, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = Dict::new();
                while let Some((key, value)) = map.next_entry::<String, Var>()? {
                    values.insert(key, value);
                }
                Ok(Var::Object(ObjectRef::from_dict(values)))
            }
        }

        deserializer.deserialize_any(VarVisitor)
    }
}

// TryFrom implementations for extracting values from Var
impl TryFrom<Var> for f64 {
    type Error = crate::Error;

    fn try_from(value: Var) -> crate::Result<Self> {
        match value {
            Var::Number(n) => Ok(n),
            other => Err(crate::Error::type_mismatch("NUMBER", other.kind().name())),
        }
    }
}

impl TryFrom<Var> for i64 {
    type Error = crate::Error;

    fn try_from(value: Var) -> crate::Result<Self> {
        match value {
            Var::Number(n) => exact_i64(n).ok_or_else(|| {
                crate::Error::custom(format!("cannot convert number {} to i64", n))
            }),
            other => Err(crate::Error::type_mismatch("NUMBER", other.kind().name())),
        }
    }
}

impl TryFrom<Var> for i32 {
    type Error = crate::Error;

    fn try_from(value: Var) -> crate::Result<Self> {
        let wide = i64::try_from(value)?;
        i32::try_from(wide)
            .map_err(|_| crate::Error::custom(format!("number {} out of range for i32", wide)))
    }
}

impl TryFrom<Var> for bool {
    type Error = crate::Error;

    fn try_from(value: Var) -> crate::Result<Self> {
        match value {
            Var::Bool(b) => Ok(b),
            other => Err(crate::Error::type_mismatch("BOOL", other.kind().name())),
        }
    }
}

impl TryFrom<Var> for String {
    type Error = crate::Error;

    fn try_from(value: Var) -> crate::Result<Self> {
        match value {
            Var::String(s) => Ok(s),
            other => Err(crate::Error::type_mismatch("STRING", other.kind().name())),
        }
    }
}

// From implementations for creating Var from primitives
impl From<bool> for Var {
    fn from(value: bool) -> Self {
        Var::Bool(value)
    }
}

impl From<i32> for Var {
    fn from(value: i32) -> Self {
        Var::Number(f64::from(value))
    }
}

impl From<i64> for Var {
    fn from(value: i64) -> Self {
        Var::Number(value as f64)
    }
}

impl From<u32> for Var {
    fn from(value: u32) -> Self {
        Var::Number(f64::from(value))
    }
}

impl From<usize> for Var {
    fn from(value: usize) -> Self {
        Var::Number(value as f64)
    }
}

impl From<f32> for Var {
    fn from(value: f32) -> Self {
        Var::Number(f64::from(value))
    }
}

impl From<f64> for Var {
    fn from(value: f64) -> Self {
        Var::Number(value)
    }
}

impl From<String> for Var {
    fn from(value: String) -> Self {
        Var::String(value)
    }
}

impl From<&str> for Var {
    fn from(value: &str) -> Self {
        Var::String(value.to_string())
    }
}

impl From<Vec<Var>> for Var {
    fn from(value: Vec<Var>) -> Self {
        Var::Array(ArrayRef::from_vec(value))
    }
}

impl From<Dict> for Var {
    fn from(value: Dict) -> Self {
        Var::Object(ObjectRef::from_dict(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(Var::None.kind(), Kind::None);
        assert_eq!(Var::Nul.kind().name(), "NUL");
        assert_eq!(Var::from(1).kind(), Kind::Number);
        assert_eq!(Var::array().kind().to_string(), "ARRAY");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Var::None.is_truthy());
        assert!(!Var::Nul.is_truthy());
        assert!(!Var::from(false).is_truthy());
        assert!(!Var::from(0).is_truthy());
        assert!(!Var::from(-0.0).is_truthy());
        assert!(!Var::from("").is_truthy());
        assert!(!Var::from("false").is_truthy());
        assert!(!Var::from("0").is_truthy());
        assert!(!Var::array().is_truthy());
        assert!(!Var::object().is_truthy());

        assert!(Var::from(true).is_truthy());
        assert!(Var::from(f64::NAN).is_truthy());
        assert!(Var::from("c").is_truthy());
        assert!(Var::from("False").is_truthy());
        assert!(Var::from(vec![Var::Nul]).is_truthy());
    }

    #[test]
    fn test_handle_aliasing() {
        let a = Var::from(vec![Var::from(1)]);
        let b = a.clone();
        a.as_array().unwrap().borrow_mut().push(Var::from(2));
        assert_eq!(b.as_array().unwrap().len(), 2);
        assert!(a.as_array().unwrap().ptr_eq(b.as_array().unwrap()));
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let inner = Var::from(vec![Var::from(1)]);
        let mut dict = Dict::tagged("A");
        dict.insert("list".to_string(), inner.clone());
        let original = Var::from(dict);

        let copy = original.deep_clone();
        assert!(copy.strict_eq(&original));

        inner.as_array().unwrap().borrow_mut().push(Var::from(2));
        assert_ne!(copy, original);
        assert_eq!(copy.tag().as_deref(), Some("A"));
    }

    #[test]
    fn test_deep_clone_reproduces_cycle() {
        let a = Var::array();
        a.as_array().unwrap().borrow_mut().push(a.clone());

        let copy = a.deep_clone();
        let copy_ref = copy.as_array().unwrap();
        assert!(!copy_ref.ptr_eq(a.as_array().unwrap()));
        let first = copy_ref.borrow()[0].clone();
        assert!(first.as_array().unwrap().ptr_eq(copy_ref));

        // break the cycles so the test does not leak
        a.as_array().unwrap().borrow_mut().clear();
        copy_ref.borrow_mut().clear();
    }

    #[test]
    fn test_equality_rules() {
        assert_eq!(Var::Nul, Var::Nul);
        assert_ne!(Var::Nul, Var::from(false));
        assert_ne!(Var::from(f64::NAN), Var::from(f64::NAN));
        assert_ne!(Var::from(0.1 + 0.2), Var::from(0.3));
        assert_eq!(Var::from(3), 3);
        assert_eq!(Var::from("s"), "s");
        assert_eq!(Var::from(true), true);

        let mut a = Dict::tagged("A");
        a.insert("x".to_string(), Var::from(1));
        let mut b = Dict::tagged("B");
        b.insert("x".to_string(), Var::from(1));
        let (a, b) = (Var::from(a), Var::from(b));
        assert_eq!(a, b);
        assert!(!a.strict_eq(&b));
    }

    #[test]
    fn test_debug_marks_cycles() {
        let mut a = Var::tagged("Loop").with("n", 1);
        let alias = a.clone();
        a.set("self", alias).unwrap();
        let text = format!("{:?}", a);
        assert!(text.contains("Loop"));
        assert!(text.contains("<cycle>"));
        a.remove("self");

        let shared = Var::array_from([7]);
        let v = Var::array_from([shared.clone(), shared]);
        assert!(!format!("{:?}", v).contains("<cycle>"));
    }

    #[test]
    fn test_object_equality_respects_order() {
        let a: Dict = vec![
            ("x".to_string(), Var::from(1)),
            ("y".to_string(), Var::from(2)),
        ]
        .into_iter()
        .collect();
        let b: Dict = vec![
            ("y".to_string(), Var::from(2)),
            ("x".to_string(), Var::from(1)),
        ]
        .into_iter()
        .collect();
        let (a, b) = (Var::from(a), Var::from(b));
        assert_ne!(a, b);
        assert!(!a.strict_eq(&b));
        assert_eq!(a, a.deep_clone());
    }

    #[test]
    fn test_tryfrom() {
        assert_eq!(i64::try_from(Var::from(42.0)).unwrap(), 42);
        assert!(i64::try_from(Var::from(42.5)).is_err());
        assert_eq!(i32::try_from(Var::from(7)).unwrap(), 7);
        assert!(i32::try_from(Var::from(1e12)).is_err());
        assert_eq!(f64::try_from(Var::from(3.5)).unwrap(), 3.5);
        assert!(bool::try_from(Var::from(1)).is_err());
        assert_eq!(String::try_from(Var::from("hi")).unwrap(), "hi");
        assert!(matches!(
            String::try_from(Var::Nul),
            Err(crate::Error::TypeMismatch { .. })
        ));
    }
}
