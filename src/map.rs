//! Ordered map type backing XDL objects.
//!
//! [`Dict`] wraps an [`IndexMap`] so that object fields keep their insertion
//! order, and carries the optional type tag of a named object such as
//! `Point{x=1,y=2}`. Insertion order is part of the encoding contract: the
//! encoders write fields exactly in the order they were first inserted.
//!
//! ## Examples
//!
//! ```rust
//! use serde_xdl::{Dict, Var};
//!
//! let mut map = Dict::new();
//! map.insert("name".to_string(), Var::from("Alice"));
//! map.insert("age".to_string(), Var::from(30));
//! map.insert("name".to_string(), Var::from("Bob"));
//!
//! assert_eq!(map.len(), 2);
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["name", "age"]);
//! ```

use crate::Var;
use indexmap::IndexMap;

/// An ordered map of string keys to values, plus an optional type tag.
///
/// Re-inserting an existing key replaces the value in place; the key keeps
/// its original position.
#[derive(Debug, Clone, Default)]
pub struct Dict {
    tag: Option<String>,
    entries: IndexMap<String, Var>,
}

impl Dict {
    /// Creates an empty, untagged `Dict`.
    #[must_use]
    pub fn new() -> Self {
        Dict::default()
    }

    /// Creates an empty `Dict` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Dict {
            tag: None,
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Creates an empty `Dict` carrying a type tag.
    #[must_use]
    pub fn tagged(tag: impl Into<String>) -> Self {
        Dict {
            tag: Some(tag.into()),
            entries: IndexMap::new(),
        }
    }

    /// The type tag, if this object was named (`A{...}`).
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn set_tag(&mut self, tag: Option<String>) {
        self.tag = tag;
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned and
    /// the key keeps its position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_xdl::{Dict, Var};
    ///
    /// let mut map = Dict::new();
    /// assert!(map.insert("key".to_string(), Var::from(42)).is_none());
    /// assert!(map.insert("key".to_string(), Var::from(43)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: Var) -> Option<Var> {
        self.entries.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Var> {
        self.entries.get(key)
    }

    /// Removes a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Var> {
        self.entries.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of elements in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Var> {
        self.entries.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Var> {
        self.entries.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Var> {
        self.entries.iter()
    }
}

impl IntoIterator for Dict {
    type Item = (String, Var);
    type IntoIter = indexmap::map::IntoIter<String, Var>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = (&'a String, &'a Var);
    type IntoIter = indexmap::map::Iter<'a, String, Var>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(String, Var)> for Dict {
    fn from_iter<T: IntoIterator<Item = (String, Var)>>(iter: T) -> Self {
        Dict {
            tag: None,
            entries: IndexMap::from_iter(iter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reinsert_keeps_position() {
        let mut map = Dict::new();
        map.insert("a".to_string(), Var::from(1));
        map.insert("b".to_string(), Var::from(2));
        map.insert("a".to_string(), Var::from(3));

        let entries: Vec<_> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        assert_eq!(
            entries,
            vec![
                ("a".to_string(), Var::from(3)),
                ("b".to_string(), Var::from(2))
            ]
        );
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut map: Dict = vec![
            ("x".to_string(), Var::from(1)),
            ("y".to_string(), Var::from(2)),
            ("z".to_string(), Var::from(3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(map.remove("x"), Some(Var::from(1)));
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["y", "z"]);
        assert!(map.remove("x").is_none());
    }

    #[test]
    fn test_tag() {
        let mut map = Dict::tagged("Point");
        assert_eq!(map.tag(), Some("Point"));
        map.set_tag(None);
        assert_eq!(map.tag(), None);
    }
}
