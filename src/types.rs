use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// The current value of a variable. `None` (never set, or set to absent) is
/// distinct from `Some("")`.
pub type Value = Option<String>;

/// A declared variable name.
///
/// Cheap to clone and compared by value. Lookups elsewhere in the crate take
/// `&str`, which `Key` borrows as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Arc<str>);

impl Key {
    pub fn new(name: &str) -> Self {
        Key(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::new(name)
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Anything that can be stored as a variable value.
///
/// Implemented for string types and their `Option`s so that both
/// `set("host", "0.0.0.0")` and `set("host", None::<&str>)` read naturally.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Some(self.to_string())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Some(self)
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Value {
        Some(self.clone())
    }
}

impl IntoValue for Option<&str> {
    fn into_value(self) -> Value {
        self.map(str::to_string)
    }
}

impl IntoValue for Option<String> {
    fn into_value(self) -> Value {
        self
    }
}

/// A scalar decoded from a config file, before coercion to a string.
///
/// See [`Scalar::to_config_string`](crate::coerce) for the coercion rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// A date/time literal, kept in its textual form.
    Datetime(String),
}

/// An immutable copy of every variable and its value, in declaration order.
///
/// Returned by [`Registry::dump`](crate::Registry::dump) and by the loaders.
/// Nothing done to the registry afterwards changes a snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Snapshot(pub(crate) IndexMap<Key, Value>);

impl Snapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a Key, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One declared variable: its name, default and optional doc comment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDecl {
    pub name: Key,
    pub default: Value,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_compares_by_value() {
        assert_eq!(Key::new("my_var"), Key::from("my_var"));
        assert_ne!(Key::new("my_var"), Key::new("MY_VAR"));
        assert_eq!(Key::new("host"), "host");
    }

    #[test]
    fn into_value_distinguishes_absent_from_empty() {
        assert_eq!("".into_value(), Some(String::new()));
        assert_eq!(None::<&str>.into_value(), None);
        assert_eq!(Some("x".to_string()).into_value(), Some("x".into()));
    }

    #[test]
    fn snapshot_serializes_as_a_map() {
        let mut map = IndexMap::new();
        map.insert(Key::new("host"), Some("localhost".to_string()));
        map.insert(Key::new("url"), None);
        let json = serde_json::to_string(&Snapshot(map)).unwrap();
        assert_eq!(json, r#"{"host":"localhost","url":null}"#);
    }
}
