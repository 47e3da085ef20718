//! `Settings` — ordered configuration map with shallow-merge semantics.
//!
//! A behavior carries one `Settings` per attaching model.  Re-attaching with
//! new configuration *merges* rather than replaces: keys present in the new
//! configuration win, keys not mentioned persist.  `BTreeMap` keeps iteration
//! order deterministic, which tests and diff-style logging rely on.

use std::collections::BTreeMap;

use crate::Value;

/// An ordered `key → Value` map.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    inner: BTreeMap<String, Value>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert: `Settings::new().with("before", "on")`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or overwrite a single key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner.insert(key.into(), value.into());
    }

    /// Shallow merge: every key in `other` overwrites the same key here;
    /// keys absent from `other` are left untouched.
    pub fn merge(&mut self, other: &Settings) {
        for (k, v) in &other.inner {
            self.inner.insert(k.clone(), v.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    /// String value for `key`, or `None` if absent or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.inner.get(key).and_then(Value::as_str)
    }

    /// Bool value for `key`, or `None` if absent or not a bool.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.inner.get(key).and_then(Value::as_bool)
    }

    /// Integer value for `key`, or `None` if absent or not an integer.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.inner.get(key).and_then(Value::as_int)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut s = Settings::new();
        for (k, v) in iter {
            s.set(k, v);
        }
        s
    }
}
