use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::util::text::is_blank;

/// Ordered, duplicate-free mapping of fact keys to values.
///
/// Backed by a `BTreeMap`, so iteration is always sorted by key and every
/// serializer sees the same order regardless of which provider wrote first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactStore {
    facts: BTreeMap<String, String>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a fact.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.facts.insert(key.into(), value.into());
    }

    /// Insert the fact only when `value` is present and not blank.
    pub fn set_if_not_blank(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !is_blank(v)) {
            self.set(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.facts.get(key).map(String::as_str)
    }

    /// The value of `key` unless it is absent or blank.
    pub fn get_non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !is_blank(v))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.facts.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.facts.remove(key)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Facts in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.facts.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.facts.keys().map(String::as_str)
    }

    /// Facts whose key starts with `prefix`, in key order.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.facts
            .range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy every fact of `other` into this store, replacing duplicates.
    pub fn extend(&mut self, other: &FactStore) {
        for (k, v) in other.iter() {
            self.set(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FactStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = FactStore::new();
        for (k, v) in iter {
            store.set(k, v);
        }
        store
    }
}
