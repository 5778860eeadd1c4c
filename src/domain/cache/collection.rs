//! Per-resource collections of cached attribute sets

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Identifier of a cached object (primary key or composite string)
pub type ObjectKey = String;

/// Cached subset of an object's fields, keyed by attribute name
pub type AttributeSet = serde_json::Map<String, Value>;

/// Insertion-ordered mapping of object key to attribute set
///
/// Re-inserting an existing key replaces its attributes but keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    order: Vec<ObjectKey>,
    entries: HashMap<ObjectKey, AttributeSet>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the attribute set stored under `key`
    pub fn upsert(&mut self, key: ObjectKey, attributes: AttributeSet) {
        if !self.entries.contains_key(&key) {
            self.order.push(key.clone());
        }

        self.entries.insert(key, attributes);
    }

    /// Removes `key`, returning its attribute set if it was present
    pub fn remove(&mut self, key: &str) -> Option<AttributeSet> {
        let removed = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    /// Removes every key in the batch with a single pass over the insertion
    /// order, returning the keys that were not present
    pub fn remove_all<'a, I>(&mut self, keys: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut removed = HashSet::new();
        let mut missing = Vec::new();

        for key in keys {
            if self.entries.remove(key).is_some() {
                removed.insert(key);
            } else {
                missing.push(key);
            }
        }

        if !removed.is_empty() {
            self.order.retain(|k| !removed.contains(k.as_str()));
        }

        missing
    }

    pub fn get(&self, key: &str) -> Option<&AttributeSet> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Object keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &ObjectKey> {
        self.order.iter()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&ObjectKey, &AttributeSet)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|attrs| (key, attrs)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;

        for (key, attributes) in self.iter() {
            map.serialize_entry(key, attributes)?;
        }

        map.end()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}

impl IntoIterator for Collection {
    type Item = (ObjectKey, AttributeSet);
    type IntoIter = std::vec::IntoIter<(ObjectKey, AttributeSet)>;

    fn into_iter(self) -> Self::IntoIter {
        let Collection { order, mut entries } = self;

        order
            .into_iter()
            .filter_map(|key| entries.remove(&key).map(|attrs| (key, attrs)))
            .collect::<Vec<_>>()
            .into_iter()
    }
}

impl FromIterator<(ObjectKey, AttributeSet)> for Collection {
    fn from_iter<I: IntoIterator<Item = (ObjectKey, AttributeSet)>>(iter: I) -> Self {
        let mut collection = Collection::new();

        for (key, attributes) in iter {
            collection.upsert(key, attributes);
        }

        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> AttributeSet {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_upsert_keeps_insertion_order() {
        let mut collection = Collection::new();
        collection.upsert("b".into(), attrs(json!({"x": 1})));
        collection.upsert("a".into(), attrs(json!({"x": 2})));
        collection.upsert("b".into(), attrs(json!({"y": 3})));

        let keys: Vec<&str> = collection.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(collection.get("b"), Some(&attrs(json!({"y": 3}))));
    }

    #[test]
    fn test_remove() {
        let mut collection = Collection::new();
        collection.upsert("a".into(), attrs(json!({"x": 1})));
        collection.upsert("b".into(), attrs(json!({"x": 2})));

        assert!(collection.remove("a").is_some());
        assert!(collection.remove("a").is_none());
        assert_eq!(collection.len(), 1);
        assert!(!collection.contains_key("a"));
        assert!(collection.contains_key("b"));
    }

    #[test]
    fn test_remove_all_reports_missing_keys() {
        let mut collection: Collection = ["a", "b", "c", "d"]
            .into_iter()
            .map(|k| (k.to_string(), attrs(json!({}))))
            .collect();

        let missing = collection.remove_all(["c", "x", "a", "c"]);

        assert_eq!(missing, vec!["x", "c"]);
        let keys: Vec<&str> = collection.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "d"]);
    }

    #[test]
    fn test_clear() {
        let mut collection: Collection = vec![("a".to_string(), attrs(json!({"x": 1})))]
            .into_iter()
            .collect();

        collection.clear();

        assert!(collection.is_empty());
        assert_eq!(collection.keys().count(), 0);
    }

    #[test]
    fn test_serialize_preserves_order() {
        let collection: Collection = vec![
            ("z".to_string(), attrs(json!({"n": 1}))),
            ("a".to_string(), attrs(json!({"n": 2}))),
        ]
        .into_iter()
        .collect();

        assert_eq!(collection.to_string(), r#"{"z":{"n":1},"a":{"n":2}}"#);
    }
}
