//! Resolved referenced records, keyed by canonical reference string.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strand_types::Reference;

use crate::format::encode_reference;

/// Records the persistence layer resolved for one response.
///
/// The map is built once per fetch and handed unchanged to the serializer,
/// which emits every entry exactly once in a dedicated section. Entries are
/// ordered by canonical string so output is deterministic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefsMap<T> {
    entries: BTreeMap<String, T>,
}

impl<T> RefsMap<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert a record under a canonical reference string.
    /// Returns the previous record at that key, if any.
    pub fn insert(&mut self, key: impl Into<String>, record: T) -> Option<T> {
        self.entries.insert(key.into(), record)
    }

    /// Insert a record for `reference`.
    pub fn insert_reference(&mut self, reference: &Reference, record: T) -> Option<T> {
        self.insert(encode_reference(reference), record)
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn get_reference(&self, reference: &Reference) -> Option<&T> {
        self.entries.get(&encode_reference(reference))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in canonical-string order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, T> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<T> Default for RefsMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntoIterator for RefsMap<T> {
    type Item = (String, T);
    type IntoIter = btree_map::IntoIter<String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a RefsMap<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = btree_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T> FromIterator<(String, T)> for RefsMap<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_by_reference() {
        let mut map = RefsMap::new();
        let r = Reference::new("Person", "42");
        assert!(map.insert_reference(&r, "Alice").is_none());
        assert_eq!(map.get("ref:Person:42"), Some(&"Alice"));
        assert_eq!(map.get_reference(&r), Some(&"Alice"));
        assert!(map.contains("ref:Person:42"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn same_identity_stored_once() {
        let mut map = RefsMap::new();
        map.insert("ref:Person:1", 1);
        assert_eq!(map.insert("ref:Person:1", 2), Some(1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn iteration_is_ordered() {
        let map: RefsMap<u8> = [("ref:B:1".to_string(), 2), ("ref:A:1".to_string(), 1)]
            .into_iter()
            .collect();
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["ref:A:1", "ref:B:1"]);
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut map = RefsMap::new();
        map.insert("ref:Person:42", "Alice");
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"ref:Person:42":"Alice"}"#);
    }
}
