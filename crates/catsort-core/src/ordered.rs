//! Insertion-ordered collections with O(1) duplicate checks.
//!
//! Both the taxonomy mapping (first registration wins) and the per-row
//! category list (first seen wins) need a stable order independent of any
//! hash map iteration order.

use std::collections::HashMap;
use std::hash::Hash;

/// Ordered map: entries in first-insertion order plus a key index.
#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the key is already present. Returns `true` if inserted.
    ///
    /// The value is built lazily so callers can skip expensive construction
    /// for keys that lose to an earlier registration.
    pub fn insert_with<E>(
        &mut self,
        key: K,
        make: impl FnOnce() -> Result<V, E>,
    ) -> Result<bool, E> {
        if self.index.contains_key(&key) {
            return Ok(false);
        }
        let value = make()?;
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        Ok(true)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    #[cfg(test)]
    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.index.contains_key(key)
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered set of strings that keeps the first occurrence of each value.
#[derive(Debug, Clone, Default)]
pub struct OrderedSet {
    items: Vec<String>,
    seen: std::collections::HashSet<String>,
}

impl OrderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` unless already present. Returns `true` if appended.
    pub fn push(&mut self, value: &str) -> bool {
        if self.seen.contains(value) {
            return false;
        }
        self.seen.insert(value.to_string());
        self.items.push(value.to_string());
        true
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok<T>(v: T) -> Result<T, ()> {
        Ok(v)
    }

    #[test]
    fn map_first_insert_wins() {
        let mut map = OrderedMap::new();
        assert_eq!(map.insert_with("a".to_string(), || ok(1)), Ok(true));
        assert_eq!(map.insert_with("a".to_string(), || ok(2)), Ok(false));
        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn map_skips_builder_for_existing_key() {
        let mut map = OrderedMap::new();
        map.insert_with("a".to_string(), || ok(1)).unwrap();
        let result = map.insert_with("a".to_string(), || -> Result<i32, ()> {
            panic!("builder must not run for a duplicate key")
        });
        assert_eq!(result, Ok(false));
    }

    #[test]
    fn map_preserves_insertion_order() {
        let mut map = OrderedMap::new();
        for key in ["zeta", "alpha", "mid", "alpha"] {
            map.insert_with(key.to_string(), || ok(key.len())).unwrap();
        }
        let keys: Vec<&str> = map.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn map_builder_error_leaves_map_untouched() {
        let mut map: OrderedMap<String, i32> = OrderedMap::new();
        assert_eq!(map.insert_with("a".to_string(), || Err("boom")), Err("boom"));
        assert!(map.is_empty());
        assert!(!map.contains_key("a"));
    }

    #[test]
    fn set_keeps_first_seen_order() {
        let mut set = OrderedSet::new();
        assert!(set.push("Wheels"));
        assert!(set.push("Hub Caps"));
        assert!(!set.push("Wheels"));
        assert!(set.contains("Hub Caps"));
        assert_eq!(set.into_vec(), vec!["Wheels", "Hub Caps"]);
    }
}
