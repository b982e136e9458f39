//! Eviction List Module
//!
//! Recency-ordered key → bytes table with O(1) touch, lookup and removal.

use std::fmt;

use lru::LruCache;

// == Eviction List ==
/// Keys ordered by access time, each holding an encoded item.
///
/// Capacity is unbounded; the bounded store decides when to evict.
/// Every removal hands the entry back to the caller so the caller can
/// account for it.
pub struct EvictionList {
    entries: LruCache<String, Vec<u8>>,
}

impl EvictionList {
    // == Insert ==
    /// Inserts as most recently used. Returns the displaced bytes if the
    /// key was already present.
    pub fn insert(&mut self, key: String, bytes: Vec<u8>) -> Option<Vec<u8>> {
        self.entries.put(key, bytes)
    }

    // == Get ==
    /// Looks up a key and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&Vec<u8>> {
        self.entries.get(key)
    }

    // == Peek ==
    /// Looks up a key without touching its recency.
    pub fn peek(&self, key: &str) -> Option<&Vec<u8>> {
        self.entries.peek(key)
    }

    // == Remove ==
    pub fn remove(&mut self, key: &str) -> Option<Vec<u8>> {
        self.entries.pop(key)
    }

    // == Remove Oldest ==
    /// Removes and returns the least recently used entry.
    pub fn remove_oldest(&mut self) -> Option<(String, Vec<u8>)> {
        self.entries.pop_lru()
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    /// Entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<u8>)> {
        self.entries.iter()
    }
}

impl Default for EvictionList {
    fn default() -> Self {
        Self {
            entries: LruCache::unbounded(),
        }
    }
}

impl fmt::Debug for EvictionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvictionList")
            .field("len", &self.len())
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn filled(keys: &[&str]) -> EvictionList {
        let mut list = EvictionList::default();
        for key in keys {
            list.insert(key.to_string(), key.as_bytes().to_vec());
        }
        list
    }

    fn oldest(list: &EvictionList) -> Option<&String> {
        list.iter().last().map(|(k, _)| k)
    }

    #[test]
    fn test_list_default() {
        let list = EvictionList::default();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(oldest(&list).is_none());
    }

    #[test]
    fn test_insert_orders_by_arrival() {
        let list = filled(&["key1", "key2", "key3"]);

        assert_eq!(list.len(), 3);
        assert_eq!(oldest(&list), Some(&"key1".to_string()));
    }

    #[test]
    fn test_insert_existing_returns_displaced() {
        let mut list = filled(&["key1"]);

        let displaced = list.insert("key1".to_string(), b"new".to_vec());
        assert_eq!(displaced, Some(b"key1".to_vec()));
        assert_eq!(list.len(), 1);
        assert_eq!(list.peek("key1"), Some(&b"new".to_vec()));
    }

    #[test]
    fn test_get_touches_peek_does_not() {
        let mut list = filled(&["a", "b", "c"]);

        list.peek("a");
        assert_eq!(oldest(&list), Some(&"a".to_string()));

        list.get("a");
        assert_eq!(oldest(&list), Some(&"b".to_string()));
    }

    #[test]
    fn test_remove_oldest_order() {
        let mut list = filled(&["a", "b", "c"]);
        list.get("a");

        assert_eq!(list.remove_oldest().map(|(k, _)| k), Some("b".to_string()));
        assert_eq!(list.remove_oldest().map(|(k, _)| k), Some("c".to_string()));
        assert_eq!(list.remove_oldest().map(|(k, _)| k), Some("a".to_string()));
        assert!(list.remove_oldest().is_none());
    }

    #[test]
    fn test_remove_by_key() {
        let mut list = filled(&["key1", "key2", "key3"]);

        assert_eq!(list.remove("key2"), Some(b"key2".to_vec()));
        assert_eq!(list.len(), 2);
        assert!(!list.contains("key2"));
        assert!(list.contains("key1"));
        assert!(list.contains("key3"));
    }

    #[test]
    fn test_remove_nonexistent_key() {
        let mut list = filled(&["key1", "key2"]);

        assert!(list.remove("nonexistent").is_none());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_iter_most_recent_first() {
        let list = filled(&["a", "b", "c"]);
        let keys: Vec<&String> = list.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["c", "b", "a"]);
    }
}
