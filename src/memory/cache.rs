//! Fixed-capacity LRU cache.
//!
//! Entries are stored densely in a `Vec` and linked into a recency list by
//! index. The key table maps each key to its slot. Removing a slot moves
//! the last entry into the hole and repairs its links, so the vector
//! never holds dead entries.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Default capacity for result caches.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Generic least-recently-used cache with a fixed capacity.
#[derive(Debug)]
pub struct FixedCapacityCache<K, V> {
    map: HashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    /// Most recently used.
    head: Option<usize>,
    /// Least recently used.
    tail: Option<usize>,
    capacity: usize,
}

impl<K, V> FixedCapacityCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a cache holding at most `capacity` entries (floored at 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            map: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
            capacity,
        }
    }

    /// Fetch a value and mark it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.promote(idx);
        Some(&self.nodes[idx].value)
    }

    /// Fetch a value without touching recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).map(|&idx| &self.nodes[idx].value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Insert or update `key` as most recently used.
    ///
    /// Returns the entry evicted to make room, if any.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.map.get(&key) {
            self.nodes[idx].value = value;
            self.promote(idx);
            return None;
        }

        let evicted = if self.nodes.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };

        let idx = self.nodes.len();
        self.nodes.push(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.map.insert(key, idx);
        self.attach_front(idx);
        evicted
    }

    /// Remove `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.map.remove(key)?;
        Some(self.remove_at(idx).value)
    }

    /// Remove `key`. Returns whether an entry was removed.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
        }
    }

    pub fn keys(&self) -> Vec<K> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn entries(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn pop_lru(&mut self) -> Option<(K, V)> {
        let idx = self.tail?;
        self.map.remove(&self.nodes[idx].key);
        let node = self.remove_at(idx);
        tracing::trace!(capacity = self.capacity, "cache entry evicted");
        Some((node.key, node.value))
    }

    /// Unlink and remove slot `idx`. The caller has already dropped its
    /// key from the table.
    fn remove_at(&mut self, idx: usize) -> Node<K, V> {
        self.detach(idx);
        let last = self.nodes.len() - 1;
        if idx != last {
            let (prev, next) = (self.nodes[last].prev, self.nodes[last].next);
            match prev {
                Some(p) => self.nodes[p].next = Some(idx),
                None => self.head = Some(idx),
            }
            match next {
                Some(n) => self.nodes[n].prev = Some(idx),
                None => self.tail = Some(idx),
            }
            if let Some(slot) = self.map.get_mut(&self.nodes[last].key) {
                *slot = idx;
            }
        }
        self.nodes.swap_remove(idx)
    }

    fn promote(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.detach(idx);
        self.attach_front(idx);
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
    }

    fn attach_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;
        match self.head {
            Some(h) => self.nodes[h].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }
}

impl<K, V> Default for FixedCapacityCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

/// Recency-ordered iterator over cache entries.
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    cursor: Option<usize>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes: &'a [Node<K, V>] = self.nodes;
        let node = &nodes[self.cursor?];
        self.cursor = node.next;
        Some((&node.key, &node.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(keys: &[&'static str]) -> FixedCapacityCache<&'static str, usize> {
        let mut cache = FixedCapacityCache::new(keys.len());
        for (i, k) in keys.iter().enumerate() {
            cache.put(*k, i);
        }
        cache
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = filled(&["a", "b", "c"]);
        let evicted = cache.put("d", 3);
        assert_eq!(evicted, Some(("a", 0)));
        assert!(cache.get("a").is_none());
        assert_eq!(cache.size(), 3);
    }

    #[test]
    fn get_protects_from_eviction() {
        let mut cache = filled(&["a", "b", "c"]);
        assert_eq!(cache.get("a"), Some(&0));
        cache.put("d", 3);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
    }

    #[test]
    fn miss_has_no_side_effects() {
        let mut cache = filled(&["a", "b"]);
        assert!(cache.get("zzz").is_none());
        assert_eq!(cache.keys(), vec!["b", "a"]);
    }

    #[test]
    fn put_existing_updates_and_promotes() {
        let mut cache = filled(&["a", "b", "c"]);
        assert!(cache.put("a", 42).is_none());
        assert_eq!(cache.size(), 3);
        assert_eq!(cache.peek("a"), Some(&42));
        cache.put("d", 3);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
    }

    #[test]
    fn peek_does_not_promote() {
        let mut cache = filled(&["a", "b"]);
        assert_eq!(cache.peek("a"), Some(&0));
        cache.put("c", 2);
        assert!(!cache.contains("a"));
    }

    #[test]
    fn delete_middle_keeps_links_consistent() {
        let mut cache = filled(&["a", "b", "c", "d"]);
        assert!(cache.delete("b"));
        assert!(!cache.delete("b"));
        assert_eq!(cache.keys(), vec!["d", "c", "a"]);

        // "d" was relocated into the freed slot; it must still resolve.
        assert_eq!(cache.get("d"), Some(&3));
        cache.put("e", 4);
        cache.put("f", 5);
        assert_eq!(cache.keys(), vec!["f", "e", "d", "c"]);
    }

    #[test]
    fn delete_head_and_tail() {
        let mut cache = filled(&["a", "b", "c"]);
        assert!(cache.delete("c"));
        assert!(cache.delete("a"));
        assert_eq!(cache.keys(), vec!["b"]);
        assert_eq!(cache.remove("b"), Some(1));
        assert!(cache.is_empty());
        assert!(cache.iter().next().is_none());
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let mut cache = FixedCapacityCache::new(5);
        for i in 0..100 {
            cache.put(i, i * 2);
            assert!(cache.size() <= 5);
        }
        assert_eq!(cache.keys(), vec![99, 98, 97, 96, 95]);
        assert_eq!(cache.values(), vec![198, 196, 194, 192, 190]);
    }

    #[test]
    fn zero_capacity_is_floored() {
        let mut cache = FixedCapacityCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put("a", 1);
        cache.put("b", 2);
        assert_eq!(cache.entries(), vec![("b", 2)]);
    }

    #[test]
    fn clear_empties_everything() {
        let mut cache = filled(&["a", "b", "c"]);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.keys().is_empty());
        cache.put("x", 9);
        assert_eq!(cache.entries(), vec![("x", 9)]);
    }

    #[test]
    fn string_keys_borrow_as_str() {
        let mut cache: FixedCapacityCache<String, u32> = FixedCapacityCache::new(2);
        cache.put("science".to_string(), 1);
        assert_eq!(cache.get("science"), Some(&1));
        assert!(cache.delete("science"));
    }
}
