//! Integration tests for the fixed-capacity LRU cache.

use trivia_core::memory::{FixedCapacityCache, ResultCache, ResultKey};

#[test]
fn evicts_least_recently_used() {
    let mut cache = FixedCapacityCache::new(3);
    cache.put("a", 1);
    cache.put("b", 2);
    cache.put("c", 3);

    let evicted = cache.put("d", 4);
    assert_eq!(evicted, Some(("a", 1)));
    assert!(cache.get(&"a").is_none());
    assert_eq!(cache.size(), 3);
}

#[test]
fn get_protects_from_eviction() {
    let mut cache = FixedCapacityCache::new(3);
    cache.put("a", 1);
    cache.put("b", 2);
    cache.put("c", 3);

    assert_eq!(cache.get(&"a"), Some(&1));
    cache.put("d", 4);

    assert!(cache.contains(&"a"));
    assert!(!cache.contains(&"b"));
}

#[test]
fn put_existing_updates_and_promotes() {
    let mut cache = FixedCapacityCache::new(2);
    cache.put("a", 1);
    cache.put("b", 2);
    assert!(cache.put("a", 10).is_none());
    cache.put("c", 3);

    assert_eq!(cache.peek(&"a"), Some(&10));
    assert!(!cache.contains(&"b"));
}

#[test]
fn delete_and_clear() {
    let mut cache = FixedCapacityCache::new(4);
    cache.put(1, "one");
    cache.put(2, "two");

    assert!(cache.delete(&1));
    assert!(!cache.delete(&1));
    assert_eq!(cache.size(), 1);

    cache.clear();
    assert!(cache.is_empty());
    assert!(cache.keys().is_empty());
}

#[test]
fn snapshots_cover_all_entries() {
    let mut cache = FixedCapacityCache::new(5);
    for i in 0..5 {
        cache.put(i, i * 10);
    }
    let mut keys = cache.keys();
    keys.sort();
    assert_eq!(keys, vec![0, 1, 2, 3, 4]);
    assert_eq!(cache.values().len(), 5);
    assert!(cache.entries().iter().all(|(k, v)| *v == k * 10));
}

#[test]
fn result_cache_normalizes_keys() {
    let mut cache: ResultCache<String> = ResultCache::new(8);
    cache.put(ResultKey::new("World History", "Hard"), "q1".to_string());
    assert_eq!(
        cache.get(&ResultKey::new("  world   history", "HARD")),
        Some(&"q1".to_string())
    );
}
