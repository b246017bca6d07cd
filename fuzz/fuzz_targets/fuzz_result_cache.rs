//! Fuzz target for the fixed-capacity LRU cache.
//!
//! Size must never exceed capacity and every snapshot must agree with
//! point lookups.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use trivia_core::memory::FixedCapacityCache;

#[derive(Debug, Arbitrary)]
enum Op {
    Put(u8, u16),
    Get(u8),
    Delete(u8),
    Clear,
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let mut cache = FixedCapacityCache::new(usize::from(input.capacity));

    for op in input.ops {
        match op {
            Op::Put(k, v) => {
                cache.put(k, v);
                assert_eq!(cache.peek(&k), Some(&v));
            }
            Op::Get(k) => {
                let _ = cache.get(&k);
            }
            Op::Delete(k) => {
                cache.delete(&k);
                assert!(!cache.contains(&k));
            }
            Op::Clear => cache.clear(),
        }
        assert!(cache.size() <= cache.capacity());
        for (k, v) in cache.entries() {
            assert_eq!(cache.peek(&k), Some(&v));
        }
    }
});
