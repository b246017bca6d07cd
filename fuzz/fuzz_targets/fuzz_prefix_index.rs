//! Fuzz target for prefix index operations.
//!
//! Arbitrary insert/delete/autocomplete sequences must never panic and
//! must keep the word set consistent with a reference map.

#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use trivia_core::index::PrefixIndex;

#[derive(Debug, Arbitrary)]
enum Op {
    Insert(String),
    InsertWeighted(String, u64),
    Reinforce(String, u8),
    Delete(String),
    Autocomplete(String, u8),
    Clear,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut index = PrefixIndex::new();
    let mut reference: BTreeMap<String, u64> = BTreeMap::new();

    for op in ops {
        match op {
            Op::Insert(word) => {
                index.insert(&word);
                if !word.is_empty() {
                    reference.insert(word.to_lowercase(), 1);
                }
            }
            Op::InsertWeighted(word, weight) => {
                index.insert_weighted(&word, weight);
                if !word.is_empty() {
                    reference.insert(word.to_lowercase(), weight);
                }
            }
            Op::Reinforce(word, delta) => {
                index.reinforce(&word, u64::from(delta));
                if !word.is_empty() {
                    let w = reference.entry(word.to_lowercase()).or_insert(0);
                    *w = w.saturating_add(u64::from(delta));
                }
            }
            Op::Delete(word) => {
                let removed = index.delete(&word);
                assert_eq!(removed, reference.remove(&word.to_lowercase()).is_some());
            }
            Op::Autocomplete(prefix, limit) => {
                let found = index.autocomplete(&prefix, usize::from(limit));
                assert!(found.len() <= usize::from(limit));
            }
            Op::Clear => {
                index.clear();
                reference.clear();
            }
        }
        assert_eq!(index.len(), reference.len());
    }
});
