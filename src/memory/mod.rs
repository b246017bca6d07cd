//! Result caching for finished question generations.
//!
//! Provides the generic fixed-capacity LRU cache and the normalized key
//! used to short-circuit repeated (topic, difficulty) requests.

mod cache;
mod result_key;

pub use cache::{FixedCapacityCache, Iter, DEFAULT_CACHE_CAPACITY};
pub use result_key::ResultKey;

/// LRU cache of generation results keyed by (topic, difficulty).
pub type ResultCache<V> = FixedCapacityCache<ResultKey, V>;
