//! Topic indexing for autocomplete and suggestion.

mod prefix;

pub use prefix::{PrefixIndex, Suggestion, DEFAULT_SUGGESTION_LIMIT};
