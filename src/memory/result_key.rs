//! Cache keys for finished generation results.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

/// Normalized (topic, difficulty) pair identifying a generation result.
///
/// Normalization applies NFKC, collapses runs of whitespace and lowercases,
/// so `"  World  History"` and `"world history"` share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultKey {
    topic: String,
    difficulty: String,
}

fn normalize(text: &str) -> String {
    let composed: String = text.nfkc().collect();
    composed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl ResultKey {
    pub fn new(topic: &str, difficulty: &str) -> Self {
        Self {
            topic: normalize(topic),
            difficulty: normalize(difficulty),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    /// Hex SHA-256 of the normalized pair, for use as an external store key.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.topic.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.difficulty.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.topic, self.difficulty)
    }
}
