//! Weighted prefix tree for topic autocomplete.
//!
//! Nodes live in an index-addressed arena. Every traversal uses an explicit
//! stack, so neither queries nor drops recurse on long inputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default number of suggestions returned by [`PrefixIndex::autocomplete`].
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<char, NodeId>,
    is_end: bool,
    weight: u64,
}

/// A completed word and its ranking weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub word: String,
    pub weight: u64,
}

/// Case-insensitive weighted prefix index.
#[derive(Debug)]
pub struct PrefixIndex {
    nodes: Vec<TrieNode>,
    free: Vec<NodeId>,
    words: usize,
}

fn normalize(word: &str) -> String {
    word.to_lowercase()
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            free: Vec::new(),
            words: 0,
        }
    }

    /// Insert `word` with weight 1.
    pub fn insert(&mut self, word: &str) {
        self.insert_weighted(word, 1);
    }

    /// Insert `word`, overwriting the weight of an existing entry.
    /// Empty words are ignored.
    pub fn insert_weighted(&mut self, word: &str, weight: u64) {
        let word = normalize(word);
        if word.is_empty() {
            return;
        }
        let node = self.walk_or_create(&word);
        self.mark_word(node).weight = weight;
    }

    /// Add `delta` to the weight of `word`, inserting it at `delta` when
    /// absent. Returns the resulting weight (0 for an empty word).
    pub fn reinforce(&mut self, word: &str, delta: u64) -> u64 {
        let word = normalize(word);
        if word.is_empty() {
            return 0;
        }
        let node = self.walk_or_create(&word);
        let was_word = self.nodes[node].is_end;
        let entry = self.mark_word(node);
        entry.weight = if was_word { entry.weight.saturating_add(delta) } else { delta };
        entry.weight
    }

    /// True iff `word` was inserted as a complete word.
    pub fn search(&self, word: &str) -> bool {
        self.weight(word).is_some()
    }

    /// Weight of a complete word, if present.
    pub fn weight(&self, word: &str) -> Option<u64> {
        let word = normalize(word);
        if word.is_empty() {
            return None;
        }
        let node = &self.nodes[self.find(&word)?];
        node.is_end.then_some(node.weight)
    }

    /// Up to `limit` words starting with `prefix`, heaviest first.
    /// Equal weights are ordered alphabetically.
    pub fn autocomplete(&self, prefix: &str, limit: usize) -> Vec<Suggestion> {
        let prefix = normalize(prefix);
        let Some(start) = self.find(&prefix) else {
            return Vec::new();
        };
        let mut matches = self.collect_from(start, prefix);
        matches.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.word.cmp(&b.word)));
        matches.truncate(limit);
        matches
    }

    /// Remove `word` and prune branches that no longer lead to a word.
    /// Returns whether the word existed.
    pub fn delete(&mut self, word: &str) -> bool {
        let word = normalize(word);
        if word.is_empty() {
            return false;
        }

        let mut path: Vec<(NodeId, char)> = Vec::with_capacity(word.len());
        let mut current = ROOT;
        for ch in word.chars() {
            let Some(&next) = self.nodes[current].children.get(&ch) else {
                return false;
            };
            path.push((current, ch));
            current = next;
        }
        if !self.nodes[current].is_end {
            return false;
        }

        self.nodes[current].is_end = false;
        self.nodes[current].weight = 0;
        self.words -= 1;

        let mut node = current;
        while let Some((parent, ch)) = path.pop() {
            let entry = &self.nodes[node];
            if entry.is_end || !entry.children.is_empty() {
                break;
            }
            self.nodes[parent].children.remove(&ch);
            self.release(node);
            node = parent;
        }
        true
    }

    /// Every complete word, alphabetically.
    pub fn get_all_words(&self) -> Vec<String> {
        let mut words: Vec<String> = self
            .collect_from(ROOT, String::new())
            .into_iter()
            .map(|s| s.word)
            .collect();
        words.sort();
        words
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(TrieNode::default());
        self.free.clear();
        self.words = 0;
    }

    /// Number of complete words.
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Live nodes including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    fn find(&self, word: &str) -> Option<NodeId> {
        let mut current = ROOT;
        for ch in word.chars() {
            current = *self.nodes[current].children.get(&ch)?;
        }
        Some(current)
    }

    fn walk_or_create(&mut self, word: &str) -> NodeId {
        let mut current = ROOT;
        for ch in word.chars() {
            current = match self.nodes[current].children.get(&ch) {
                Some(&child) => child,
                None => {
                    let child = self.alloc();
                    self.nodes[current].children.insert(ch, child);
                    child
                }
            };
        }
        current
    }

    fn mark_word(&mut self, node: NodeId) -> &mut TrieNode {
        let entry = &mut self.nodes[node];
        if !entry.is_end {
            entry.is_end = true;
            self.words += 1;
        }
        entry
    }

    fn collect_from(&self, start: NodeId, prefix: String) -> Vec<Suggestion> {
        let mut out = Vec::new();
        let mut stack = vec![(start, prefix)];
        while let Some((id, mut word)) = stack.pop() {
            let node = &self.nodes[id];
            if node.is_end {
                out.push(Suggestion { word: word.clone(), weight: node.weight });
            }
            // The last child takes ownership of the buffer so a long single
            // chain is walked without re-copying its prefix at every level.
            let mut children = node.children.iter().peekable();
            while let Some((&ch, &child)) = children.next() {
                if children.peek().is_some() {
                    let mut next = word.clone();
                    next.push(ch);
                    stack.push((child, next));
                } else {
                    word.push(ch);
                    stack.push((child, word));
                    break;
                }
            }
        }
        out
    }

    fn alloc(&mut self) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = TrieNode::default();
                id
            }
            None => {
                self.nodes.push(TrieNode::default());
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.nodes[id] = TrieNode::default();
        self.free.push(id);
    }
}

impl Default for PrefixIndex {
    fn default() -> Self {
        Self::new()
    }
}
