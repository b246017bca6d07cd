//! Request prioritization.
//!
//! Lower numeric priority is served first. Items sharing a priority come
//! out in insertion order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Numeric request priority. Lower values are served first.
pub type Priority = i64;

/// Item with associated priority for queue ordering.
#[derive(Debug)]
pub struct PrioritizedItem<T> {
    pub priority: Priority,
    pub sequence: u64,
    pub item: T,
}

impl<T> PartialEq for PrioritizedItem<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl<T> Eq for PrioritizedItem<T> {}

impl<T> PartialOrd for PrioritizedItem<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for PrioritizedItem<T> {
    // BinaryHeap is a max-heap: invert both keys so the smallest
    // priority, then the smallest sequence, sits on top.
    fn cmp(&self, other: &Self) -> Ordering {
        match other.priority.cmp(&self.priority) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            ord => ord,
        }
    }
}

/// Min-priority queue with FIFO tie-breaking.
pub struct PriorityQueue<T> {
    heap: BinaryHeap<PrioritizedItem<T>>,
    next_sequence: u64,
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    pub fn push(&mut self, item: T, priority: Priority) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(PrioritizedItem { priority, sequence, item });
    }

    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|p| p.item)
    }

    pub fn peek(&self) -> Option<&T> {
        self.heap.peek().map(|p| &p.item)
    }

    /// Iterate entries in arbitrary heap order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.heap.iter().map(|p| &p.item)
    }

    /// Drop entries for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.heap.retain(|p| keep(&p.item));
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_sequence = 0;
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_lowest_priority_first() {
        let mut queue = PriorityQueue::new();
        queue.push("two", 2);
        queue.push("one", 1);
        queue.push("three", 3);

        assert_eq!(queue.pop(), Some("one"));
        assert_eq!(queue.pop(), Some("two"));
        assert_eq!(queue.pop(), Some("three"));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn fifo_within_same_priority() {
        let mut queue = PriorityQueue::new();
        queue.push("first", 5);
        queue.push("second", 5);
        queue.push("urgent", -1);
        queue.push("third", 5);

        assert_eq!(queue.pop(), Some("urgent"));
        assert_eq!(queue.pop(), Some("first"));
        assert_eq!(queue.pop(), Some("second"));
        assert_eq!(queue.pop(), Some("third"));
    }

    #[test]
    fn peek_does_not_remove() {
        let mut queue = PriorityQueue::new();
        queue.push(10u32, 3);
        queue.push(20u32, 1);

        assert_eq!(queue.peek(), Some(&20));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn retain_and_clear() {
        let mut queue = PriorityQueue::new();
        for i in 0..6 {
            queue.push(i, i as Priority);
        }
        queue.retain(|v| v % 2 == 0);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(0));

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }
}
