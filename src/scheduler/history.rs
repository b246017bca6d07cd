//! Bounded history of dequeued requests.

use std::collections::VecDeque;

use super::request::{RequestId, RequestItem, RequestStatus};

/// Default number of dequeued items retained.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Ring of recently dequeued items, oldest evicted first.
#[derive(Debug)]
pub struct RecentHistory {
    items: VecDeque<RequestItem>,
    capacity: usize,
}

impl RecentHistory {
    /// Capacity is floored at 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an item, returning the evicted oldest entry if full.
    pub fn push(&mut self, item: RequestItem) -> Option<RequestItem> {
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    /// Set the status of a retained entry. Returns false if not retained.
    pub fn set_status(&mut self, id: &RequestId, status: RequestStatus) -> bool {
        match self.items.iter_mut().rev().find(|item| item.id == *id) {
            Some(item) => {
                item.status = status;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &RequestId) -> bool {
        self.items.iter().any(|item| item.id == *id)
    }

    /// Snapshot, oldest first.
    pub fn to_vec(&self) -> Vec<RequestItem> {
        self.items.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestItem> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
