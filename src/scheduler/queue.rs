//! Priority scheduler for question-generation requests.
//!
//! Items live in an id-keyed table. The heap only holds `RequestId`
//! handles, so status updates never touch heap order. Handles whose item
//! has left the table (cancelled) are skipped on extraction.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::history::{RecentHistory, DEFAULT_HISTORY_CAPACITY};
use super::priority::{Priority, PriorityQueue};
use super::request::{RequestId, RequestItem, RequestStatus};
use super::stats::QueueStats;
use crate::index::{PrefixIndex, Suggestion, DEFAULT_SUGGESTION_LIMIT};
use crate::telemetry;

/// How an enqueue updates the suggestion weight of its topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionWeighting {
    /// Each enqueue adds 1, so frequent topics rank first.
    #[default]
    Accumulate,
    /// Each enqueue resets the weight to 1.
    Overwrite,
}

impl FromStr for SuggestionWeighting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accumulate" => Ok(Self::Accumulate),
            "overwrite" => Ok(Self::Overwrite),
            other => Err(format!("unknown suggestion weighting: {other}")),
        }
    }
}

impl fmt::Display for SuggestionWeighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accumulate => f.write_str("accumulate"),
            Self::Overwrite => f.write_str("overwrite"),
        }
    }
}

/// Configuration for the priority scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Dequeued items retained for `get_recent_questions`.
    pub history_capacity: usize,
    /// Default limit for `suggest_topics`.
    pub suggestion_limit: usize,
    pub weighting: SuggestionWeighting,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            weighting: SuggestionWeighting::default(),
        }
    }
}

/// Min-priority scheduler with id lookup, bounded history and topic index.
pub struct PriorityScheduler {
    queue: PriorityQueue<RequestId>,
    items: HashMap<RequestId, RequestItem>,
    history: RecentHistory,
    topics: PrefixIndex,
    /// Heap handles whose item was cancelled.
    stale: usize,
    config: SchedulerConfig,
}

impl PriorityScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            queue: PriorityQueue::new(),
            items: HashMap::new(),
            history: RecentHistory::new(config.history_capacity),
            topics: PrefixIndex::new(),
            stale: 0,
            config,
        }
    }

    /// Track a new pending request and index its topic.
    pub fn enqueue(
        &mut self,
        topic: impl Into<String>,
        difficulty: impl Into<String>,
        priority: Priority,
        requester_id: Option<String>,
    ) -> RequestId {
        let item = RequestItem::new(topic, difficulty, priority, requester_id);
        let id = item.id;

        let weight = match self.config.weighting {
            SuggestionWeighting::Accumulate => self.topics.reinforce(&item.topic, 1),
            SuggestionWeighting::Overwrite => {
                self.topics.insert(&item.topic);
                1
            }
        };

        tracing::debug!(
            request_id = %id,
            topic = %item.topic,
            difficulty = %item.difficulty,
            priority,
            topic_weight = weight,
            "request enqueued"
        );

        self.queue.push(id, priority);
        self.items.insert(id, item);
        telemetry::record_enqueued(self.items.len());
        id
    }

    /// Remove and return the lowest-priority tracked item.
    pub fn dequeue(&mut self) -> Option<RequestItem> {
        loop {
            let id = self.queue.pop()?;
            let Some(item) = self.items.remove(&id) else {
                self.stale = self.stale.saturating_sub(1);
                continue;
            };

            let now = Utc::now();
            let wait_ms = item.wait_ms(now);
            if let Some(evicted) = self.history.push(item.clone()) {
                tracing::trace!(request_id = %evicted.id, "history entry evicted");
            }

            tracing::debug!(
                request_id = %id,
                priority = item.priority,
                wait_ms,
                "request dequeued"
            );
            telemetry::record_dequeued(wait_ms, self.items.len());
            return Some(item);
        }
    }

    /// The item `dequeue` would return next.
    pub fn peek(&mut self) -> Option<&RequestItem> {
        loop {
            let id = *self.queue.peek()?;
            if self.items.contains_key(&id) {
                return self.items.get(&id);
            }
            self.queue.pop();
            self.stale = self.stale.saturating_sub(1);
        }
    }

    /// Look up a tracked item. `None` once dequeued or cancelled.
    pub fn get_item(&self, id: &RequestId) -> Option<&RequestItem> {
        self.items.get(id)
    }

    /// Set the status of a tracked item. Returns false for unknown ids.
    pub fn update_status(&mut self, id: &RequestId, status: RequestStatus) -> bool {
        match self.items.get_mut(id) {
            Some(item) => {
                tracing::debug!(request_id = %id, from = %item.status, to = %status, "status updated");
                item.status = status;
                true
            }
            None => false,
        }
    }

    /// Drop a tracked item without sending it to history.
    pub fn cancel(&mut self, id: &RequestId) -> bool {
        if self.items.remove(id).is_none() {
            return false;
        }
        self.stale += 1;
        if self.stale > self.items.len() {
            let items = &self.items;
            self.queue.retain(|handle| items.contains_key(handle));
            self.stale = 0;
        }
        tracing::debug!(request_id = %id, "request cancelled");
        true
    }

    /// Record the final status of an already dequeued item.
    pub fn mark_recent(&mut self, id: &RequestId, status: RequestStatus) -> bool {
        self.history.set_status(id, status)
    }

    /// Status counts and mean wait over tracked items.
    pub fn get_stats(&self) -> QueueStats {
        QueueStats::collect(self.items.values(), Utc::now())
    }

    /// Recently dequeued items, oldest first.
    pub fn get_recent_questions(&self) -> Vec<RequestItem> {
        self.history.to_vec()
    }

    /// Topic suggestions using the configured default limit.
    pub fn suggest_topics(&self, prefix: &str) -> Vec<Suggestion> {
        self.suggest_topics_with_limit(prefix, self.config.suggestion_limit)
    }

    pub fn suggest_topics_with_limit(&self, prefix: &str, limit: usize) -> Vec<Suggestion> {
        self.topics.autocomplete(prefix, limit)
    }

    /// Read-only view of the topic index.
    pub fn topic_index(&self) -> &PrefixIndex {
        &self.topics
    }

    /// Return to the freshly constructed state.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.items.clear();
        self.history.clear();
        self.topics.clear();
        self.stale = 0;
        telemetry::record_queue_depth(0);
        tracing::info!("scheduler cleared");
    }

    /// Number of tracked items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}

impl Default for PriorityScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
