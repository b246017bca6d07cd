//! Derived queue statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::request::{RequestItem, RequestStatus};

/// Counts over currently tracked items plus their mean wait.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub total_items: usize,
    pub pending_items: usize,
    pub processing_items: usize,
    pub completed_items: usize,
    pub failed_items: usize,
    /// Mean milliseconds since enqueue. Zero when nothing is tracked.
    pub average_wait_time: f64,
}

impl QueueStats {
    /// Fold a set of tracked items into stats as of `now`.
    pub fn collect<'a>(items: impl IntoIterator<Item = &'a RequestItem>, now: DateTime<Utc>) -> Self {
        let mut stats = Self::default();
        let mut total_wait: u128 = 0;

        for item in items {
            stats.total_items += 1;
            match item.status {
                RequestStatus::Pending => stats.pending_items += 1,
                RequestStatus::Processing => stats.processing_items += 1,
                RequestStatus::Completed => stats.completed_items += 1,
                RequestStatus::Failed => stats.failed_items += 1,
            }
            total_wait += u128::from(item.wait_ms(now));
        }

        if stats.total_items > 0 {
            stats.average_wait_time = total_wait as f64 / stats.total_items as f64;
        }
        stats
    }
}
