//! Request item type tracked by the scheduler.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::priority::Priority;

/// Opaque identifier assigned at enqueue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status. Transitions are caller-driven and unrestricted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// True for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queued question-generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestItem {
    pub id: RequestId,
    pub topic: String,
    /// Difficulty label. May be free text for custom difficulties.
    pub difficulty: String,
    pub priority: Priority,
    pub requester_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: RequestStatus,
}

impl RequestItem {
    /// Create a pending request stamped with the current time.
    pub fn new(
        topic: impl Into<String>,
        difficulty: impl Into<String>,
        priority: Priority,
        requester_id: Option<String>,
    ) -> Self {
        Self {
            id: RequestId::new(),
            topic: topic.into(),
            difficulty: difficulty.into(),
            priority,
            requester_id,
            created_at: Utc::now(),
            status: RequestStatus::Pending,
        }
    }

    /// Milliseconds spent since enqueue as of `now`, never negative.
    pub fn wait_ms(&self, now: DateTime<Utc>) -> u64 {
        (now - self.created_at).num_milliseconds().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_item_is_pending() {
        let item = RequestItem::new("History", "easy", 1, None);
        assert_eq!(item.status, RequestStatus::Pending);
        assert_eq!(item.topic, "History");
        assert!(item.requester_id.is_none());
    }

    #[test]
    fn ids_are_unique() {
        let a = RequestItem::new("a", "easy", 1, None);
        let b = RequestItem::new("a", "easy", 1, None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn wait_ms_clamps_clock_skew() {
        let item = RequestItem::new("a", "easy", 1, None);
        let earlier = item.created_at - Duration::seconds(5);
        assert_eq!(item.wait_ms(earlier), 0);
        let later = item.created_at + Duration::milliseconds(250);
        assert_eq!(item.wait_ms(later), 250);
    }

    #[test]
    fn serializes_with_lowercase_status() {
        let mut item = RequestItem::new("Space", "hard", 3, Some("user-7".into()));
        item.status = RequestStatus::Processing;
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["status"], "processing");
        assert_eq!(json["requesterId"], "user-7");
        assert_eq!(json["priority"], 3);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(!RequestStatus::Processing.is_terminal());
        assert!(RequestStatus::Completed.is_terminal());
        assert!(RequestStatus::Failed.is_terminal());
    }
}
