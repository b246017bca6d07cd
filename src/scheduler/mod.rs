//! Request scheduling module.
//!
//! Orders question-generation requests by priority, tracks their
//! lifecycle status, keeps a bounded history of dequeued requests and
//! feeds enqueued topics into the suggestion index.

mod history;
mod priority;
mod queue;
mod request;
mod stats;

pub use history::{RecentHistory, DEFAULT_HISTORY_CAPACITY};
pub use priority::{PrioritizedItem, Priority, PriorityQueue};
pub use queue::{PriorityScheduler, SchedulerConfig, SuggestionWeighting};
pub use request::{RequestId, RequestItem, RequestStatus};
pub use stats::QueueStats;
