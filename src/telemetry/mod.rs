//! Telemetry module for the trivia core.
//!
//! Provides structured logging, request spans and metrics recording.
//! Metrics go through the `metrics` facade; without an installed recorder
//! they are no-ops.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use metrics::{
    record_cache_lookup, record_dequeued, record_enqueued, record_generation_failure,
    record_generation_success, record_queue_depth, record_retry,
};
pub use spans::{GenerationSpan, SpanExt};
