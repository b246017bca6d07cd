//! Metric recording helpers.

use std::time::Duration;

use metrics::{counter, gauge, histogram};

use crate::retry::ErrorClass;

/// Record an enqueue and the resulting queue depth.
pub fn record_enqueued(depth: usize) {
    counter!("trivia_requests_enqueued_total").increment(1);
    record_queue_depth(depth);
}

/// Record a dequeue with the item's time spent waiting.
pub fn record_dequeued(wait_ms: u64, depth: usize) {
    counter!("trivia_requests_dequeued_total").increment(1);
    histogram!("trivia_request_wait_ms").record(wait_ms as f64);
    record_queue_depth(depth);
}

pub fn record_queue_depth(depth: usize) {
    gauge!("trivia_queue_depth").set(depth as f64);
}

/// Record a scheduled retry by failure class.
pub fn record_retry(class: ErrorClass, delay: Duration) {
    counter!("trivia_upstream_retries_total", "class" => class.as_str()).increment(1);
    histogram!("trivia_retry_delay_ms").record(delay.as_millis() as f64);
}

pub fn record_cache_lookup(hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    counter!("trivia_result_cache_lookups_total", "outcome" => outcome).increment(1);
}

pub fn record_generation_success(attempts: u32, latency: Duration) {
    counter!("trivia_generations_total", "status" => "success").increment(1);
    histogram!("trivia_generation_attempts").record(f64::from(attempts));
    histogram!("trivia_generation_latency_ms").record(latency.as_millis() as f64);
}

pub fn record_generation_failure(reason: &'static str) {
    counter!("trivia_generations_total", "status" => "failure", "reason" => reason).increment(1);
}
