//! Span utilities and extension traits for generation tracing.

use tracing::{info_span, Span};

/// Extension trait for adding context to spans.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for creating standardized generation spans.
pub struct GenerationSpan;

impl GenerationSpan {
    /// Create a span for processing one request.
    ///
    /// Fields filled in later:
    /// - `status` / `error.message`: via `SpanExt::record_result`
    /// - `attempts`: upstream calls made
    /// - `cached`: whether the result cache answered
    /// - `latency_ms`: time spent processing
    pub fn new(request_id: &str, topic: &str, difficulty: &str) -> Span {
        info_span!(
            "generation_request",
            request_id = %request_id,
            topic = %topic,
            difficulty = %difficulty,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            attempts = tracing::field::Empty,
            cached = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    }
}
