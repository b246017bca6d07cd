//! Resilient execution of fallible upstream calls.
//!
//! Failures are classified ([`ClassifyError`]), retried with exponential
//! backoff and jitter, bounded by a per-attempt timeout, and abandoned
//! promptly on cancellation.

mod backoff;
mod classify;
mod config;
mod error;
mod executor;

pub use backoff::{compute_delay, exponential_delay};
pub use classify::{parse_retry_after, Classification, ClassifyError, ErrorClass, UpstreamError};
pub use config::{BackoffConfig, ErrorHook, Jitter, RetryConfig, RetryHook, RetryPolicy, RetryPredicate};
pub use error::{AbortReason, AttemptTimeout, RetryError};
pub use executor::{RetryExecutor, RetryOutcome};
