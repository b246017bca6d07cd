//! Retry executor for fallible async upstream calls.

use std::error::Error;
use std::future::Future;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::backoff::compute_delay;
use super::classify::{Classification, ClassifyError};
use super::config::RetryConfig;
use super::error::{AbortReason, AttemptTimeout, RetryError};
use crate::telemetry;

/// Successful result of [`RetryExecutor::execute`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryOutcome<T> {
    pub data: T,
    /// Attempts made, including the successful one.
    pub attempts: u32,
    /// Wall time from the first attempt to success.
    pub duration: Duration,
}

enum AttemptFailure<E> {
    Operation(E),
    TimedOut(AttemptTimeout),
}

impl<E: Error + 'static> AttemptFailure<E> {
    fn as_error(&self) -> &(dyn Error + 'static) {
        match self {
            Self::Operation(err) => err,
            Self::TimedOut(err) => err,
        }
    }
}

/// Runs an operation up to `max_retries + 1` times with backoff.
///
/// Each attempt races the per-attempt timeout and the cancellation token.
/// Backoff sleeps also observe cancellation.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` without external cancellation.
    pub async fn execute<T, E, F, Fut>(
        &self,
        operation: F,
    ) -> Result<RetryOutcome<T>, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ClassifyError + Error + 'static,
    {
        self.execute_cancellable(operation, &CancellationToken::new())
            .await
    }

    /// Run `operation`, abandoning it as soon as `cancel` fires.
    pub async fn execute_cancellable<T, E, F, Fut>(
        &self,
        mut operation: F,
        cancel: &CancellationToken,
    ) -> Result<RetryOutcome<T>, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ClassifyError + Error + 'static,
    {
        let started = Instant::now();
        let mut rng = StdRng::from_entropy();
        let mut last_status: Option<u16> = None;
        let mut attempt: u32 = 0;

        loop {
            let attempt_number = attempt + 1;
            if cancel.is_cancelled() {
                return Err(RetryError::Aborted {
                    attempts: attempt,
                    status_code: last_status,
                    reason: AbortReason::Cancelled,
                });
            }

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(attempt = attempt_number, "upstream call cancelled mid-attempt");
                    return Err(RetryError::Aborted {
                        attempts: attempt_number,
                        status_code: last_status,
                        reason: AbortReason::Cancelled,
                    });
                }
                res = tokio::time::timeout(self.config.timeout, operation()) => res,
            };

            let failure = match result {
                Ok(Ok(data)) => {
                    let duration = started.elapsed();
                    debug!(
                        attempts = attempt_number,
                        duration_ms = duration.as_millis() as u64,
                        "upstream call succeeded"
                    );
                    return Ok(RetryOutcome {
                        data,
                        attempts: attempt_number,
                        duration,
                    });
                }
                Ok(Err(err)) => AttemptFailure::Operation(err),
                Err(_) => AttemptFailure::TimedOut(AttemptTimeout(self.config.timeout)),
            };

            let classification = match &failure {
                AttemptFailure::Operation(err) => err.classify(),
                AttemptFailure::TimedOut(_) => Classification::timeout(),
            };
            if classification.status_code.is_some() {
                last_status = classification.status_code;
            }

            let retry = attempt < self.config.max_retries
                && self.should_retry(failure.as_error(), &classification, attempt);

            if let Some(hook) = &self.config.on_error {
                hook(failure.as_error(), attempt_number, !retry);
            }

            if !retry {
                warn!(
                    attempts = attempt_number,
                    class = classification.class.as_str(),
                    status = ?last_status,
                    error = %failure.as_error(),
                    "upstream call giving up"
                );
                return Err(match failure {
                    AttemptFailure::Operation(source) => RetryError::Failed {
                        attempts: attempt_number,
                        status_code: last_status,
                        class: classification.class,
                        source,
                    },
                    AttemptFailure::TimedOut(AttemptTimeout(after)) => RetryError::Aborted {
                        attempts: attempt_number,
                        status_code: last_status,
                        reason: AbortReason::TimedOut(after),
                    },
                });
            }

            let delay = compute_delay(
                attempt,
                &self.config.backoff,
                classification.retry_after,
                &mut rng,
            );
            if let Some(hook) = &self.config.on_retry {
                hook(attempt_number, failure.as_error(), delay);
            }
            telemetry::record_retry(classification.class, delay);
            warn!(
                attempt = attempt_number,
                class = classification.class.as_str(),
                status = ?classification.status_code,
                delay_ms = delay.as_millis() as u64,
                error = %failure.as_error(),
                "upstream call failed, retrying"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(attempt = attempt_number, "upstream call cancelled during backoff");
                    return Err(RetryError::Aborted {
                        attempts: attempt_number,
                        status_code: last_status,
                        reason: AbortReason::Cancelled,
                    });
                }
                () = tokio::time::sleep(delay) => {}
            }

            attempt += 1;
        }
    }

    fn should_retry(
        &self,
        error: &(dyn Error + 'static),
        classification: &Classification,
        attempt: u32,
    ) -> bool {
        match &self.config.should_retry {
            Some(predicate) => predicate(error, classification.status_code, attempt),
            None => self.config.policy.allows(classification.class),
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
