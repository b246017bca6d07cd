//! Trivia Core
//!
//! Scheduling, topic indexing and upstream resilience for a trivia
//! question-generation service.
//!
//! # Components
//!
//! - **Scheduler**: min-priority queue with FIFO ties, id lookup, bounded
//!   recent history and queue statistics
//! - **Index**: prefix tree of topics ranked by weight for autocomplete
//! - **Memory**: fixed-capacity LRU cache of finished results
//! - **Retry**: classified retries with backoff, timeouts and cancellation
//!
//! The HTTP layer, persistence and the LLM providers themselves live
//! outside this crate. Providers plug in through
//! [`generation::QuestionGenerator`].

pub mod config;
pub mod generation;
pub mod index;
pub mod memory;
pub mod retry;
pub mod scheduler;
pub mod telemetry;

use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use generation::QuestionGenerator;
use index::Suggestion;
use memory::{FixedCapacityCache, ResultKey, DEFAULT_CACHE_CAPACITY};
use retry::{AbortReason, RetryConfig, RetryError, RetryExecutor};
use scheduler::{
    Priority, PriorityScheduler, QueueStats, RequestId, RequestItem, RequestStatus,
    SchedulerConfig,
};
use telemetry::{GenerationSpan, SpanExt};

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub scheduler: SchedulerConfig,
    pub result_cache_capacity: usize,
    pub retry: RetryConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            result_cache_capacity: DEFAULT_CACHE_CAPACITY,
            retry: RetryConfig::default(),
        }
    }
}

/// Result of one [`TriviaRuntime::process_next`] call.
#[derive(Debug)]
pub struct ProcessedRequest<V, E>
where
    E: std::error::Error + 'static,
{
    /// The dequeued request with its final status.
    pub request: RequestItem,
    pub result: Result<V, RetryError<E>>,
    /// Answered from the result cache without calling the generator.
    pub cached: bool,
    /// Generator calls made. Zero for cache hits.
    pub attempts: u32,
    pub latency: Duration,
}

impl<V, E> ProcessedRequest<V, E>
where
    E: std::error::Error + 'static,
{
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn status(&self) -> RequestStatus {
        self.request.status
    }
}

/// The trivia core runtime instance.
///
/// Locks are never held across an `.await`; the generator runs unlocked.
pub struct TriviaRuntime<V> {
    scheduler: Mutex<PriorityScheduler>,
    cache: Mutex<FixedCapacityCache<ResultKey, V>>,
    retry: RetryExecutor,
}

impl<V: Clone> TriviaRuntime<V> {
    /// Create a new runtime instance with the given configuration.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            scheduler: Mutex::new(PriorityScheduler::new(config.scheduler)),
            cache: Mutex::new(FixedCapacityCache::new(config.result_cache_capacity)),
            retry: RetryExecutor::new(config.retry),
        }
    }

    pub fn submit(
        &self,
        topic: impl Into<String>,
        difficulty: impl Into<String>,
        priority: Priority,
        requester_id: Option<String>,
    ) -> RequestId {
        self.scheduler
            .lock()
            .enqueue(topic, difficulty, priority, requester_id)
    }

    pub fn cancel(&self, id: &RequestId) -> bool {
        self.scheduler.lock().cancel(id)
    }

    pub fn get_item(&self, id: &RequestId) -> Option<RequestItem> {
        self.scheduler.lock().get_item(id).cloned()
    }

    pub fn suggest(&self, prefix: &str) -> Vec<Suggestion> {
        self.scheduler.lock().suggest_topics(prefix)
    }

    pub fn stats(&self) -> QueueStats {
        self.scheduler.lock().get_stats()
    }

    pub fn recent(&self) -> Vec<RequestItem> {
        self.scheduler.lock().get_recent_questions()
    }

    /// Direct access to the scheduler. Do not hold across an `.await`.
    pub fn scheduler(&self) -> MutexGuard<'_, PriorityScheduler> {
        self.scheduler.lock()
    }

    /// Cached result for (topic, difficulty) without touching recency.
    pub fn cached(&self, topic: &str, difficulty: &str) -> Option<V> {
        self.cache
            .lock()
            .peek(&ResultKey::new(topic, difficulty))
            .cloned()
    }

    pub fn invalidate(&self, topic: &str, difficulty: &str) -> bool {
        self.cache.lock().delete(&ResultKey::new(topic, difficulty))
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn retry_executor(&self) -> &RetryExecutor {
        &self.retry
    }

    /// Process the next request without external cancellation.
    pub async fn process_next<G>(&self, generator: &G) -> Option<ProcessedRequest<V, G::Error>>
    where
        G: QuestionGenerator<Output = V>,
    {
        self.process_next_cancellable(generator, &CancellationToken::new())
            .await
    }

    /// Dequeue the next request and resolve it.
    ///
    /// Cache hits skip the generator. Misses go through the retry executor
    /// and successes are cached. The history entry ends as `completed` or
    /// `failed`. Returns `None` when the queue is empty.
    pub async fn process_next_cancellable<G>(
        &self,
        generator: &G,
        cancel: &CancellationToken,
    ) -> Option<ProcessedRequest<V, G::Error>>
    where
        G: QuestionGenerator<Output = V>,
    {
        let mut request = {
            let mut scheduler = self.scheduler.lock();
            let request = scheduler.dequeue()?;
            scheduler.mark_recent(&request.id, RequestStatus::Processing);
            request
        };
        request.status = RequestStatus::Processing;

        let started = Instant::now();
        let key = ResultKey::new(&request.topic, &request.difficulty);
        let span = GenerationSpan::new(&request.id.to_string(), &request.topic, &request.difficulty);

        let hit = self.cache.lock().get(&key).cloned();
        telemetry::record_cache_lookup(hit.is_some());
        span.record("cached", hit.is_some());

        let (result, attempts, cached) = match hit {
            Some(value) => (Ok(value), 0, true),
            None => {
                let item = &request;
                let outcome = self
                    .retry
                    .execute_cancellable(move || generator.generate(item), cancel)
                    .instrument(span.clone())
                    .await;
                match outcome {
                    Ok(done) => {
                        if let Some((evicted, _)) = self.cache.lock().put(key, done.data.clone()) {
                            tracing::debug!(key = %evicted, "result cache evicted entry");
                        }
                        (Ok(done.data), done.attempts, false)
                    }
                    Err(err) => {
                        let attempts = err.attempts();
                        (Err(err), attempts, false)
                    }
                }
            }
        };

        let status = if result.is_ok() {
            RequestStatus::Completed
        } else {
            RequestStatus::Failed
        };
        self.scheduler.lock().mark_recent(&request.id, status);
        request.status = status;

        let latency = started.elapsed();
        span.record_result(&result);
        span.record("attempts", attempts);
        span.record("latency_ms", latency.as_millis() as u64);

        match &result {
            Ok(_) => {
                telemetry::record_generation_success(attempts, latency);
                span.in_scope(|| {
                    tracing::info!(
                        provider = generator.name(),
                        cached,
                        attempts,
                        "request completed"
                    )
                });
            }
            Err(err) => {
                telemetry::record_generation_failure(failure_reason(err));
                span.in_scope(|| {
                    tracing::warn!(
                        provider = generator.name(),
                        attempts,
                        status_code = ?err.status_code(),
                        error = %err,
                        "request failed"
                    )
                });
            }
        }

        Some(ProcessedRequest {
            request,
            result,
            cached,
            attempts,
            latency,
        })
    }

    /// Drop all queued items, history, topics and cached results.
    pub fn clear(&self) {
        self.scheduler.lock().clear();
        self.cache.lock().clear();
    }
}

impl<V: Clone> Default for TriviaRuntime<V> {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

fn failure_reason<E: std::error::Error + 'static>(err: &RetryError<E>) -> &'static str {
    match err {
        RetryError::Aborted {
            reason: AbortReason::Cancelled,
            ..
        } => "cancelled",
        RetryError::Aborted {
            reason: AbortReason::TimedOut(_),
            ..
        } => "timeout",
        RetryError::Failed { class, .. } => class.as_str(),
    }
}
