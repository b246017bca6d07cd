//! Retry executor configuration.

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::classify::ErrorClass;

/// Caller predicate `(error, status_code, attempt_index) -> retry?`.
///
/// `attempt_index` is the zero-based index of the attempt that failed.
pub type RetryPredicate = Arc<dyn Fn(&(dyn Error + 'static), Option<u16>, u32) -> bool + Send + Sync>;

/// Hook `(attempt_number, error, delay)` fired before each retry sleep.
pub type RetryHook = Arc<dyn Fn(u32, &(dyn Error + 'static), Duration) + Send + Sync>;

/// Hook `(error, attempt_number, is_final)` fired on every failed attempt.
pub type ErrorHook = Arc<dyn Fn(&(dyn Error + 'static), u32, bool) + Send + Sync>;

/// Random perturbation added on top of the computed delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Jitter {
    None,
    /// Up to this fraction of the delay (0.1 = 10%).
    Proportional(f64),
    /// Up to this fixed amount.
    Fixed(Duration),
}

/// Exponential backoff parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    pub base_delay: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub exponent_base: f64,
    pub jitter: Jitter,
    /// Upper bound on the jitter component.
    pub max_jitter: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(1000),
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            exponent_base: 2.0,
            jitter: Jitter::Proportional(0.1),
            max_jitter: Duration::from_secs(1),
        }
    }
}

/// Per-class retry switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry_on_auth_error: bool,
    pub retry_on_rate_limit: bool,
    pub retry_on_server_error: bool,
    pub retry_on_network_error: bool,
    /// Retry attempts that hit the per-attempt timeout or report an
    /// upstream timeout. Off by default: a timeout aborts the call.
    pub retry_on_timeout: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_on_auth_error: false,
            retry_on_rate_limit: true,
            retry_on_server_error: true,
            retry_on_network_error: true,
            retry_on_timeout: false,
        }
    }
}

impl RetryPolicy {
    pub fn allows(&self, class: ErrorClass) -> bool {
        match class {
            ErrorClass::Auth => self.retry_on_auth_error,
            ErrorClass::RateLimited => self.retry_on_rate_limit,
            ErrorClass::Server => self.retry_on_server_error,
            ErrorClass::Network => self.retry_on_network_error,
            ErrorClass::Timeout => self.retry_on_timeout,
            ErrorClass::Other => false,
        }
    }
}

/// Full configuration for one retry executor.
#[derive(Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt. Total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Per-attempt timeout.
    pub timeout: Duration,
    pub backoff: BackoffConfig,
    pub policy: RetryPolicy,
    /// Replaces `policy` when set.
    pub should_retry: Option<RetryPredicate>,
    pub on_retry: Option<RetryHook>,
    pub on_error: Option<ErrorHook>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_secs(30),
            backoff: BackoffConfig::default(),
            policy: RetryPolicy::default(),
            should_retry: None,
            on_retry: None,
            on_error: None,
        }
    }
}

impl RetryConfig {
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&(dyn Error + 'static), Option<u16>, u32) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Some(Arc::new(predicate));
        self
    }

    pub fn with_on_retry<F>(mut self, hook: F) -> Self
    where
        F: Fn(u32, &(dyn Error + 'static), Duration) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(hook));
        self
    }

    pub fn with_on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&(dyn Error + 'static), u32, bool) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_retries", &self.max_retries)
            .field("timeout", &self.timeout)
            .field("backoff", &self.backoff)
            .field("policy", &self.policy)
            .field("should_retry", &self.should_retry.is_some())
            .field("on_retry", &self.on_retry.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_transient_classes() {
        let policy = RetryPolicy::default();
        assert!(policy.allows(ErrorClass::RateLimited));
        assert!(policy.allows(ErrorClass::Server));
        assert!(policy.allows(ErrorClass::Network));
        assert!(!policy.allows(ErrorClass::Auth));
        assert!(!policy.allows(ErrorClass::Timeout));
        assert!(!policy.allows(ErrorClass::Other));
    }

    #[test]
    fn debug_hides_closures() {
        let config = RetryConfig::default().with_predicate(|_, _, _| true);
        let text = format!("{config:?}");
        assert!(text.contains("should_retry: true"));
        assert!(text.contains("on_retry: false"));
    }
}
