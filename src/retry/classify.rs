//! Failure classification for upstream calls.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::config::RetryPolicy;

/// Coarse failure class driving the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Connection refused, reset, DNS failure and similar.
    Network,
    /// The call timed out or was aborted upstream.
    Timeout,
    /// HTTP 429.
    RateLimited,
    /// HTTP 401.
    Auth,
    /// HTTP 5xx.
    Server,
    Other,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::Auth => "auth",
            Self::Server => "server",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of inspecting one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub class: ErrorClass,
    pub status_code: Option<u16>,
    /// Server-requested wait before the next attempt.
    pub retry_after: Option<Duration>,
}

impl Classification {
    pub fn new(class: ErrorClass) -> Self {
        Self {
            class,
            status_code: None,
            retry_after: None,
        }
    }

    /// Classify an HTTP status: 429, 401 and 5xx get their own class.
    pub fn from_status(status: u16) -> Self {
        let class = match status {
            429 => ErrorClass::RateLimited,
            401 => ErrorClass::Auth,
            500..=599 => ErrorClass::Server,
            _ => ErrorClass::Other,
        };
        Self {
            class,
            status_code: Some(status),
            retry_after: None,
        }
    }

    pub fn network() -> Self {
        Self::new(ErrorClass::Network)
    }

    pub fn timeout() -> Self {
        Self::new(ErrorClass::Timeout)
    }

    pub fn with_retry_after(mut self, wait: Option<Duration>) -> Self {
        self.retry_after = wait;
        self
    }
}

/// Errors that can describe themselves to the retry executor.
pub trait ClassifyError {
    fn classify(&self) -> Classification;
}

/// Parse a `Retry-After` header value: delta-seconds or an HTTP date.
///
/// Dates in the past yield a zero wait.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    let wait_ms = (at - Utc::now()).num_milliseconds().max(0) as u64;
    Some(Duration::from_millis(wait_ms))
}

/// Ready-made error for HTTP/LLM provider calls.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream returned HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("upstream timed out: {0}")]
    Timeout(String),

    #[error("upstream error: {0}")]
    Other(String),
}

impl UpstreamError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    /// HTTP 429 with an optional server-requested wait.
    pub fn rate_limited(retry_after: Option<Duration>) -> Self {
        Self::Http {
            status: 429,
            message: "too many requests".to_string(),
            retry_after,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the default retry policy would retry this error.
    pub fn is_retryable(&self) -> bool {
        RetryPolicy::default().allows(self.classify().class)
    }
}

impl ClassifyError for UpstreamError {
    fn classify(&self) -> Classification {
        match self {
            Self::Http {
                status,
                retry_after,
                ..
            } => Classification::from_status(*status).with_retry_after(*retry_after),
            Self::Network(_) => Classification::network(),
            Self::Timeout(_) => Classification::timeout(),
            Self::Other(_) => Classification::new(ErrorClass::Other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classes() {
        assert_eq!(Classification::from_status(429).class, ErrorClass::RateLimited);
        assert_eq!(Classification::from_status(401).class, ErrorClass::Auth);
        assert_eq!(Classification::from_status(500).class, ErrorClass::Server);
        assert_eq!(Classification::from_status(503).class, ErrorClass::Server);
        assert_eq!(Classification::from_status(599).class, ErrorClass::Server);
        assert_eq!(Classification::from_status(404).class, ErrorClass::Other);
        assert_eq!(Classification::from_status(403).class, ErrorClass::Other);
        assert_eq!(Classification::from_status(404).status_code, Some(404));
    }

    #[test]
    fn upstream_error_classification() {
        let limited = UpstreamError::rate_limited(Some(Duration::from_secs(3)));
        let c = limited.classify();
        assert_eq!(c.class, ErrorClass::RateLimited);
        assert_eq!(c.status_code, Some(429));
        assert_eq!(c.retry_after, Some(Duration::from_secs(3)));

        assert_eq!(UpstreamError::Network("reset".into()).classify().class, ErrorClass::Network);
        assert_eq!(UpstreamError::Timeout("slow".into()).classify().class, ErrorClass::Timeout);
        assert_eq!(UpstreamError::Other("bad json".into()).classify().status_code, None);
    }

    #[test]
    fn retry_after_seconds() {
        assert_eq!(parse_retry_after("120"), Some(Duration::from_secs(120)));
        assert_eq!(parse_retry_after(" 0 "), Some(Duration::ZERO));
        assert_eq!(parse_retry_after("soon"), None);
    }

    #[test]
    fn retry_after_http_date() {
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"),
            Some(Duration::ZERO)
        );
        let future = (Utc::now() + chrono::Duration::seconds(30)).to_rfc2822();
        let wait = parse_retry_after(&future).unwrap();
        assert!(wait <= Duration::from_secs(30));
        assert!(wait >= Duration::from_secs(25));
    }

    #[test]
    fn display_messages() {
        let err = UpstreamError::http(503, "overloaded");
        assert_eq!(err.to_string(), "upstream returned HTTP 503: overloaded");
        assert_eq!(err.status_code(), Some(503));
        assert!(err.is_retryable());
        assert!(!UpstreamError::http(401, "denied").is_retryable());
        assert_eq!(ErrorClass::RateLimited.to_string(), "rate_limited");
    }
}
