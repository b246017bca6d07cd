//! Terminal errors produced by the retry executor.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use super::classify::ErrorClass;

/// Why a call was abandoned rather than failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The caller's cancellation token fired.
    Cancelled,
    /// An attempt exceeded the per-attempt timeout.
    TimedOut(Duration),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("cancelled"),
            Self::TimedOut(after) => write!(f, "timed out after {}ms", after.as_millis()),
        }
    }
}

/// An attempt that ran past the per-attempt timeout.
///
/// Passed to hooks and predicates in place of an operation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("attempt timed out after {}ms", .0.as_millis())]
pub struct AttemptTimeout(pub Duration);

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (last status {code})"),
        None => String::new(),
    }
}

/// Final outcome of a call that never succeeded.
#[derive(Debug, Error)]
pub enum RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// The last attempt failed and no retry was allowed.
    #[error("upstream call failed after {attempts} attempt(s){}: {source}", status_suffix(.status_code))]
    Failed {
        attempts: u32,
        /// Last HTTP status observed across all attempts.
        status_code: Option<u16>,
        class: ErrorClass,
        #[source]
        source: E,
    },

    /// The call was cancelled or timed out.
    #[error("upstream call aborted after {attempts} attempt(s){}: {reason}", status_suffix(.status_code))]
    Aborted {
        attempts: u32,
        status_code: Option<u16>,
        reason: AbortReason,
    },
}

impl<E> RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Attempts started before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Failed { attempts, .. } | Self::Aborted { attempts, .. } => *attempts,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Failed { status_code, .. } | Self::Aborted { status_code, .. } => *status_code,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Aborted {
                reason: AbortReason::Cancelled,
                ..
            }
        )
    }

    /// True for an executor timeout and for an operation-reported timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Aborted { reason, .. } => matches!(reason, AbortReason::TimedOut(_)),
            Self::Failed { class, .. } => *class == ErrorClass::Timeout,
        }
    }

    /// Class of the final failure. Executor timeouts report `Timeout`.
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            Self::Failed { class, .. } => Some(*class),
            Self::Aborted {
                reason: AbortReason::TimedOut(_),
                ..
            } => Some(ErrorClass::Timeout),
            Self::Aborted { .. } => None,
        }
    }

    pub fn source_error(&self) -> Option<&E> {
        match self {
            Self::Failed { source, .. } => Some(source),
            Self::Aborted { .. } => None,
        }
    }

    pub fn into_source(self) -> Option<E> {
        match self {
            Self::Failed { source, .. } => Some(source),
            Self::Aborted { .. } => None,
        }
    }
}
