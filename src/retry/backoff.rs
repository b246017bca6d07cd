//! Exponential backoff with capped jitter.

use std::time::Duration;

use rand::Rng;

use super::config::{BackoffConfig, Jitter};

/// Delay before retrying after the attempt at zero-based `attempt`.
///
/// The exponential component is `base * exponent_base^attempt`, clamped to
/// `[min_delay, max_delay]`. A server-requested `retry_after` replaces it
/// and is only raised to `min_delay`, never capped. Jitter is added last.
pub fn compute_delay<R: Rng + ?Sized>(
    attempt: u32,
    config: &BackoffConfig,
    retry_after: Option<Duration>,
    rng: &mut R,
) -> Duration {
    let delay = match retry_after {
        Some(wait) => wait.max(config.min_delay),
        None => exponential_delay(attempt, config),
    };
    delay.saturating_add(jitter(delay, config, rng))
}

/// Clamped exponential component without jitter.
pub fn exponential_delay(attempt: u32, config: &BackoffConfig) -> Duration {
    let min_ms = config.min_delay.as_millis() as f64;
    let max_ms = (config.max_delay.as_millis() as f64).max(min_ms);

    let exponent = attempt.min(i32::MAX as u32) as i32;
    let raw = config.base_delay.as_millis() as f64 * config.exponent_base.powi(exponent);
    let raw = if raw.is_nan() { max_ms } else { raw };

    Duration::from_millis(raw.clamp(min_ms, max_ms) as u64)
}

fn jitter<R: Rng + ?Sized>(delay: Duration, config: &BackoffConfig, rng: &mut R) -> Duration {
    let span_ms = match config.jitter {
        Jitter::None => 0,
        Jitter::Proportional(fraction) => {
            (delay.as_millis() as f64 * fraction.max(0.0)) as u64
        }
        Jitter::Fixed(amount) => amount.as_millis() as u64,
    };
    let span_ms = span_ms.min(config.max_jitter.as_millis() as u64);
    if span_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rng.gen_range(0..=span_ms))
}
