//! Configuration loading from environment variables and an optional TOML file.
//!
//! All values are loaded from `TRIVIA_CORE_*` environment variables with
//! sensible defaults. Invalid values fall back to defaults without crashing.
//! [`load_file`] reads a TOML file first; environment variables still win.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `TRIVIA_CORE_HISTORY_CAPACITY` | 100 | Recent items kept after dequeue |
//! | `TRIVIA_CORE_SUGGESTION_LIMIT` | 10 | Default topic suggestion count |
//! | `TRIVIA_CORE_SUGGESTION_WEIGHTING` | accumulate | `accumulate` or `overwrite` |
//! | `TRIVIA_CORE_RESULT_CACHE_CAPACITY` | 256 | Cached generation results |
//! | `TRIVIA_CORE_RETRY_MAX_RETRIES` | 3 | Retries after the first attempt |
//! | `TRIVIA_CORE_RETRY_BASE_DELAY_MS` | 1000 | Backoff base delay |
//! | `TRIVIA_CORE_RETRY_MIN_DELAY_MS` | 100 | Backoff floor |
//! | `TRIVIA_CORE_RETRY_MAX_DELAY_MS` | 30000 | Backoff ceiling |
//! | `TRIVIA_CORE_RETRY_TIMEOUT_MS` | 30000 | Per-attempt timeout |
//! | `TRIVIA_CORE_RETRY_ON_TIMEOUT` | false | Retry timed-out attempts |
//! | `TRIVIA_CORE_LOG_LEVEL` | info | Log filter directive |
//! | `TRIVIA_CORE_LOG_FORMAT` | json | `json`, `pretty` or `compact` |
//! | `TRIVIA_CORE_LOG_FILE` | (stderr) | Log file path |

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::memory::DEFAULT_CACHE_CAPACITY;
use crate::retry::RetryConfig;
use crate::scheduler::{SchedulerConfig, SuggestionWeighting};
use crate::telemetry::{LogConfig, LogError, LogFormat};
use crate::RuntimeConfig;

const MAX_RETRIES_CEILING: u32 = 20;

/// Errors from reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid [log] section: {0}")]
    Log(#[from] LogError),
}

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub history_capacity: usize,
    pub suggestion_limit: usize,
    pub suggestion_weighting: SuggestionWeighting,
    pub result_cache_capacity: usize,
    pub retry_max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retry_min_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub retry_timeout_ms: u64,
    pub retry_on_timeout: bool,
    pub log_level: String,
    pub log_format: String,
}

/// All configuration loaded from the environment (and optionally a file).
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub scheduler: SchedulerConfig,
    pub result_cache_capacity: usize,
    pub retry: RetryConfig,
    pub log: LogConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            result_cache_capacity: DEFAULT_CACHE_CAPACITY,
            retry: RetryConfig::default(),
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    scheduler: FileScheduler,
    cache: FileCache,
    retry: FileRetry,
    log: FileLog,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileScheduler {
    history_capacity: Option<usize>,
    suggestion_limit: Option<usize>,
    weighting: Option<SuggestionWeighting>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileCache {
    capacity: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileRetry {
    max_retries: Option<u32>,
    base_delay_ms: Option<u64>,
    min_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
    timeout_ms: Option<u64>,
    retry_on_timeout: Option<bool>,
    retry_on_auth_error: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileLog {
    level: Option<String>,
    format: Option<String>,
    file: Option<PathBuf>,
}

impl FileConfig {
    fn apply(self, cfg: &mut EnvConfig) -> Result<(), ConfigError> {
        let s = self.scheduler;
        set(&mut cfg.scheduler.history_capacity, s.history_capacity);
        set(&mut cfg.scheduler.suggestion_limit, s.suggestion_limit);
        set(&mut cfg.scheduler.weighting, s.weighting);

        set(&mut cfg.result_cache_capacity, self.cache.capacity);

        let r = self.retry;
        let backoff = &mut cfg.retry.backoff;
        set(&mut cfg.retry.max_retries, r.max_retries);
        set(&mut backoff.base_delay, r.base_delay_ms.map(Duration::from_millis));
        set(&mut backoff.min_delay, r.min_delay_ms.map(Duration::from_millis));
        set(&mut backoff.max_delay, r.max_delay_ms.map(Duration::from_millis));
        set(&mut cfg.retry.timeout, r.timeout_ms.map(Duration::from_millis));
        set(&mut cfg.retry.policy.retry_on_timeout, r.retry_on_timeout);
        set(&mut cfg.retry.policy.retry_on_auth_error, r.retry_on_auth_error);

        set(&mut cfg.log.level, self.log.level);
        if let Some(format) = self.log.format {
            cfg.log.format = format.parse::<LogFormat>()?;
        }
        if self.log.file.is_some() {
            cfg.log.output_path = self.log.file;
        }
        Ok(())
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a `u32` env var, returning `default` on missing or invalid.
fn parse_u32(key: &str, default: u32) -> u32 {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u32>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a millisecond env var, returning `default` on missing or invalid.
fn parse_millis(key: &str, default: Duration) -> Duration {
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a boolean env var (`true/false/1/0/yes/no`).
fn parse_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Load scheduler configuration from environment.
fn apply_scheduler_env(base: SchedulerConfig) -> SchedulerConfig {
    let history_capacity = parse_usize("TRIVIA_CORE_HISTORY_CAPACITY", base.history_capacity);
    let suggestion_limit = parse_usize("TRIVIA_CORE_SUGGESTION_LIMIT", base.suggestion_limit);
    let weighting = std::env::var("TRIVIA_CORE_SUGGESTION_WEIGHTING")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(base.weighting);
    SchedulerConfig {
        history_capacity: history_capacity.max(1),
        suggestion_limit: suggestion_limit.max(1),
        weighting,
    }
}

/// Load retry configuration from environment.
fn apply_retry_env(mut retry: RetryConfig) -> RetryConfig {
    retry.max_retries = parse_u32("TRIVIA_CORE_RETRY_MAX_RETRIES", retry.max_retries)
        .min(MAX_RETRIES_CEILING);

    let backoff = &mut retry.backoff;
    backoff.base_delay = parse_millis("TRIVIA_CORE_RETRY_BASE_DELAY_MS", backoff.base_delay);
    backoff.min_delay = parse_millis("TRIVIA_CORE_RETRY_MIN_DELAY_MS", backoff.min_delay);
    backoff.max_delay = parse_millis("TRIVIA_CORE_RETRY_MAX_DELAY_MS", backoff.max_delay);
    backoff.max_delay = backoff.max_delay.max(backoff.min_delay); // max >= min

    let timeout = parse_millis("TRIVIA_CORE_RETRY_TIMEOUT_MS", retry.timeout);
    retry.timeout = timeout.max(Duration::from_millis(1)); // floor: 1ms
    retry.policy.retry_on_timeout =
        parse_bool("TRIVIA_CORE_RETRY_ON_TIMEOUT", retry.policy.retry_on_timeout);
    retry
}

fn apply_env(base: EnvConfig) -> EnvConfig {
    let capacity = parse_usize("TRIVIA_CORE_RESULT_CACHE_CAPACITY", base.result_cache_capacity);
    EnvConfig {
        scheduler: apply_scheduler_env(base.scheduler),
        result_cache_capacity: capacity.max(1),
        retry: apply_retry_env(base.retry),
        log: base.log.with_env_overrides(),
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    apply_env(EnvConfig::default())
}

/// Load a TOML file, then apply environment overrides on top.
///
/// Unknown keys and unknown log formats are rejected so typos do not
/// silently fall back.
pub fn load_file(path: impl AsRef<Path>) -> Result<EnvConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: FileConfig = toml::from_str(&text)?;

    let mut cfg = EnvConfig::default();
    file.apply(&mut cfg)?;
    Ok(apply_env(cfg))
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        let backoff = &self.retry.backoff;
        EffectiveConfig {
            history_capacity: self.scheduler.history_capacity,
            suggestion_limit: self.scheduler.suggestion_limit,
            suggestion_weighting: self.scheduler.weighting,
            result_cache_capacity: self.result_cache_capacity,
            retry_max_retries: self.retry.max_retries,
            retry_base_delay_ms: backoff.base_delay.as_millis() as u64,
            retry_min_delay_ms: backoff.min_delay.as_millis() as u64,
            retry_max_delay_ms: backoff.max_delay.as_millis() as u64,
            retry_timeout_ms: self.retry.timeout.as_millis() as u64,
            retry_on_timeout: self.retry.policy.retry_on_timeout,
            log_level: self.log.level.clone(),
            log_format: self.log.format.as_str().to_string(),
        }
    }

    /// Runtime configuration derived from these values.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            scheduler: self.scheduler.clone(),
            result_cache_capacity: self.result_cache_capacity,
            retry: self.retry.clone(),
        }
    }
}
