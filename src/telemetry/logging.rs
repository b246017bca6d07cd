//! Logging configuration and initialization.
//!
//! Supports JSON, pretty and compact formats with an optional file sink.
//! The host process calls [`init_logging`] once; library code only emits
//! `tracing` events.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logging (default for production).
    #[default]
    Json,
    /// Multi-line human-readable output (for development).
    Pretty,
    /// Single-line human-readable output.
    Compact,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(LogError::UnknownFormat(other.to_string())),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Filter directive (e.g. "info", "trivia_core=debug").
    pub level: String,
    /// Log file path. `None` logs to stderr.
    pub output_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
            output_path: None,
        }
    }
}

impl LogConfig {
    /// Read `TRIVIA_CORE_LOG_LEVEL`, `TRIVIA_CORE_LOG_FORMAT` and
    /// `TRIVIA_CORE_LOG_FILE`. Unset or unparsable values keep defaults.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply the logging environment variables on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("TRIVIA_CORE_LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.level = level;
            }
        }
        if let Some(format) = std::env::var("TRIVIA_CORE_LOG_FORMAT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.format = format;
        }
        if let Some(path) = std::env::var_os("TRIVIA_CORE_LOG_FILE") {
            self.output_path = Some(PathBuf::from(path));
        }
        self
    }
}

/// Errors that can occur during logging initialization.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),
    #[error("Unknown log format: {0}")]
    UnknownFormat(String),
    #[error("Failed to open log file: {0}")]
    FileOpen(String),
    #[error("Subscriber already initialized")]
    AlreadyInitialized,
}

/// Install the global tracing subscriber.
///
/// The log file, when configured, is created before the subscriber is
/// installed and applies to every format.
pub fn init_logging(config: &LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| LogError::InvalidFilter(e.to_string()))?;
    let writer = open_writer(&config.output_path)?;
    let ansi = config.output_path.is_none();

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_ansi(ansi).with_writer(writer))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_ansi(ansi).with_writer(writer))
            .try_init(),
    };
    result.map_err(|_| LogError::AlreadyInitialized)
}

fn open_writer(path: &Option<PathBuf>) -> Result<BoxMakeWriter, LogError> {
    match path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .map_err(|e| LogError::FileOpen(format!("{}: {e}", path.display())))?;
            Ok(BoxMakeWriter::new(Mutex::new(file)))
        }
        None => Ok(BoxMakeWriter::new(std::io::stderr)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(LogError::UnknownFormat(f)) if f == "xml"
        ));
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let config = LogConfig {
            level: "trivia_core=notalevel".to_string(),
            ..Default::default()
        };
        assert!(matches!(init_logging(&config), Err(LogError::InvalidFilter(_))));
    }

    fn file_config(format: LogFormat, path: PathBuf) -> LogConfig {
        LogConfig {
            format,
            level: "info".to_string(),
            output_path: Some(path),
        }
    }

    // Only one subscriber can be installed per process, so these check the
    // file sink, which is opened before installation.
    #[test]
    fn log_file_is_created_for_every_format() {
        let dir = tempfile::tempdir().unwrap();
        for format in [LogFormat::Json, LogFormat::Pretty, LogFormat::Compact] {
            let path = dir.path().join(format!("{}.log", format.as_str()));
            let result = init_logging(&file_config(format, path.clone()));
            assert!(matches!(result, Ok(()) | Err(LogError::AlreadyInitialized)));
            assert!(path.exists(), "{} format did not create its log file", format.as_str());
        }
    }

    #[test]
    fn unopenable_log_file_is_rejected_for_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("trivia.log");
        for format in [LogFormat::Json, LogFormat::Pretty, LogFormat::Compact] {
            let result = init_logging(&file_config(format, path.clone()));
            assert!(matches!(result, Err(LogError::FileOpen(_))));
        }
    }
}
