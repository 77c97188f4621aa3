///! Logging configuration module
///! Console logging to stderr, plus an optional rolling JSON file

use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "quiesce.log";

/// Log rotation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

impl LogRotation {
    /// Unknown names fall back to daily rotation
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "hourly" => Self::Hourly,
            "never" => Self::Never,
            _ => Self::Daily,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: Option<PathBuf>,
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            log_dir: None,
            rotation: LogRotation::Daily,
        }
    }
}

impl LoggingConfig {
    /// `RUST_LOG` wins over the configured level
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    /// Install the global subscriber.
    ///
    /// The returned guard flushes the file writer and must live until exit.
    pub fn init(&self) -> anyhow::Result<Option<WorkerGuard>> {
        let console_layer = fmt::layer()
            .with_target(false)
            .with_level(true)
            .with_writer(io::stderr);

        let guard = match &self.log_dir {
            Some(dir) => {
                let file_appender = match self.rotation {
                    LogRotation::Hourly => rolling::hourly(dir, LOG_FILE_PREFIX),
                    LogRotation::Daily => rolling::daily(dir, LOG_FILE_PREFIX),
                    LogRotation::Never => rolling::never(dir, LOG_FILE_PREFIX),
                };
                let (writer, guard) = non_blocking(file_appender);

                let file_layer = fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false)
                    .json()
                    .with_writer(writer);

                tracing_subscriber::registry()
                    .with(self.env_filter())
                    .with(console_layer)
                    .with(file_layer)
                    .try_init()?;

                Some(guard)
            }
            None => {
                tracing_subscriber::registry()
                    .with(self.env_filter())
                    .with(console_layer)
                    .try_init()?;

                None
            }
        };

        tracing::debug!("Logging initialized - level: {}", self.level);
        Ok(guard)
    }
}
