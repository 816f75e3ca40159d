//! Log subscriber setup.
//!
//! The library itself only emits `tracing` events. Binaries and tests call
//! [`init_logs`] once to decide where those events go.

use crate::error::MimeError;
use serde::{Deserialize, Serialize};
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// "logs": {
//   "enabled": true,
//   "level": "info",
//   "destination": { "type": "file", "path": "/var/log/mimetable" }
// }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    pub enabled: bool,
    pub level: String,
    pub destination: LogDestination,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            enabled: false,
            level: "warn".to_string(),
            destination: LogDestination::Stderr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LogDestination {
    #[serde(rename = "stderr")]
    Stderr,
    /// Directory receiving a daily rolling `mimetable.log`.
    #[serde(rename = "file")]
    File { path: String },
    #[serde(rename = "null")]
    Null,
}

/// Installs the global subscriber described by `config`.
///
/// Returns the file writer's guard for [`LogDestination::File`]; keep it
/// alive for as long as logs should be flushed. An already installed
/// subscriber is left in place for stderr output.
pub fn init_logs(config: &LogConfig) -> Result<Option<WorkerGuard>, MimeError> {
    if !config.enabled {
        return Ok(None);
    }

    let filter = EnvFilter::try_new(&config.level).map_err(|e| {
        MimeError::config(format!("invalid log level '{}': {}", config.level, e))
    })?;

    match &config.destination {
        LogDestination::File { path } => {
            let file_appender = RollingFileAppender::new(Rotation::DAILY, path, "mimetable.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            Registry::default()
                .with(filter)
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .try_init()
                .map_err(|e| MimeError::Internal {
                    message: format!("failed to install file log subscriber: {}", e),
                })?;
            Ok(Some(guard))
        }
        LogDestination::Stderr => {
            let _ = Registry::default()
                .with(filter)
                .with(fmt::layer().with_writer(io::stderr))
                .try_init();
            Ok(None)
        }
        LogDestination::Null => Ok(None),
    }
}
