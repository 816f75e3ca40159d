use crate::error::MimeError;
use crate::observability::{LogConfig, LogDestination};
use getset::Getters;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

pub mod jenv;

use jenv::env_opt;

/*
Configuration Loading (12-Factor App Pattern)
=============================================

Configuration is loaded in the following order, with later sources overriding
earlier ones:

1. DEFAULTS: bundled dataset, no overrides, warn-level logs to stderr
2. CONFIG FILE: optional JSON file, e.g. mimetable.config.json
3. ENVIRONMENT VARIABLES: always take highest precedence

Environment Variables Supported:
- MIMETABLE_CONFIG           path of the config file when none is passed
- MIMETABLE_DATASET_PATH     mime-db style JSON replacing the bundled dataset
- MIMETABLE_OVERRIDES_PATH   JSON object of per-type overrides
- MIMETABLE_LOG_LEVEL        EnvFilter directive, e.g. "debug" or "mimetable=trace"
- MIMETABLE_LOG_DIR          write logs to a daily rolling file in this directory

Example config file:
```json
{
  "dataset_path": "/etc/mimetable/db.json",
  "overrides_path": "/etc/mimetable/overrides.json",
  "logs": { "enabled": true, "level": "info", "destination": { "type": "stderr" } }
}
```
*/

pub const MIMETABLE_CONFIG: &str = "MIMETABLE_CONFIG";
pub const MIMETABLE_DATASET_PATH: &str = "MIMETABLE_DATASET_PATH";
pub const MIMETABLE_OVERRIDES_PATH: &str = "MIMETABLE_OVERRIDES_PATH";
pub const MIMETABLE_LOG_LEVEL: &str = "MIMETABLE_LOG_LEVEL";
pub const MIMETABLE_LOG_DIR: &str = "MIMETABLE_LOG_DIR";

#[derive(Serialize, Deserialize, Debug, Clone, Default, Getters)]
pub struct Config {
    #[getset(get = "pub")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dataset_path: Option<String>,
    #[getset(get = "pub")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    overrides_path: Option<String>,
    #[getset(get = "pub")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    logs: Option<LogConfig>,
}

/// Builder for creating Config instances with a fluent API.
///
/// # Example
/// ```rust
/// use mimetable::config::Config;
///
/// let config = Config::builder()
///     .dataset_path("/etc/mimetable/db.json")
///     .log_level("debug")
///     .build();
/// assert_eq!(config.dataset_path().as_deref(), Some("/etc/mimetable/db.json"));
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    dataset_path: Option<String>,
    overrides_path: Option<String>,
    logs: Option<LogConfig>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a mime-db style JSON file instead of the bundled dataset.
    pub fn dataset_path(mut self, path: &str) -> Self {
        self.dataset_path = Some(path.to_string());
        self
    }

    /// Apply the overrides in this JSON file to every resolver built from the config.
    pub fn overrides_path(mut self, path: &str) -> Self {
        self.overrides_path = Some(path.to_string());
        self
    }

    pub fn logs(mut self, logs: LogConfig) -> Self {
        self.logs = Some(logs);
        self
    }

    /// Shorthand for enabled stderr logging at `level`.
    pub fn log_level(mut self, level: &str) -> Self {
        let mut logs = self.logs.take().unwrap_or_default();
        logs.enabled = true;
        logs.level = level.to_string();
        self.logs = Some(logs);
        self
    }

    pub fn build(self) -> Config {
        Config {
            dataset_path: self.dataset_path,
            overrides_path: self.overrides_path,
            logs: self.logs,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Load a config file without applying environment overrides.
    pub fn from_file(path: &str) -> Result<Config, MimeError> {
        if !Path::new(path).exists() {
            return Err(MimeError::ConfigNotFound {
                path: path.to_string(),
            });
        }
        let json_str = fs::read_to_string(path).map_err(|e| MimeError::FileReadFailed {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&json_str).map_err(|e| {
            MimeError::config(format!("Invalid config file '{}': {}", path, e))
        })
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: Config) {
        if other.dataset_path.is_some() {
            self.dataset_path = other.dataset_path;
        }
        if other.overrides_path.is_some() {
            self.overrides_path = other.overrides_path;
        }
        if other.logs.is_some() {
            self.logs = other.logs;
        }
    }

    /// Apply environment variable overrides to this config.
    /// Environment variables always take precedence.
    pub fn apply_env_overrides(&mut self) {
        if let Some(val) = env_opt(MIMETABLE_DATASET_PATH) {
            self.dataset_path = Some(val);
        }
        if let Some(val) = env_opt(MIMETABLE_OVERRIDES_PATH) {
            self.overrides_path = Some(val);
        }
        if let Some(level) = env_opt(MIMETABLE_LOG_LEVEL) {
            let logs = self.logs.get_or_insert_with(LogConfig::default);
            logs.enabled = true;
            logs.level = level;
        }
        if let Some(dir) = env_opt(MIMETABLE_LOG_DIR) {
            let logs = self.logs.get_or_insert_with(LogConfig::default);
            logs.enabled = true;
            logs.destination = LogDestination::File { path: dir };
        }
    }

    /// Log settings, or the defaults when none were configured.
    pub fn log_config(&self) -> LogConfig {
        self.logs.clone().unwrap_or_default()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            r#"
        Loading mimetable config variables of:
            MIMETABLE_DATASET_PATH:   {},
            MIMETABLE_OVERRIDES_PATH: {},
            MIMETABLE_LOG_LEVEL:      {},
        "#,
            self.dataset_path.as_deref().unwrap_or("(bundled)"),
            self.overrides_path.as_deref().unwrap_or(""),
            self.logs.as_ref().map(|l| l.level.as_str()).unwrap_or(""),
        )
    }
}

/// Load configuration: defaults, then the config file, then environment.
///
/// With no explicit path, `MIMETABLE_CONFIG` names the file. A file that was
/// asked for but cannot be read is an error.
pub fn load_config(config_path: Option<&str>) -> Result<Config, MimeError> {
    let mut config = Config::default();

    let env_path = env_opt(MIMETABLE_CONFIG);
    if let Some(path) = config_path.or(env_path.as_deref()) {
        let file_config = Config::from_file(path)?;
        info!("Loaded config file: {}", path);
        config.merge(file_config);
    }

    config.apply_env_overrides();

    info!("Final config:{}", config);
    Ok(config)
}
