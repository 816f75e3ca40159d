//! Unified error type for the mimetable crate.
//!
//! Lookups (`Resolver::path`, `Resolver::mime_type`) are total and never
//! produce an error. Everything here is raised while loading a dataset,
//! reading configuration, or validating overrides, before a `Resolver`
//! exists.
//!
//! # Example
//!
//! ```rust
//! use mimetable::error::MimeError;
//! use mimetable::ResolverOptions;
//!
//! let err = ResolverOptions::from_json(&serde_json::json!({ "override": 42 })).unwrap_err();
//! assert!(matches!(err, MimeError::ConfigError(_)));
//! ```

use std::error::Error;
use std::fmt;

/// Unified error type for all mimetable operations.
#[derive(Debug)]
pub enum MimeError {
    /// Invalid resolver or crate configuration.
    ///
    /// Raised for:
    /// - an `override` option that is not a JSON object
    /// - an override carrying a `predicate` that is not a function
    /// - a configuration file with invalid contents
    ConfigError(String),

    /// Configuration file not found at the specified path.
    ConfigNotFound { path: String },

    /// Failed to read a dataset, override, or config file.
    FileReadFailed { path: String, reason: String },

    /// The dataset is not a mapping of type strings to metadata records.
    DatasetMalformed { reason: String },

    /// Anything that does not fit a category above, such as a failure to
    /// install the log subscriber.
    Internal { message: String },
}

impl MimeError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        MimeError::ConfigError(message.into())
    }
}

impl fmt::Display for MimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MimeError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            MimeError::ConfigNotFound { path } => {
                write!(
                    f,
                    "Configuration not found at '{}'. Check the path or unset MIMETABLE_CONFIG.",
                    path
                )
            }
            MimeError::FileReadFailed { path, reason } => {
                write!(
                    f,
                    "Failed to read file '{}': {}. Check that the file exists and has read permissions.",
                    path, reason
                )
            }
            MimeError::DatasetMalformed { reason } => {
                write!(f, "Malformed MIME dataset: {}", reason)
            }
            MimeError::Internal { message } => write!(f, "{}", message),
        }
    }
}

impl Error for MimeError {}

impl From<serde_json::Error> for MimeError {
    fn from(err: serde_json::Error) -> Self {
        MimeError::DatasetMalformed {
            reason: err.to_string(),
        }
    }
}

impl From<String> for MimeError {
    fn from(err: String) -> Self {
        MimeError::Internal { message: err }
    }
}

impl From<&str> for MimeError {
    fn from(err: &str) -> Self {
        MimeError::Internal {
            message: err.to_string(),
        }
    }
}
