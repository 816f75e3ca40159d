//! The bundled mime-db table and the loaders for external datasets.
//!
//! Datasets are JSON objects keyed by type string, each value a metadata
//! record with optional `source`, `extensions`, `compressible`, and
//! `charset` members. They are parsed as data only; document order is kept
//! because it decides which type wins a shared extension.

use crate::entry::MimeRecord;
use crate::error::MimeError;
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Type string to partial metadata, in document order.
pub type Dataset = IndexMap<String, MimeRecord>;

pub static EMBEDDED_DATASET_STRING: &str = include_str!("db.json");

/// Parses the bundled dataset.
pub fn embedded() -> Result<Dataset, MimeError> {
    from_json_str(EMBEDDED_DATASET_STRING)
}

pub fn from_json_str(json: &str) -> Result<Dataset, MimeError> {
    let dataset: Dataset = serde_json::from_str(json)?;
    debug!(entries = dataset.len(), "parsed MIME dataset");
    Ok(dataset)
}

pub fn from_path(path: impl AsRef<Path>) -> Result<Dataset, MimeError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| MimeError::FileReadFailed {
        path: path.to_string_lossy().to_string(),
        reason: e.to_string(),
    })?;
    from_json_str(&contents)
}
