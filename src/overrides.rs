//! Caller-supplied replacements for dataset entries.
//!
//! An override names a type and a partial record. When the type is already
//! known, fields missing from the override are taken from the existing entry
//! (see [`apply_defaults`]); otherwise the override alone describes the new
//! entry. Overrides apply in insertion order.

use crate::entry::{Entry, MimeRecord};
use crate::error::MimeError;
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Ordered mapping of type string to override record.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    records: IndexMap<String, MimeRecord>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the override for `mime_type`. A replaced override
    /// keeps its original position.
    pub fn insert(&mut self, mime_type: &str, record: MimeRecord) -> &mut Self {
        self.records.insert(mime_type.to_string(), record);
        self
    }

    pub fn with(mut self, mime_type: &str, record: MimeRecord) -> Self {
        self.insert(mime_type, record);
        self
    }

    pub fn get(&self, mime_type: &str) -> Option<&MimeRecord> {
        self.records.get(mime_type)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MimeRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Validates and converts a JSON override mapping.
    ///
    /// The value must be an object whose members are objects. JSON cannot
    /// carry a function, so a member whose `predicate` is set to anything
    /// but a falsy value (`null`, `false`, `0`, `""`) is rejected.
    pub fn from_json(value: &Value) -> Result<Self, MimeError> {
        let map = value
            .as_object()
            .ok_or_else(|| MimeError::config("overrides must be an object"))?;

        let mut overrides = Overrides::new();
        for (mime_type, raw) in map {
            let fields = raw.as_object().ok_or_else(|| {
                MimeError::config(format!("override for '{}' must be an object", mime_type))
            })?;
            if fields.get("predicate").is_some_and(|p| !is_falsy(p)) {
                return Err(MimeError::config("predicate must be a function"));
            }
            let record: MimeRecord = serde_json::from_value(raw.clone()).map_err(|e| {
                MimeError::config(format!("invalid override for '{}': {}", mime_type, e))
            })?;
            overrides.insert(mime_type, record);
        }
        Ok(overrides)
    }

    pub fn from_json_str(json: &str) -> Result<Self, MimeError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| MimeError::config(format!("overrides are not valid JSON: {}", e)))?;
        Self::from_json(&value)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MimeError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| MimeError::FileReadFailed {
            path: path.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&contents)
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

impl<S: Into<String>> FromIterator<(S, MimeRecord)> for Overrides {
    fn from_iter<T: IntoIterator<Item = (S, MimeRecord)>>(iter: T) -> Self {
        Overrides {
            records: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Field-by-field merge: every field set on `record` wins, every unset
/// field is filled from `from`. Vectors are replaced, never concatenated.
pub fn apply_defaults(from: &Entry, record: &MimeRecord) -> MimeRecord {
    MimeRecord {
        source: record.source.or(Some(from.source)),
        extensions: record
            .extensions
            .clone()
            .or_else(|| Some(from.extensions.clone())),
        compressible: record.compressible.or(Some(from.compressible)),
        charset: record.charset.clone().or_else(|| from.charset.clone()),
        predicate: record.predicate.clone().or_else(|| from.predicate.clone()),
    }
}
