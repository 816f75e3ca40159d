//! A single MIME type record and its defaulting rules.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display, EnumString};

lazy_static! {
    static ref COMPRESSIBLE_RX: Regex =
        Regex::new(r"^text/|\+json$|\+text$|\+xml$").expect("compressible pattern is valid");
}

/// Per-entry transform attached through an override. Called with an owned
/// clone of the stored entry; its return value is what the lookup yields.
pub type Predicate = Arc<dyn Fn(Entry) -> Entry + Send + Sync>;

/// Where an entry's metadata came from.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum Source {
    #[strum(serialize = "iana")]
    #[serde(rename = "iana")]
    Iana,
    #[strum(serialize = "apache")]
    #[serde(rename = "apache")]
    Apache,
    #[strum(serialize = "nginx")]
    #[serde(rename = "nginx")]
    Nginx,
    /// Built by this crate from dataset or override metadata that named no source.
    #[default]
    #[strum(serialize = "mime-db")]
    #[serde(rename = "mime-db")]
    MimeDb,
    /// Synthesized on demand for a type string the dataset does not know.
    #[strum(serialize = "ad-hoc")]
    #[serde(rename = "ad-hoc")]
    AdHoc,
}

/// Partial metadata for a type: one dataset row, or one override.
///
/// Every field is optional. Absent fields fall back to the entry defaults
/// (or, for overrides, to the entry being overridden).
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct MimeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(skip)]
    pub predicate: Option<Predicate>,
}

impl MimeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_compressible(mut self, compressible: bool) -> Self {
        self.compressible = Some(compressible);
        self
    }

    pub fn with_charset(mut self, charset: &str) -> Self {
        self.charset = Some(charset.to_string());
        self
    }

    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(Entry) -> Entry + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }
}

impl fmt::Debug for MimeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MimeRecord")
            .field("source", &self.source)
            .field("extensions", &self.extensions)
            .field("compressible", &self.compressible)
            .field("charset", &self.charset)
            .field("predicate", &self.predicate.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Fully populated metadata for one MIME type.
#[derive(Clone, Serialize)]
pub struct Entry {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub source: Source,
    pub extensions: Vec<String>,
    pub compressible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(skip)]
    pub predicate: Option<Predicate>,
}

impl Entry {
    /// Builds an entry for `mime_type`, taking every field present in
    /// `record` and defaulting the rest. Any string is accepted as a type.
    pub fn new(mime_type: &str, record: &MimeRecord) -> Self {
        Entry {
            mime_type: mime_type.to_string(),
            source: record.source.unwrap_or_default(),
            extensions: record.extensions.clone().unwrap_or_default(),
            compressible: record
                .compressible
                .unwrap_or_else(|| is_compressible_type(mime_type)),
            charset: record.charset.clone(),
            predicate: record.predicate.clone(),
        }
    }

    pub fn has_predicate(&self) -> bool {
        self.predicate.is_some()
    }
}

// Predicates compare by identity; closures have no structural equality.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.mime_type == other.mime_type
            && self.source == other.source
            && self.extensions == other.extensions
            && self.compressible == other.compressible
            && self.charset == other.charset
            && match (&self.predicate, &other.predicate) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("type", &self.mime_type)
            .field("source", &self.source)
            .field("extensions", &self.extensions)
            .field("compressible", &self.compressible)
            .field("charset", &self.charset)
            .field("predicate", &self.predicate.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// True for `text/*` and for `+json`, `+text`, `+xml` structured suffixes.
pub fn is_compressible_type(mime_type: &str) -> bool {
    COMPRESSIBLE_RX.is_match(mime_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults_for_empty_record() {
        let entry = Entry::new("application/x-thing", &MimeRecord::new());
        assert_eq!(entry.mime_type, "application/x-thing");
        assert_eq!(entry.source, Source::MimeDb);
        assert!(entry.extensions.is_empty());
        assert!(!entry.compressible);
        assert!(entry.charset.is_none());
        assert!(!entry.has_predicate());
    }

    #[test]
    fn test_compressible_derived_from_type() {
        assert!(Entry::new("text/plain", &MimeRecord::new()).compressible);
        assert!(Entry::new("application/ld+json", &MimeRecord::new()).compressible);
        assert!(Entry::new("image/svg+xml", &MimeRecord::new()).compressible);
        assert!(Entry::new("application/foo+text", &MimeRecord::new()).compressible);
        assert!(!Entry::new("application/octet-stream", &MimeRecord::new()).compressible);
        assert!(!Entry::new("application/json+zip", &MimeRecord::new()).compressible);
        // Prefix must be anchored at the start of the type.
        assert!(!Entry::new("x-text/plain", &MimeRecord::new()).compressible);
    }

    #[test]
    fn test_explicit_compressible_wins() {
        let entry = Entry::new("text/plain", &MimeRecord::new().with_compressible(false));
        assert!(!entry.compressible);
        let entry = Entry::new(
            "application/octet-stream",
            &MimeRecord::new().with_compressible(true),
        );
        assert!(entry.compressible);
    }

    #[test]
    fn test_record_fields_overwrite_defaults() {
        let record = MimeRecord::new()
            .with_source(Source::Apache)
            .with_extensions(["foo", "bar"])
            .with_charset("UTF-8");
        let entry = Entry::new("application/x-foo", &record);
        assert_eq!(entry.source, Source::Apache);
        assert_eq!(entry.extensions, vec!["foo", "bar"]);
        assert_eq!(entry.charset.as_deref(), Some("UTF-8"));
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(Source::AdHoc.to_string(), "ad-hoc");
        assert_eq!(Source::MimeDb.as_ref(), "mime-db");
        assert_eq!(Source::from_str("nginx").unwrap(), Source::Nginx);
        assert!(Source::from_str("unknown").is_err());
    }

    #[test]
    fn test_record_deserializes_and_ignores_predicate_key() {
        let record: MimeRecord = serde_json::from_value(serde_json::json!({
            "source": "iana",
            "extensions": ["html"],
            "predicate": "ignored"
        }))
        .unwrap();
        assert_eq!(record.source, Some(Source::Iana));
        assert!(record.predicate.is_none());
        assert!(record.compressible.is_none());
    }

    #[test]
    fn test_entry_serializes_type_field() {
        let entry = Entry::new(
            "text/html",
            &MimeRecord::new().with_predicate(|e| e),
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "text/html");
        assert_eq!(value["source"], "mime-db");
        assert_eq!(value["compressible"], true);
        assert!(value.get("predicate").is_none());
        assert!(value.get("charset").is_none());
    }

    #[test]
    fn test_equality_tracks_predicate_identity() {
        let record = MimeRecord::new().with_predicate(|e| e);
        let a = Entry::new("text/plain", &record);
        let b = Entry::new("text/plain", &record);
        assert_eq!(a, b);
        let c = Entry::new("text/plain", &MimeRecord::new().with_predicate(|e| e));
        assert_ne!(a, c);
    }
}
