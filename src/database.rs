//! Type and extension indexes compiled from a dataset.

use crate::dataset::{self, Dataset};
use crate::entry::Entry;
use crate::error::MimeError;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, error};

/// A database behind a lock, as held by a `Resolver`.
pub type SharedDatabase = Arc<RwLock<Database>>;

lazy_static! {
    static ref BASE: SharedDatabase = Arc::new(RwLock::new(compile_embedded()));
}

/// The process-wide database compiled from the bundled dataset.
///
/// Resolvers built without overrides hold this instance, so ad-hoc types
/// cached by any of them become visible to all of them.
pub fn base() -> SharedDatabase {
    Arc::clone(&BASE)
}

fn compile_embedded() -> Database {
    match dataset::embedded() {
        Ok(dataset) => Database::compile(&dataset),
        Err(e) => {
            error!("bundled MIME dataset could not be parsed, starting empty: {}", e);
            Database::default()
        }
    }
}

/// Lookup indexes over a set of entries.
///
/// Cloning copies both maps but shares the entries themselves.
#[derive(Debug, Clone, Default)]
pub struct Database {
    by_type: HashMap<String, Arc<Entry>>,
    by_extension: HashMap<String, Arc<Entry>>,
    max_ext_length: usize,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one entry per dataset row, inserted in document order.
    pub fn compile(dataset: &Dataset) -> Self {
        let mut db = Database::new();
        for (mime_type, record) in dataset {
            db.insert(mime_type, Entry::new(mime_type, record));
        }
        debug!(
            types = db.by_type.len(),
            extensions = db.by_extension.len(),
            max_ext_length = db.max_ext_length,
            "compiled MIME database"
        );
        db
    }

    pub fn from_json_str(json: &str) -> Result<Self, MimeError> {
        Ok(Self::compile(&dataset::from_json_str(json)?))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MimeError> {
        Ok(Self::compile(&dataset::from_path(path)?))
    }

    /// Indexes `entry` under `mime_type` and under each of its extensions,
    /// replacing whatever held those keys. Returns the stored entry.
    ///
    /// Extension keys are never removed, so `max_ext_length` only grows.
    pub fn insert(&mut self, mime_type: &str, entry: Entry) -> Arc<Entry> {
        let entry = Arc::new(entry);
        self.by_type.insert(mime_type.to_string(), Arc::clone(&entry));
        for ext in &entry.extensions {
            self.by_extension.insert(ext.clone(), Arc::clone(&entry));
            self.max_ext_length = self.max_ext_length.max(ext.chars().count());
        }
        entry
    }

    pub fn get_type(&self, mime_type: &str) -> Option<&Arc<Entry>> {
        self.by_type.get(mime_type)
    }

    pub fn get_extension(&self, extension: &str) -> Option<&Arc<Entry>> {
        self.by_extension.get(extension)
    }

    pub fn contains_type(&self, mime_type: &str) -> bool {
        self.by_type.contains_key(mime_type)
    }

    /// Length in characters of the longest extension ever indexed.
    pub fn max_ext_length(&self) -> usize {
        self.max_ext_length
    }

    /// Number of indexed types.
    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    pub fn extensions(&self) -> impl Iterator<Item = (&str, &Arc<Entry>)> {
        self.by_extension.iter().map(|(k, v)| (k.as_str(), v))
    }
}
