//! Path and type lookups over a MIME database.

use crate::config::Config;
use crate::database::{self, Database, SharedDatabase};
use crate::entry::{Entry, MimeRecord, Source};
use crate::error::MimeError;
use crate::overrides::{Overrides, apply_defaults};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, trace};

/// Options accepted by [`Resolver::new`].
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    pub overrides: Option<Overrides>,
}

impl ResolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Reads `{"override": {...}}`. A missing or null `override` member
    /// means no overrides; anything else must be a valid override mapping.
    pub fn from_json(value: &Value) -> Result<Self, MimeError> {
        let options = value
            .as_object()
            .ok_or_else(|| MimeError::config("resolver options must be an object"))?;
        let overrides = match options.get("override") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(Overrides::from_json(raw)?),
        };
        Ok(ResolverOptions { overrides })
    }
}

/// Resolves file paths and type strings to MIME entries.
///
/// Lookups are total. The one side effect is that `mime_type` caches an
/// ad-hoc entry for a type string the database does not know.
#[derive(Debug, Clone)]
pub struct Resolver {
    db: SharedDatabase,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver { db: database::base() }
    }
}

impl Resolver {
    /// Builds a resolver on the bundled dataset.
    pub fn new(options: ResolverOptions) -> Self {
        Self::with_base(&database::base(), options)
    }

    /// Builds a resolver from JSON options, see [`ResolverOptions::from_json`].
    pub fn from_json(options: &Value) -> Result<Self, MimeError> {
        Ok(Self::new(ResolverOptions::from_json(options)?))
    }

    /// Builds a resolver on `base`.
    ///
    /// Without overrides the resolver shares `base` itself. With overrides
    /// it works on a private copy, so neither `base` nor other resolvers
    /// observe the change.
    pub fn with_base(base: &SharedDatabase, options: ResolverOptions) -> Self {
        let overrides = match options.overrides {
            Some(overrides) => overrides,
            None => {
                return Resolver {
                    db: Arc::clone(base),
                };
            }
        };

        let mut db = read_lock(base).clone();
        for (mime_type, record) in overrides.iter() {
            let merged;
            let record = match db.get_type(mime_type) {
                Some(from) => {
                    merged = apply_defaults(from, record);
                    &merged
                }
                None => record,
            };
            let entry = db.insert(mime_type, Entry::new(mime_type, record));
            debug!(
                mime_type = mime_type,
                extensions = ?entry.extensions,
                has_predicate = entry.has_predicate(),
                "applied MIME override"
            );
        }
        info!(overrides = overrides.len(), "built resolver with overrides");

        Resolver {
            db: Arc::new(RwLock::new(db)),
        }
    }

    /// Builds a resolver from the dataset and override files named in
    /// `config`, falling back to the bundled dataset.
    pub fn from_config(config: &Config) -> Result<Self, MimeError> {
        let base = match config.dataset_path() {
            Some(path) => Arc::new(RwLock::new(Database::from_path(path)?)),
            None => database::base(),
        };
        let overrides = match config.overrides_path() {
            Some(path) => Some(Overrides::from_path(path)?),
            None => None,
        };
        Ok(Self::with_base(&base, ResolverOptions { overrides }))
    }

    /// Looks up the entry for the extension of `path`, ignoring case.
    ///
    /// `None` when the path has no extension or the extension is unknown.
    pub fn path(&self, path: &str) -> Option<Arc<Entry>> {
        let extension = extension_of(path).to_lowercase();
        let found = read_lock(&self.db).get_extension(&extension).cloned();
        trace!(path = path, extension = %extension, found = found.is_some(), "path lookup");
        found.map(|entry| apply_predicate(&entry))
    }

    /// Looks up the entry for a type string such as `text/html; charset=utf-8`.
    ///
    /// Parameters are dropped, then the type is tried as given and again
    /// trimmed and lowercased. An unknown type gets a new `ad-hoc` entry that
    /// is cached on this resolver's database and returned as stored.
    pub fn mime_type(&self, mime_type: &str) -> Arc<Entry> {
        let exact = type_part(mime_type);
        let normalized = exact.trim().to_lowercase();

        if let Some(entry) = self.lookup(exact, &normalized) {
            return apply_predicate(&entry);
        }

        let mut db = write_lock(&self.db);
        // Another caller may have cached it between the locks.
        if let Some(entry) = db.get_type(&normalized) {
            return Arc::clone(entry);
        }
        let entry = db.insert(
            &normalized,
            Entry::new(&normalized, &MimeRecord::new().with_source(Source::AdHoc)),
        );
        debug!(
            event = "adhoc_type_cached",
            mime_type = %normalized,
            compressible = entry.compressible,
            "cached unknown MIME type"
        );
        entry
    }

    /// Same as [`Resolver::mime_type`].
    pub fn r#type(&self, mime_type: &str) -> Arc<Entry> {
        self.mime_type(mime_type)
    }

    /// The database this resolver reads from and caches into.
    pub fn database(&self) -> &SharedDatabase {
        &self.db
    }

    /// True when `other` reads from the same database instance.
    pub fn shares_database_with(&self, other: &Resolver) -> bool {
        Arc::ptr_eq(&self.db, &other.db)
    }

    fn lookup(&self, exact: &str, normalized: &str) -> Option<Arc<Entry>> {
        let db = read_lock(&self.db);
        db.get_type(exact)
            .or_else(|| db.get_type(normalized))
            .cloned()
    }
}

/// The part of a content type before its first `;`.
pub fn type_part(mime_type: &str) -> &str {
    match mime_type.find(';') {
        Some(at) => &mime_type[..at],
        None => mime_type,
    }
}

/// Runs the entry's predicate on a clone of it, if it has one.
pub fn apply_predicate(entry: &Arc<Entry>) -> Arc<Entry> {
    match &entry.predicate {
        Some(predicate) => Arc::new(predicate(entry.as_ref().clone())),
        None => Arc::clone(entry),
    }
}

/// Extension of the last path component without its dot; empty when there
/// is none. Dotfiles such as `.bashrc` have no extension.
fn extension_of(path: &str) -> &str {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

fn read_lock(db: &SharedDatabase) -> RwLockReadGuard<'_, Database> {
    db.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock(db: &SharedDatabase) -> RwLockWriteGuard<'_, Database> {
    db.write().unwrap_or_else(PoisonError::into_inner)
}
