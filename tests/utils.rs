#![allow(dead_code)]

use mimetable::{Database, Entry, Overrides, Resolver, ResolverOptions, SharedDatabase};
use std::io::Write;
use std::sync::{Arc, RwLock};
use tempfile::NamedTempFile;

/// Resolver on a private copy of the bundled database, so ad-hoc caching in
/// one test cannot be observed by another.
pub fn private_resolver() -> Resolver {
    Resolver::new(ResolverOptions::new().overrides(Overrides::new()))
}

pub fn shared_from_json(json: &str) -> SharedDatabase {
    Arc::new(RwLock::new(
        Database::from_json_str(json).expect("test dataset should parse"),
    ))
}

/// Stored entry for `mime_type`, bypassing predicates.
pub fn stored_entry(resolver: &Resolver, mime_type: &str) -> Option<Arc<Entry>> {
    resolver
        .database()
        .read()
        .expect("database lock")
        .get_type(mime_type)
        .cloned()
}

pub fn type_count(resolver: &Resolver) -> usize {
    resolver.database().read().expect("database lock").len()
}

pub fn write_temp_json(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}
