//! MIME type lookup by file path or type string.
//!
//! A [`Resolver`] answers two questions over a mime-db style dataset: what
//! is the type of this file name (by extension), and what do we know about
//! this type string. Entries carry their extensions, whether the type is
//! worth compressing, and an optional charset.
//!
//! ```rust
//! use mimetable::{MimeRecord, Overrides, Resolver, ResolverOptions};
//!
//! let resolver = Resolver::default();
//! let pdf = resolver.path("/reports/q3.PDF").unwrap();
//! assert_eq!(pdf.mime_type, "application/pdf");
//! assert!(resolver.mime_type("text/html; charset=utf-8").compressible);
//!
//! let custom = Resolver::new(ResolverOptions::new().overrides(
//!     Overrides::new().with("text/html", MimeRecord::new().with_compressible(false)),
//! ));
//! assert!(!custom.mime_type("text/html").compressible);
//! ```
//!
//! The bundled dataset is compiled once, on first use, and shared by every
//! resolver built without overrides. Resolvers with overrides work on their
//! own copy.

pub mod config;
pub mod database;
pub mod dataset;
pub mod entry;
pub mod error;
pub mod observability;
pub mod overrides;
pub mod resolver;

pub use database::{Database, SharedDatabase};
pub use entry::{Entry, MimeRecord, Predicate, Source};
pub use error::MimeError;
pub use overrides::Overrides;
pub use resolver::{Resolver, ResolverOptions, type_part};

use std::sync::Arc;

/// Entry for the extension of `path`, using the shared bundled database.
pub fn from_path(path: &str) -> Option<Arc<Entry>> {
    Resolver::default().path(path)
}

/// Entry for `mime_type`, using the shared bundled database.
pub fn from_type(mime_type: &str) -> Arc<Entry> {
    Resolver::default().mime_type(mime_type)
}
