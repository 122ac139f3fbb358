//! Where timetable documents come from.
//!
//! A source fetches one JSON document by path: either a dataset of lines or
//! a manifest listing dataset paths. Sources never retry and never fall back;
//! that policy belongs to the sync coordinator.
//!
//! Key characteristics:
//! - Every fetch asks for the freshest copy (`no_cache`)
//! - A body that parses but has no `lines` field is an empty dataset, not
//!   an error

mod error;
mod http;
mod static_source;

use std::future::Future;

pub use error::{ErrorKind, SourceError};
pub use http::{HttpSource, HttpSourceConfig};
pub use static_source::StaticSource;

use crate::domain::{Dataset, Manifest};

/// Fetches timetable documents by path.
///
/// This abstraction allows the sync coordinator to be tested with in-memory
/// documents.
pub trait TimetableSource {
    /// Fetch and parse a dataset document.
    fn fetch_dataset(&self, path: &str) -> impl Future<Output = Result<Dataset, SourceError>>;

    /// Fetch and parse a manifest document.
    fn fetch_manifest(&self, path: &str) -> impl Future<Output = Result<Manifest, SourceError>>;
}

fn parse_dataset(path: &str, body: &str) -> Result<Dataset, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::format(path, e))
}

fn parse_manifest(path: &str, body: &str) -> Result<Manifest, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::format(path, e))
}
