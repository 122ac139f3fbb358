//! Synchronization error types.
//!
//! None of these escape a sync: the coordinator records them in the report
//! and serves the snapshot (or nothing) instead.

use crate::source::{ErrorKind, SourceError};

/// Why a sync did not produce fresh data.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Fetching the dataset or manifest failed
    #[error("fetch failed: {0}")]
    Source(#[from] SourceError),

    /// Manifest parsed but lists no files
    #[error("manifest {0} lists no files")]
    EmptyManifest(String),

    /// A manifest file failed and the batch was abandoned
    #[error("file {path} failed: {source}")]
    File {
        path: String,
        #[source]
        source: SourceError,
    },

    /// No snapshot to fall back on
    #[error("no cached timetable available")]
    CacheMiss,
}

impl SyncError {
    /// Transport or format, for errors that came from a fetch.
    pub fn source_kind(&self) -> Option<ErrorKind> {
        match self {
            SyncError::Source(e) | SyncError::File { source: e, .. } => Some(e.kind()),
            SyncError::EmptyManifest(_) => Some(ErrorKind::Format),
            SyncError::CacheMiss => None,
        }
    }
}
