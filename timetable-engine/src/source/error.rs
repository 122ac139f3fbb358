//! Timetable source error types.

/// Broad class of a fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document could not be read (network, status, missing).
    Transport,
    /// The document was read but is not the expected shape.
    Format,
}

/// Errors from fetching a timetable document.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("{path} returned status {status}")]
    Status { path: String, status: u16 },

    /// Body is not a valid document
    #[error("{path} is not a valid document: {message}")]
    Format { path: String, message: String },

    /// Path cannot be resolved against the source's base
    #[error("invalid path {path:?}: {message}")]
    InvalidPath { path: String, message: String },

    /// No document is registered at this path
    #[error("no document at {0}")]
    NotFound(String),
}

impl SourceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SourceError::Format { .. } => ErrorKind::Format,
            _ => ErrorKind::Transport,
        }
    }

    pub(crate) fn format(path: &str, err: serde_json::Error) -> Self {
        SourceError::Format {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}
