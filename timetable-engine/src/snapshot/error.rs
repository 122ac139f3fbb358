//! Snapshot store error types.

/// Errors that can occur when writing or clearing a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Filesystem operation failed
    #[error("snapshot IO error: {message}")]
    Io { message: String },

    /// Dataset could not be serialized
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A writer panicked while holding the store lock
    #[error("snapshot store lock poisoned")]
    Poisoned,
}
