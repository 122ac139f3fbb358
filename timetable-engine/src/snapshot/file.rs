//! Disk-based snapshot store.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::Dataset;

use super::SnapshotStore;
use super::error::SnapshotError;

/// Snapshot file contents: the dataset plus when it was written.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    /// Unix timestamp when the snapshot was written.
    saved_at_secs: u64,
    dataset: Dataset,
}

/// Configuration for the file snapshot store.
#[derive(Debug, Clone)]
pub struct FileSnapshotConfig {
    /// Path to the snapshot file.
    pub path: PathBuf,
}

impl FileSnapshotConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for FileSnapshotConfig {
    fn default() -> Self {
        // Default to a snapshot file in the current directory
        Self::new("timetable_snapshot.json")
    }
}

/// Snapshot store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    config: FileSnapshotConfig,
}

impl FileSnapshotStore {
    pub fn new(config: FileSnapshotConfig) -> Self {
        Self { config }
    }

    /// When the current snapshot was written, if there is one.
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        let stored = self.read()?;
        DateTime::from_timestamp(i64::try_from(stored.saved_at_secs).ok()?, 0)
    }

    /// Get the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Sibling file the snapshot is written to before being renamed into place.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .config
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.config.path.with_file_name(name)
    }

    fn read(&self) -> Option<StoredSnapshot> {
        let contents = std::fs::read_to_string(&self.config.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(stored) => Some(stored),
            Err(e) => {
                warn!(
                    path = %self.config.path.display(),
                    error = %e,
                    "ignoring unreadable snapshot"
                );
                None
            }
        }
    }
}

impl SnapshotStore for FileSnapshotStore {
    /// Returns `None` if the file doesn't exist or is not a valid snapshot.
    fn load(&self) -> Option<Dataset> {
        self.read().map(|s| s.dataset)
    }

    /// Creates parent directories if they don't exist. The previous snapshot
    /// stays intact until the new one is fully written.
    fn save(&self, dataset: &Dataset) -> Result<(), SnapshotError> {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|_| SnapshotError::Io {
                message: "system time before unix epoch".to_string(),
            })?
            .as_secs();

        let stored = StoredSnapshot {
            saved_at_secs: now,
            dataset: dataset.clone(),
        };

        if let Some(parent) = self.config.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| SnapshotError::Io {
                message: format!("failed to create snapshot directory: {}", e),
            })?;
        }

        let json = serde_json::to_string_pretty(&stored)?;

        let temp = self.temp_path();
        std::fs::write(&temp, json).map_err(|e| SnapshotError::Io {
            message: format!("failed to write snapshot file: {}", e),
        })?;

        if let Err(e) = std::fs::rename(&temp, &self.config.path) {
            let _ = std::fs::remove_file(&temp);
            return Err(SnapshotError::Io {
                message: format!("failed to replace snapshot file: {}", e),
            });
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        match std::fs::remove_file(&self.config.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SnapshotError::Io {
                message: format!("failed to remove snapshot file: {}", e),
            }),
        }
    }
}
