//! Last known-good dataset.
//!
//! The snapshot is written after every fully successful sync and read back
//! when a sync fails or when the engine starts cold. Stores hold exactly one
//! dataset; saving replaces it.

mod error;
mod file;

use std::sync::Mutex;

pub use error::SnapshotError;
pub use file::{FileSnapshotConfig, FileSnapshotStore};

use crate::domain::Dataset;

/// Storage for the last successfully synchronized dataset.
pub trait SnapshotStore {
    /// The stored dataset, or `None` if there is nothing usable.
    fn load(&self) -> Option<Dataset>;

    /// Replace the stored dataset.
    fn save(&self, dataset: &Dataset) -> Result<(), SnapshotError>;

    /// Remove the stored dataset.
    fn clear(&self) -> Result<(), SnapshotError>;
}

/// Snapshot store that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<Dataset>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `dataset`.
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            slot: Mutex::new(Some(dataset)),
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Option<Dataset> {
        self.slot.lock().ok()?.clone()
    }

    fn save(&self, dataset: &Dataset) -> Result<(), SnapshotError> {
        let mut slot = self.slot.lock().map_err(|_| SnapshotError::Poisoned)?;
        *slot = Some(dataset.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        let mut slot = self.slot.lock().map_err(|_| SnapshotError::Poisoned)?;
        *slot = None;
        Ok(())
    }
}
