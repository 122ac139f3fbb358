//! Timetable synchronization.
//!
//! Fetches a fresh dataset from a [`TimetableSource`], persists it as the new
//! snapshot, and falls back to the previous snapshot when anything goes
//! wrong. A sync never returns an error: the report says whether the data
//! is fresh, stale or missing.
//!
//! In multi-source mode every file listed in the manifest is fetched
//! concurrently; the merged dataset follows manifest order no matter which
//! fetch finishes first.

mod config;
mod error;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub use config::{BatchMode, DEFAULT_DATASET_PATH, Protocol, SyncConfig};
pub use error::SyncError;

use crate::domain::Dataset;
use crate::snapshot::SnapshotStore;
use crate::source::TimetableSource;

/// Outcome of one synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Fresh data was fetched and persisted.
    Success,
    /// The fetch failed; the last snapshot is being served.
    Degraded,
    /// The fetch failed and there is no snapshot; the dataset is empty.
    Failed,
}

/// Result of a synchronization, handed back to the caller.
#[derive(Debug)]
pub struct SyncReport {
    pub status: SyncStatus,

    /// Data to serve from now on.
    pub dataset: Dataset,

    /// Why the fetch did not succeed, for `Degraded` and `Failed`.
    pub error: Option<SyncError>,

    /// Manifest files that were skipped under lenient batching.
    pub failed_files: Vec<String>,
}

impl SyncReport {
    pub fn is_fresh(&self) -> bool {
        self.status == SyncStatus::Success
    }
}

/// Fresh data from a fetch, before it is persisted.
struct Fetched {
    dataset: Dataset,
    failed_files: Vec<String>,
}

/// Runs synchronizations against a source and a snapshot store.
pub struct SyncCoordinator<S, P> {
    source: S,
    store: P,
    config: SyncConfig,
    limiter: Option<Arc<Semaphore>>,
}

impl<S: TimetableSource, P: SnapshotStore> SyncCoordinator<S, P> {
    pub fn new(source: S, store: P, config: SyncConfig) -> Self {
        let limiter = config
            .max_concurrent
            .map(|n| Arc::new(Semaphore::new(n.max(1))));
        Self {
            source,
            store,
            config,
            limiter,
        }
    }

    /// Fetch, merge and persist, or fall back to the snapshot.
    pub async fn sync(&self) -> SyncReport {
        let fetched = match &self.config.protocol {
            Protocol::Single { path } => self.fetch_single(path).await,
            Protocol::Multi { manifest } => self.fetch_multi(manifest).await,
        };

        match fetched {
            Ok(fetched) => self.commit(fetched),
            Err(err) => self.fall_back(err),
        }
    }

    /// The snapshot store.
    pub fn store(&self) -> &P {
        &self.store
    }

    /// The timetable source.
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    async fn fetch_single(&self, path: &str) -> Result<Fetched, SyncError> {
        let dataset = self.source.fetch_dataset(path).await?;
        Ok(Fetched {
            dataset,
            failed_files: Vec::new(),
        })
    }

    async fn fetch_multi(&self, manifest_path: &str) -> Result<Fetched, SyncError> {
        let manifest = self.source.fetch_manifest(manifest_path).await?;
        let paths = manifest.paths();

        if paths.is_empty() {
            return Err(SyncError::EmptyManifest(manifest_path.to_string()));
        }

        debug!(files = paths.len(), "fetching manifest files");

        let futures: Vec<_> = paths
            .iter()
            .map(|path| async move {
                // A closed semaphore only means no limit.
                let _permit = match &self.limiter {
                    Some(limiter) => limiter.acquire().await.ok(),
                    None => None,
                };
                (*path, self.source.fetch_dataset(path).await)
            })
            .collect();

        let results = join_all(futures).await;

        let mut parts = Vec::with_capacity(results.len());
        let mut failed_files = Vec::new();
        let mut first_failure = None;

        for (path, result) in results {
            match result {
                Ok(dataset) => parts.push(dataset),
                Err(e) => match self.config.batch_mode {
                    BatchMode::Strict => {
                        return Err(SyncError::File {
                            path: path.to_string(),
                            source: e,
                        });
                    }
                    BatchMode::Lenient => {
                        warn!(file = path, error = %e, "skipping timetable file");
                        failed_files.push(path.to_string());
                        if first_failure.is_none() {
                            first_failure = Some(SyncError::File {
                                path: path.to_string(),
                                source: e,
                            });
                        }
                    }
                },
            }
        }

        // Every file failing is a failed fetch, not an empty timetable.
        if parts.is_empty()
            && let Some(err) = first_failure
        {
            return Err(err);
        }

        Ok(Fetched {
            dataset: Dataset::concat(parts),
            failed_files,
        })
    }

    fn commit(&self, fetched: Fetched) -> SyncReport {
        if let Err(e) = self.store.save(&fetched.dataset) {
            warn!(error = %e, "failed to persist timetable snapshot");
        }

        info!(
            lines = fetched.dataset.len(),
            skipped_files = fetched.failed_files.len(),
            "timetable synchronized"
        );

        SyncReport {
            status: SyncStatus::Success,
            dataset: fetched.dataset,
            error: None,
            failed_files: fetched.failed_files,
        }
    }

    fn fall_back(&self, cause: SyncError) -> SyncReport {
        match self.snapshot() {
            Ok(dataset) => {
                warn!(
                    error = %cause,
                    lines = dataset.len(),
                    "sync failed, serving cached timetable"
                );
                SyncReport {
                    status: SyncStatus::Degraded,
                    dataset,
                    error: Some(cause),
                    failed_files: Vec::new(),
                }
            }
            Err(miss) => {
                warn!(error = %cause, fallback = %miss, "sync failed, no timetable available");
                SyncReport {
                    status: SyncStatus::Failed,
                    dataset: Dataset::empty(),
                    error: Some(cause),
                    failed_files: Vec::new(),
                }
            }
        }
    }

    /// The stored snapshot, or `CacheMiss`.
    pub fn snapshot(&self) -> Result<Dataset, SyncError> {
        self.store.load().ok_or(SyncError::CacheMiss)
    }
}
