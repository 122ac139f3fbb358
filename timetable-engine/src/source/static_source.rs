//! In-process timetable source.
//!
//! Serves JSON bodies registered by path, or loaded from a directory of
//! `*.json` files, as if they were fetched remotely. Useful for development
//! without a server and for exercising the sync coordinator: individual
//! paths can be made to fail or to answer slowly.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;

use crate::domain::{Dataset, Manifest};

use super::TimetableSource;
use super::error::SourceError;
use super::{parse_dataset, parse_manifest};

#[derive(Debug, Clone)]
enum Response {
    Body(String),
    Status(u16),
}

#[derive(Debug, Clone)]
struct Entry {
    response: Response,
    delay: Option<Duration>,
}

/// Timetable source backed by in-memory documents.
#[derive(Clone, Default)]
pub struct StaticSource {
    documents: Arc<RwLock<HashMap<String, Entry>>>,
    fetches: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

/// Counts one fetch as in flight until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl StaticSource {
    /// An empty source; every fetch fails with `NotFound`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.json` file under `dir`, keyed by its path relative to
    /// `dir` with `/` separators (e.g. `linhas/l1.json`).
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref();
        let mut documents = HashMap::new();
        load_dir(dir, dir, &mut documents)?;

        if documents.is_empty() {
            return Err(SourceError::NotFound(format!(
                "no JSON documents in {}",
                dir.display()
            )));
        }

        Ok(Self {
            documents: Arc::new(RwLock::new(documents)),
            ..Self::default()
        })
    }

    /// Serve `body` at `path`.
    pub async fn insert(&self, path: impl Into<String>, body: impl Into<String>) {
        self.put(path.into(), Response::Body(body.into())).await;
    }

    /// Answer `path` with a non-success HTTP status.
    pub async fn fail(&self, path: impl Into<String>, status: u16) {
        self.put(path.into(), Response::Status(status)).await;
    }

    /// Delay every answer for `path` by `delay`.
    pub async fn delay(&self, path: &str, delay: Duration) {
        let mut documents = self.documents.write().await;
        if let Some(entry) = documents.get_mut(path) {
            entry.delay = Some(delay);
        }
    }

    /// Stop serving `path`.
    pub async fn remove(&self, path: &str) {
        self.documents.write().await.remove(path);
    }

    /// Number of fetches attempted so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Most fetches that were ever in progress at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn put(&self, path: String, response: Response) {
        let mut documents = self.documents.write().await;
        let delay = documents.get(&path).and_then(|e| e.delay);
        documents.insert(path, Entry { response, delay });
    }

    async fn get_text(&self, path: &str) -> Result<String, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight::enter(&self.in_flight, &self.peak_in_flight);

        let entry = {
            let documents = self.documents.read().await;
            documents
                .get(path.trim())
                .cloned()
                .ok_or_else(|| SourceError::NotFound(path.to_string()))?
        };

        if let Some(delay) = entry.delay {
            tokio::time::sleep(delay).await;
        }

        match entry.response {
            Response::Body(body) => Ok(body),
            Response::Status(status) => Err(SourceError::Status {
                path: path.to_string(),
                status,
            }),
        }
    }
}

impl TimetableSource for StaticSource {
    async fn fetch_dataset(&self, path: &str) -> Result<Dataset, SourceError> {
        let body = self.get_text(path).await?;
        parse_dataset(path, &body)
    }

    async fn fetch_manifest(&self, path: &str) -> Result<Manifest, SourceError> {
        let body = self.get_text(path).await?;
        parse_manifest(path, &body)
    }
}

fn load_dir(root: &Path, dir: &Path, out: &mut HashMap<String, Entry>) -> Result<(), SourceError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        SourceError::NotFound(format!("failed to read {}: {}", dir.display(), e))
    })?;

    for entry in entries {
        let path = entry
            .map_err(|e| SourceError::NotFound(format!("failed to read directory entry: {}", e)))?
            .path();

        if path.is_dir() {
            load_dir(root, &path, out)?;
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let key = path
            .strip_prefix(root)
            .map_err(|_| SourceError::InvalidPath {
                path: path.display().to_string(),
                message: "outside of source directory".to_string(),
            })?
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let body = std::fs::read_to_string(&path).map_err(|e| {
            SourceError::NotFound(format!("failed to read {}: {}", path.display(), e))
        })?;

        out.insert(
            key,
            Entry {
                response: Response::Body(body),
                delay: None,
            },
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ErrorKind;
    use tempfile::tempdir;

    #[tokio::test]
    async fn serves_registered_documents() {
        let source = StaticSource::new();
        source
            .insert("db.json", r#"{ "lines": [{ "origin": "A" }] }"#)
            .await;

        let dataset = source.fetch_dataset("db.json").await.unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn unknown_path_is_transport_error() {
        let source = StaticSource::new();
        let err = source.fetch_dataset("missing.json").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn injected_status_failure() {
        let source = StaticSource::new();
        source.insert("db.json", "{}").await;
        source.fail("db.json", 503).await;

        let err = source.fetch_dataset("db.json").await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_format_error() {
        let source = StaticSource::new();
        source.insert("index.json", "not json").await;

        let err = source.fetch_manifest("index.json").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[tokio::test]
    async fn loads_nested_directory() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("linhas")).unwrap();
        std::fs::write(
            dir.path().join("index.json"),
            r#"{ "files": ["linhas/l1.json"] }"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("linhas").join("l1.json"),
            r#"{ "linhas": [{ "origem": "Centro" }] }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("README.txt"), "ignored").unwrap();

        let source = StaticSource::from_dir(dir.path()).unwrap();
        let manifest = source.fetch_manifest("index.json").await.unwrap();
        assert_eq!(manifest.files, ["linhas/l1.json"]);

        let dataset = source.fetch_dataset(&manifest.files[0]).await.unwrap();
        assert_eq!(dataset.lines[0].origin_label(), "Centro");
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(StaticSource::from_dir(dir.path()).is_err());
    }
}
