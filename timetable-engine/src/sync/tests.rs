//! Unit tests for synchronization and fallback.

use std::time::Duration;

use super::*;
use crate::snapshot::{MemorySnapshotStore, SnapshotError};
use crate::source::{ErrorKind, StaticSource};

fn lines_json(origins: &[&str]) -> String {
    let lines: Vec<String> = origins
        .iter()
        .map(|o| format!(r#"{{ "origin": "{o}", "destination": "Terminal" }}"#))
        .collect();
    format!(r#"{{ "lines": [{}] }}"#, lines.join(","))
}

fn origins(dataset: &Dataset) -> Vec<&str> {
    dataset.lines.iter().map(|l| l.origin_label()).collect()
}

fn cached() -> Dataset {
    serde_json::from_str(&lines_json(&["Cached"])).unwrap()
}

/// Store whose writes always fail.
struct ReadOnlyStore(Option<Dataset>);

impl SnapshotStore for ReadOnlyStore {
    fn load(&self) -> Option<Dataset> {
        self.0.clone()
    }

    fn save(&self, _dataset: &Dataset) -> Result<(), SnapshotError> {
        Err(SnapshotError::Io {
            message: "read-only".to_string(),
        })
    }

    fn clear(&self) -> Result<(), SnapshotError> {
        Err(SnapshotError::Io {
            message: "read-only".to_string(),
        })
    }
}

async fn multi_source(files: &[(&str, &[&str])]) -> StaticSource {
    let source = StaticSource::new();
    let names: Vec<String> = files.iter().map(|(name, _)| format!("\"{name}\"")).collect();
    source
        .insert("index.json", format!(r#"{{ "files": [{}] }}"#, names.join(",")))
        .await;
    for (name, origins) in files {
        source.insert(*name, lines_json(origins)).await;
    }
    source
}

#[tokio::test]
async fn single_source_success_persists() {
    let source = StaticSource::new();
    source.insert("db.json", lines_json(&["A", "B"])).await;
    let coordinator =
        SyncCoordinator::new(source, MemorySnapshotStore::new(), SyncConfig::default());

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Success);
    assert!(report.is_fresh());
    assert!(report.error.is_none());
    assert_eq!(origins(&report.dataset), ["A", "B"]);
    assert_eq!(coordinator.store().load(), Some(report.dataset));
}

#[tokio::test]
async fn single_source_failure_serves_snapshot() {
    let source = StaticSource::new();
    source.fail("db.json", 500).await;
    let store = MemorySnapshotStore::with_dataset(cached());
    let coordinator = SyncCoordinator::new(source, store, SyncConfig::default());

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Degraded);
    assert_eq!(report.dataset, cached());
    assert_eq!(
        report.error.as_ref().and_then(SyncError::source_kind),
        Some(ErrorKind::Transport)
    );
}

#[tokio::test]
async fn single_source_failure_without_snapshot_is_empty() {
    let coordinator = SyncCoordinator::new(
        StaticSource::new(),
        MemorySnapshotStore::new(),
        SyncConfig::default(),
    );

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Failed);
    assert!(report.dataset.is_empty());
    assert!(report.error.is_some());
}

#[tokio::test]
async fn malformed_document_falls_back() {
    let source = StaticSource::new();
    source.insert("db.json", r#"{ "lines": "nope" }"#).await;
    let store = MemorySnapshotStore::with_dataset(cached());
    let coordinator = SyncCoordinator::new(source, store, SyncConfig::default());

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Degraded);
    assert_eq!(
        report.error.as_ref().and_then(SyncError::source_kind),
        Some(ErrorKind::Format)
    );
}

#[tokio::test]
async fn sloppy_entries_do_not_reject_the_document() {
    let source = StaticSource::new();
    source
        .insert(
            "db.json",
            r#"{
                "lines": [
                    {
                        "origin": "A",
                        "stops": null,
                        "departuresFromOrigin": { "SS": ["08:00", null], "obs": "sem servico" }
                    },
                    { "origin": "B", "departuresFromDestination": ["07:00", 700] }
                ]
            }"#,
        )
        .await;
    let store = MemorySnapshotStore::with_dataset(cached());
    let coordinator = SyncCoordinator::new(source, store, SyncConfig::default());

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Success);
    assert_eq!(origins(&report.dataset), ["A", "B"]);
    assert_eq!(coordinator.store().load(), Some(report.dataset));
}

#[tokio::test]
async fn null_lines_is_fresh_and_empty() {
    let source = StaticSource::new();
    source.insert("db.json", r#"{ "linhas": null }"#).await;
    let coordinator =
        SyncCoordinator::new(source, MemorySnapshotStore::new(), SyncConfig::default());

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Success);
    assert!(report.dataset.is_empty());
}

#[tokio::test]
async fn document_without_lines_is_fresh_and_empty() {
    let source = StaticSource::new();
    source.insert("db.json", "{}").await;
    let store = MemorySnapshotStore::with_dataset(cached());
    let coordinator = SyncCoordinator::new(source, store, SyncConfig::default());

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Success);
    assert!(report.dataset.is_empty());
    assert_eq!(coordinator.store().load(), Some(Dataset::empty()));
}

#[tokio::test]
async fn merge_follows_manifest_order_not_completion_order() {
    let source = multi_source(&[
        ("a.json", &["A1", "A2"]),
        ("b.json", &["B1"]),
        ("c.json", &["C1"]),
    ])
    .await;
    // a.json finishes last, b.json first
    source.delay("a.json", Duration::from_millis(60)).await;
    source.delay("c.json", Duration::from_millis(20)).await;

    let coordinator =
        SyncCoordinator::new(source, MemorySnapshotStore::new(), SyncConfig::multi("index.json"));
    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Success);
    assert_eq!(origins(&report.dataset), ["A1", "A2", "B1", "C1"]);
    assert!(report.failed_files.is_empty());
}

async fn slow_files(count: usize) -> StaticSource {
    let names: Vec<String> = (0..count).map(|i| format!("f{i}.json")).collect();
    let labels: Vec<[&str; 1]> = names.iter().map(|n| [n.as_str()]).collect();
    let files: Vec<(&str, &[&str])> = names
        .iter()
        .zip(&labels)
        .map(|(n, o)| (n.as_str(), o.as_slice()))
        .collect();

    let source = multi_source(&files).await;
    for name in &names {
        source.delay(name, Duration::from_millis(20)).await;
    }
    source
}

#[tokio::test]
async fn every_file_is_in_flight_at_once_by_default() {
    let source = slow_files(12).await;
    let coordinator =
        SyncCoordinator::new(source, MemorySnapshotStore::new(), SyncConfig::multi("index.json"));

    let report = coordinator.sync().await;

    assert_eq!(report.dataset.len(), 12);
    assert_eq!(coordinator.source().peak_in_flight(), 12);
}

#[tokio::test]
async fn concurrency_cap_still_fetches_everything() {
    let source = slow_files(5).await;
    let config = SyncConfig::multi("index.json").with_max_concurrent(2);
    let coordinator = SyncCoordinator::new(source, MemorySnapshotStore::new(), config);

    let report = coordinator.sync().await;

    assert_eq!(
        origins(&report.dataset),
        ["f0.json", "f1.json", "f2.json", "f3.json", "f4.json"]
    );
    assert_eq!(coordinator.source().fetch_count(), 6);
    assert_eq!(coordinator.source().peak_in_flight(), 2);
}

#[tokio::test]
async fn manifest_failure_falls_back_without_fetching_files() {
    let source = multi_source(&[("a.json", &["A"])]).await;
    source.fail("index.json", 404).await;
    let store = MemorySnapshotStore::with_dataset(cached());
    let coordinator = SyncCoordinator::new(source, store, SyncConfig::multi("index.json"));

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Degraded);
    assert_eq!(report.dataset, cached());
    assert_eq!(coordinator.source().fetch_count(), 1);
}

#[tokio::test]
async fn empty_manifest_is_a_sync_failure() {
    let source = StaticSource::new();
    source.insert("index.json", r#"{ "files": [] }"#).await;
    let coordinator =
        SyncCoordinator::new(source, MemorySnapshotStore::new(), SyncConfig::multi("index.json"));

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Failed);
    assert!(matches!(report.error, Some(SyncError::EmptyManifest(_))));
}

#[tokio::test]
async fn missing_files_field_is_a_sync_failure() {
    let source = StaticSource::new();
    source.insert("index.json", "{}").await;
    let store = MemorySnapshotStore::with_dataset(cached());
    let coordinator = SyncCoordinator::new(source, store, SyncConfig::multi("index.json"));

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Degraded);
    assert!(matches!(report.error, Some(SyncError::EmptyManifest(_))));
}

#[tokio::test]
async fn lenient_batch_skips_failing_file() {
    let source = multi_source(&[("a.json", &["A"]), ("b.json", &["B"]), ("c.json", &["C"])]).await;
    source.fail("b.json", 500).await;
    let store = MemorySnapshotStore::with_dataset(cached());
    let coordinator = SyncCoordinator::new(source, store, SyncConfig::multi("index.json"));

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Success);
    assert_eq!(origins(&report.dataset), ["A", "C"]);
    assert_eq!(report.failed_files, ["b.json"]);
    assert_eq!(coordinator.store().load(), Some(report.dataset));
}

#[tokio::test]
async fn lenient_batch_with_every_file_failing_falls_back() {
    let source = multi_source(&[("a.json", &["A"]), ("b.json", &["B"])]).await;
    source.fail("a.json", 500).await;
    source.remove("b.json").await;
    let store = MemorySnapshotStore::with_dataset(cached());
    let coordinator = SyncCoordinator::new(source, store, SyncConfig::multi("index.json"));

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Degraded);
    assert_eq!(report.dataset, cached());
    assert!(matches!(report.error, Some(SyncError::File { ref path, .. }) if path == "a.json"));
}

#[tokio::test]
async fn strict_batch_aborts_on_any_failure() {
    let source = multi_source(&[("a.json", &["A"]), ("b.json", &["B"])]).await;
    source.insert("b.json", "not json").await;
    let store = MemorySnapshotStore::with_dataset(cached());
    let config = SyncConfig::multi("index.json").with_batch_mode(BatchMode::Strict);
    let coordinator = SyncCoordinator::new(source, store, config);

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Degraded);
    assert_eq!(report.dataset, cached());
    assert_eq!(coordinator.store().load(), Some(cached()));
    assert_eq!(
        report.error.as_ref().and_then(SyncError::source_kind),
        Some(ErrorKind::Format)
    );
}

#[tokio::test]
async fn strict_batch_without_failures_succeeds() {
    let source = multi_source(&[("a.json", &["A"]), ("b.json", &["B"])]).await;
    let config = SyncConfig::multi("index.json").with_batch_mode(BatchMode::Strict);
    let coordinator = SyncCoordinator::new(source, MemorySnapshotStore::new(), config);

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Success);
    assert_eq!(origins(&report.dataset), ["A", "B"]);
}

#[tokio::test]
async fn snapshot_write_failure_keeps_fresh_data() {
    let source = StaticSource::new();
    source.insert("db.json", lines_json(&["Fresh"])).await;
    let coordinator =
        SyncCoordinator::new(source, ReadOnlyStore(Some(cached())), SyncConfig::default());

    let report = coordinator.sync().await;

    assert_eq!(report.status, SyncStatus::Success);
    assert_eq!(origins(&report.dataset), ["Fresh"]);
}

#[tokio::test]
async fn repeated_syncs_replace_wholesale() {
    let source = StaticSource::new();
    source.insert("db.json", lines_json(&["A", "B"])).await;
    let coordinator =
        SyncCoordinator::new(source, MemorySnapshotStore::new(), SyncConfig::default());

    coordinator.sync().await;
    coordinator.source().insert("db.json", lines_json(&["C"])).await;
    let report = coordinator.sync().await;

    assert_eq!(origins(&report.dataset), ["C"]);
    assert_eq!(coordinator.store().load().map(|d| d.len()), Some(1));
}

#[test]
fn snapshot_miss_is_reported() {
    let coordinator = SyncCoordinator::new(
        StaticSource::new(),
        MemorySnapshotStore::new(),
        SyncConfig::default(),
    );
    assert!(matches!(coordinator.snapshot(), Err(SyncError::CacheMiss)));
}
