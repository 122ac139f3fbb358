use std::process::ExitCode;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use timetable_engine::clock::SystemClock;
use timetable_engine::domain::Holidays;
use timetable_engine::engine::{EngineConfig, Startup, TimetableEngine};
use timetable_engine::relevance::RelevancePolicy;
use timetable_engine::snapshot::{FileSnapshotConfig, FileSnapshotStore};
use timetable_engine::source::{HttpSource, HttpSourceConfig};
use timetable_engine::sync::{BatchMode, DEFAULT_DATASET_PATH, SyncConfig};

fn env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(name: &str) -> bool {
    env(name).is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes"))
}

fn sync_config() -> SyncConfig {
    let config = match env("TIMETABLE_MANIFEST") {
        Some(manifest) => SyncConfig::multi(manifest),
        None => SyncConfig::single(
            env("TIMETABLE_DATASET").unwrap_or_else(|| DEFAULT_DATASET_PATH.to_string()),
        ),
    };

    if env_flag("TIMETABLE_STRICT_BATCH") {
        config.with_batch_mode(BatchMode::Strict)
    } else {
        config
    }
}

fn policy() -> RelevancePolicy {
    match env("TIMETABLE_POLICY").as_deref() {
        Some("window") => RelevancePolicy::window(),
        Some("nearest") | None => RelevancePolicy::nearest(),
        Some(other) => {
            warn!(policy = other, "unknown relevance policy, using nearest");
            RelevancePolicy::nearest()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(base_url) = env("TIMETABLE_BASE_URL") else {
        error!("TIMETABLE_BASE_URL not set");
        return ExitCode::FAILURE;
    };

    let source = match HttpSource::new(HttpSourceConfig::new(base_url)) {
        Ok(source) => source,
        Err(e) => {
            error!(error = %e, "failed to create timetable source");
            return ExitCode::FAILURE;
        }
    };

    let holidays = match env("TIMETABLE_HOLIDAYS") {
        Some(list) => match Holidays::parse(list.split(',').filter(|d| !d.trim().is_empty())) {
            Ok(holidays) => holidays,
            Err(e) => {
                error!(error = %e, "invalid TIMETABLE_HOLIDAYS, expected YYYY-MM-DD dates");
                return ExitCode::FAILURE;
            }
        },
        None => Holidays::none(),
    };

    let store = match env("TIMETABLE_SNAPSHOT") {
        Some(path) => FileSnapshotStore::new(FileSnapshotConfig::new(path)),
        None => FileSnapshotStore::new(FileSnapshotConfig::default()),
    };

    let config = EngineConfig::new(sync_config())
        .with_policy(policy())
        .with_holidays(holidays);

    if let Some(span) = config.policy.window_span() {
        info!(minutes = span.num_minutes(), "using window policy");
    }

    let engine = TimetableEngine::new(source, store, SystemClock, config);

    match engine.initialize().await {
        Startup::Restored { lines } => info!(
            lines,
            saved_at = ?engine.store().saved_at(),
            path = %engine.store().path().display(),
            "started from cached timetable"
        ),
        Startup::Synced(report) => info!(
            status = ?report.status,
            lines = report.dataset.len(),
            "started from sync"
        ),
    }

    engine.select_stop(env("TIMETABLE_STOP").as_deref()).await;
    log_rows(&engine).await;

    // Keep resynchronizing when a refresh interval is configured
    let Some(secs) = env("TIMETABLE_REFRESH_SECS").and_then(|s| s.parse::<u64>().ok()) else {
        return ExitCode::SUCCESS;
    };

    let mut interval = tokio::time::interval(Duration::from_secs(secs.max(1)));
    interval.tick().await; // First tick is immediate, skip it
    loop {
        interval.tick().await;
        let report = engine.resync().await;
        if !report.failed_files.is_empty() {
            warn!(files = ?report.failed_files, "some timetable files were skipped");
        }
        log_rows(&engine).await;
    }
}

async fn log_rows<S, P, C>(engine: &TimetableEngine<S, P, C>)
where
    S: timetable_engine::source::TimetableSource,
    P: timetable_engine::snapshot::SnapshotStore,
    C: timetable_engine::clock::Clock,
{
    let moment = engine.now_local();
    info!(
        day_type = %engine.today(),
        now = %moment.time,
        stop = ?engine.selected_stop().await,
        "relevant departures"
    );

    for row in engine.current_rows().await {
        if row.is_idle() {
            continue;
        }
        let from_origin: Vec<String> =
            row.from_origin.iter().map(|d| d.time.to_string()).collect();
        let from_destination: Vec<String> = row
            .from_destination
            .iter()
            .map(|d| d.time.to_string())
            .collect();
        info!(
            position = row.position,
            company = %row.company,
            origin = %row.origin,
            destination = %row.destination,
            from_origin = ?from_origin,
            from_destination = ?from_destination,
            "line"
        );
    }
}
