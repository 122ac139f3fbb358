//! The timetable engine.
//!
//! Owns the current dataset, its stop index and the active stop filter, and
//! drives synchronization. Readers get a shared [`Timetable`] that is never
//! mutated; a sync swaps in a new one.
//!
//! ```no_run
//! use timetable_engine::clock::SystemClock;
//! use timetable_engine::engine::{EngineConfig, TimetableEngine};
//! use timetable_engine::snapshot::MemorySnapshotStore;
//! use timetable_engine::source::{HttpSource, HttpSourceConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpSource::new(HttpSourceConfig::new("https://example.org/horarios/"))?;
//! let engine = TimetableEngine::new(
//!     source,
//!     MemorySnapshotStore::new(),
//!     SystemClock,
//!     EngineConfig::default(),
//! );
//!
//! engine.initialize().await;
//! engine.select_stop(Some("Rodoviária")).await;
//! for row in engine.current_rows().await {
//!     println!("{} {} -> {}", row.position, row.origin, row.destination);
//! }
//! # Ok(())
//! # }
//! ```

mod config;


use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub use config::EngineConfig;

use crate::clock::{Clock, LocalMoment};
use crate::domain::{Dataset, DayType, Line, TimeOfDay};
use crate::filter::{filter_by_stop, normalize_stop};
use crate::relevance::{DisplayRow, display_rows};
use crate::snapshot::{SnapshotError, SnapshotStore};
use crate::stops::{StopIndex, unique_destinations, unique_origins};
use crate::source::TimetableSource;
use crate::sync::{SyncCoordinator, SyncReport, SyncStatus};

/// Where the engine is in its sync lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    /// No sync has run yet.
    #[default]
    Idle,
    Syncing,
    Success,
    Degraded,
    Failed,
}

impl From<SyncStatus> for SyncState {
    fn from(status: SyncStatus) -> Self {
        match status {
            SyncStatus::Success => SyncState::Success,
            SyncStatus::Degraded => SyncState::Degraded,
            SyncStatus::Failed => SyncState::Failed,
        }
    }
}

/// How [`TimetableEngine::initialize`] obtained its data.
#[derive(Debug)]
pub enum Startup {
    /// A stored snapshot was loaded; no fetch was made.
    Restored { lines: usize },
    /// There was no snapshot, so a sync ran.
    Synced(SyncReport),
}

/// A dataset together with the stop index derived from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timetable {
    dataset: Dataset,
    stops: StopIndex,
}

impl Timetable {
    pub fn new(dataset: Dataset) -> Self {
        let stops = StopIndex::build(&dataset.lines);
        Self { dataset, stops }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn lines(&self) -> &[Line] {
        &self.dataset.lines
    }

    pub fn stop_index(&self) -> &StopIndex {
        &self.stops
    }

    /// Lines serving `stop`; every line when `stop` is absent or blank.
    pub fn filtered_lines(&self, stop: Option<&str>) -> Vec<&Line> {
        filter_by_stop(&self.dataset.lines, stop)
    }

    pub fn unique_origins(&self) -> Vec<String> {
        unique_origins(&self.dataset.lines)
    }

    pub fn unique_destinations(&self) -> Vec<String> {
        unique_destinations(&self.dataset.lines)
    }
}

/// Timetable engine over a source, a snapshot store and a clock.
pub struct TimetableEngine<S, P, C> {
    coordinator: SyncCoordinator<S, P>,
    clock: C,
    config: EngineConfig,
    current: RwLock<Arc<Timetable>>,
    selected: RwLock<Option<String>>,
    state: RwLock<SyncState>,
}

impl<S, P, C> TimetableEngine<S, P, C>
where
    S: TimetableSource,
    P: SnapshotStore,
    C: Clock,
{
    /// Create an engine with no data. Call [`initialize`](Self::initialize)
    /// before reading.
    pub fn new(source: S, store: P, clock: C, config: EngineConfig) -> Self {
        Self {
            coordinator: SyncCoordinator::new(source, store, config.sync.clone()),
            clock,
            config,
            current: RwLock::new(Arc::new(Timetable::default())),
            selected: RwLock::new(None),
            state: RwLock::new(SyncState::Idle),
        }
    }

    /// Load the stored snapshot, or sync when there is none.
    pub async fn initialize(&self) -> Startup {
        match self.coordinator.snapshot() {
            Ok(dataset) => {
                let lines = dataset.len();
                info!(lines, "restored cached timetable");
                self.replace(dataset).await;
                Startup::Restored { lines }
            }
            Err(miss) => {
                debug!(reason = %miss, "no cached timetable, synchronizing");
                Startup::Synced(self.resync().await)
            }
        }
    }

    /// Synchronize now.
    ///
    /// The report's dataset becomes current whatever the outcome. Fresh data
    /// also clears the selected stop.
    pub async fn resync(&self) -> SyncReport {
        *self.state.write().await = SyncState::Syncing;

        let report = self.coordinator.sync().await;

        if report.is_fresh() {
            *self.selected.write().await = None;
        }
        self.replace(report.dataset.clone()).await;
        *self.state.write().await = report.status.into();

        report
    }

    /// Drop the stored snapshot and forget the current data.
    ///
    /// The in-memory state is reset even when the store fails to clear.
    pub async fn clear(&self) -> Result<(), SnapshotError> {
        let cleared = self.coordinator.store().clear();
        if let Err(e) = &cleared {
            warn!(error = %e, "failed to clear timetable snapshot");
        }

        self.replace(Dataset::empty()).await;
        *self.selected.write().await = None;
        *self.state.write().await = SyncState::Idle;
        info!("timetable cleared");

        cleared
    }

    /// The current timetable.
    pub async fn timetable(&self) -> Arc<Timetable> {
        Arc::clone(&*self.current.read().await)
    }

    /// Distinct stop names across the current dataset.
    pub async fn stop_index(&self) -> StopIndex {
        self.timetable().await.stop_index().clone()
    }

    /// Current lines serving `stop`.
    pub async fn filtered_lines(&self, stop: Option<&str>) -> Vec<Line> {
        let timetable = self.timetable().await;
        timetable.filtered_lines(stop).into_iter().cloned().collect()
    }

    /// Set or clear the active stop filter.
    pub async fn select_stop(&self, stop: Option<&str>) {
        let stop = normalize_stop(stop).map(str::to_string);
        debug!(stop = ?stop, "stop selected");
        *self.selected.write().await = stop;
    }

    pub async fn selected_stop(&self) -> Option<String> {
        self.selected.read().await.clone()
    }

    /// Current lines passing the active stop filter.
    pub async fn active_lines(&self) -> Vec<Line> {
        let stop = self.selected_stop().await;
        self.filtered_lines(stop.as_deref()).await
    }

    pub async fn state(&self) -> SyncState {
        *self.state.read().await
    }

    /// The clock's current instant in the reference zone.
    pub fn now_local(&self) -> LocalMoment {
        LocalMoment::of(self.clock.now(), self.config.zone)
    }

    /// The day type in effect right now.
    pub fn today(&self) -> DayType {
        DayType::classify(&self.clock.now(), self.config.zone, &self.config.holidays)
    }

    /// Display rows for the active lines on `day_type` at `now`, with the
    /// configured policy.
    pub async fn rows_at(&self, day_type: DayType, now: TimeOfDay) -> Vec<DisplayRow> {
        let stop = self.selected_stop().await;
        let timetable = self.timetable().await;
        display_rows(
            timetable.filtered_lines(stop.as_deref()),
            day_type,
            now,
            self.config.policy,
        )
    }

    /// Display rows for the active lines, today, now.
    pub async fn current_rows(&self) -> Vec<DisplayRow> {
        let moment = self.now_local();
        let day_type = DayType::for_date(moment.date, &self.config.holidays);
        self.rows_at(day_type, moment.time).await
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The snapshot store.
    pub fn store(&self) -> &P {
        self.coordinator.store()
    }

    async fn replace(&self, dataset: Dataset) {
        let timetable = Arc::new(Timetable::new(dataset));
        debug!(
            lines = timetable.lines().len(),
            stops = timetable.stop_index().len(),
            "timetable replaced"
        );
        *self.current.write().await = timetable;
    }
}
