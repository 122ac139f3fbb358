//! Engine configuration.

use chrono_tz::Tz;

use crate::domain::{DEFAULT_REFERENCE_ZONE, Holidays};
use crate::relevance::RelevancePolicy;
use crate::sync::SyncConfig;

/// Configuration parameters for a [`TimetableEngine`](super::TimetableEngine).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How the dataset is fetched and merged.
    pub sync: SyncConfig,

    /// Which departures are shown for "now".
    pub policy: RelevancePolicy,

    /// Dates that run the Sunday timetable.
    pub holidays: Holidays,

    /// Zone whose civil date and time decide the day type and "now".
    pub zone: Tz,
}

impl EngineConfig {
    pub fn new(sync: SyncConfig) -> Self {
        Self {
            sync,
            policy: RelevancePolicy::default(),
            holidays: Holidays::none(),
            zone: DEFAULT_REFERENCE_ZONE,
        }
    }

    pub fn with_policy(mut self, policy: RelevancePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_holidays(mut self, holidays: Holidays) -> Self {
        self.holidays = holidays;
        self
    }

    pub fn with_zone(mut self, zone: Tz) -> Self {
        self.zone = zone;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}
