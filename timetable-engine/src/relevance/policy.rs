//! Relevance policy configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Default minutes kept before "now" under the window policy.
pub const DEFAULT_BEFORE_MINS: u16 = 90;

/// Default minutes kept after "now" under the window policy.
pub const DEFAULT_AFTER_MINS: u16 = 90;

/// Default number of departures kept on each side of "now" under the
/// nearest policy.
pub const DEFAULT_NEAREST_COUNT: usize = 2;

/// Rule used to narrow a departure list to the times worth showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RelevancePolicy {
    /// Every departure within a window around now, wrapping at midnight.
    Window {
        /// Minutes before now (inclusive).
        before_mins: u16,
        /// Minutes after now (inclusive).
        after_mins: u16,
    },

    /// The last `passed` departures before now and the first `upcoming`
    /// departures from now on.
    Nearest { passed: usize, upcoming: usize },
}

impl RelevancePolicy {
    /// Window policy with the default 90/90 minute bounds.
    pub fn window() -> Self {
        Self::window_of(DEFAULT_BEFORE_MINS, DEFAULT_AFTER_MINS)
    }

    pub fn window_of(before_mins: u16, after_mins: u16) -> Self {
        RelevancePolicy::Window {
            before_mins,
            after_mins,
        }
    }

    /// Nearest policy with the default 2 passed / 2 upcoming.
    pub fn nearest() -> Self {
        Self::nearest_of(DEFAULT_NEAREST_COUNT, DEFAULT_NEAREST_COUNT)
    }

    pub fn nearest_of(passed: usize, upcoming: usize) -> Self {
        RelevancePolicy::Nearest { passed, upcoming }
    }

    /// Total span covered by a window policy, or `None` for the nearest
    /// policy.
    pub fn window_span(&self) -> Option<Duration> {
        match self {
            RelevancePolicy::Window {
                before_mins,
                after_mins,
            } => Some(Duration::minutes(
                i64::from(*before_mins) + i64::from(*after_mins),
            )),
            RelevancePolicy::Nearest { .. } => None,
        }
    }
}

impl Default for RelevancePolicy {
    fn default() -> Self {
        Self::nearest()
    }
}
