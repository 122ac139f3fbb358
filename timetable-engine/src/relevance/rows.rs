//! Render model handed to the presentation layer.

use serde::Serialize;

use crate::domain::{DayType, Line, TimeOfDay};

use super::policy::RelevancePolicy;
use super::select::{DisplayTime, select_relevant};

/// One line as the presentation layer should show it.
///
/// Labels are already resolved to the placeholder where missing; times are
/// already narrowed by the relevance policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    /// 1-based position in the displayed list.
    pub position: usize,
    pub company: String,
    pub origin: String,
    pub destination: String,
    pub from_origin: Vec<DisplayTime>,
    pub from_destination: Vec<DisplayTime>,
}

impl DisplayRow {
    fn build(
        position: usize,
        line: &Line,
        day_type: DayType,
        now: TimeOfDay,
        policy: RelevancePolicy,
    ) -> Self {
        Self {
            position,
            company: line.company_label().to_string(),
            origin: line.origin_label().to_string(),
            destination: line.destination_label().to_string(),
            from_origin: select_relevant(line.origin_times(day_type), now, policy),
            from_destination: select_relevant(line.destination_times(day_type), now, policy),
        }
    }

    /// Whether neither direction has anything to show.
    pub fn is_idle(&self) -> bool {
        self.from_origin.is_empty() && self.from_destination.is_empty()
    }
}

/// Display rows for `lines` on `day_type` at `now`.
pub fn display_rows<'a, I>(
    lines: I,
    day_type: DayType,
    now: TimeOfDay,
    policy: RelevancePolicy,
) -> Vec<DisplayRow>
where
    I: IntoIterator<Item = &'a Line>,
{
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| DisplayRow::build(i + 1, line, day_type, now, policy))
        .collect()
}
