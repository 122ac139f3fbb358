//! Selecting the departures relevant to the current time.

use serde::Serialize;

use crate::domain::{MINUTES_PER_DAY, TimeOfDay};

use super::policy::RelevancePolicy;

/// One departure to display, tagged with whether it already left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayTime {
    pub time: TimeOfDay,
    /// `time < now`, strictly. A departure at exactly now has not passed.
    pub has_passed: bool,
}

impl DisplayTime {
    fn tag(time: TimeOfDay, now: TimeOfDay) -> Self {
        Self {
            time,
            has_passed: time < now,
        }
    }
}

/// Parse the valid `HH:MM` entries of `times`, in source order.
///
/// Anything else is dropped without error.
pub fn valid_times<S: AsRef<str>>(times: &[S]) -> Vec<TimeOfDay> {
    times
        .iter()
        .filter_map(|t| TimeOfDay::parse_hhmm(t.as_ref()).ok())
        .collect()
}

/// Departures from `times` worth showing at `now` under `policy`.
///
/// # Examples
///
/// ```
/// use timetable_engine::domain::TimeOfDay;
/// use timetable_engine::relevance::{RelevancePolicy, select_relevant};
///
/// let times = ["08:00", "09:00", "10:00", "11:00", "bogus"];
/// let now = TimeOfDay::parse_hhmm("09:30").unwrap();
///
/// let rows = select_relevant(&times, now, RelevancePolicy::nearest());
/// let shown: Vec<String> = rows.iter().map(|r| r.time.to_string()).collect();
/// assert_eq!(shown, ["08:00", "09:00", "10:00", "11:00"]);
/// assert!(rows[1].has_passed);
/// assert!(!rows[2].has_passed);
/// ```
pub fn select_relevant<S: AsRef<str>>(
    times: &[S],
    now: TimeOfDay,
    policy: RelevancePolicy,
) -> Vec<DisplayTime> {
    let times = valid_times(times);

    let selected = match policy {
        RelevancePolicy::Window {
            before_mins,
            after_mins,
        } => select_window(times, now, before_mins, after_mins),
        RelevancePolicy::Nearest { passed, upcoming } => {
            select_nearest(times, now, passed, upcoming)
        }
    };

    selected
        .into_iter()
        .map(|t| DisplayTime::tag(t, now))
        .collect()
}

/// Times within `[now - before, now + after]`, wrapping across midnight.
/// Source order is kept.
fn select_window(
    times: Vec<TimeOfDay>,
    now: TimeOfDay,
    before_mins: u16,
    after_mins: u16,
) -> Vec<TimeOfDay> {
    let day = i32::from(MINUTES_PER_DAY);
    let now = i32::from(now.minutes());
    let start = now - i32::from(before_mins);
    let end = now + i32::from(after_mins);

    times
        .into_iter()
        .filter(|t| {
            let m = i32::from(t.minutes());
            (start..=end).contains(&m)
                || (start < 0 && m >= day + start)
                || (end >= day && m <= end - day)
        })
        .collect()
}

/// Last `passed` times before now, then the first `upcoming` times at or
/// after now, each run chronological.
fn select_nearest(
    mut times: Vec<TimeOfDay>,
    now: TimeOfDay,
    passed: usize,
    upcoming: usize,
) -> Vec<TimeOfDay> {
    times.sort();
    let split = times.partition_point(|t| *t < now);
    let (before, after) = times.split_at(split);

    before[before.len().saturating_sub(passed)..]
        .iter()
        .chain(after.iter().take(upcoming))
        .copied()
        .collect()
}
