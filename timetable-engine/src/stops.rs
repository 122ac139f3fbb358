//! Stop index across all lines.
//!
//! Builds the list of stop names a user can pick from: every origin,
//! destination and intermediate stop, each listed once, in the order it is
//! first seen while scanning the lines.

use std::collections::HashSet;

use crate::domain::Line;

/// Distinct stop names in first-seen order.
///
/// Names are trimmed; equality is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopIndex {
    names: Vec<String>,
}

impl StopIndex {
    /// Index the stops of `lines`.
    ///
    /// For each line, considers the origin, then the destination, then each
    /// stop in route order.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_engine::domain::Line;
    /// use timetable_engine::stops::StopIndex;
    ///
    /// let lines = vec![
    ///     Line {
    ///         origin: Some("Centro".into()),
    ///         destination: Some("Vila Nova".into()),
    ///         stops: vec!["Praça".into(), "Vila Nova".into()],
    ///         ..Line::default()
    ///     },
    ///     Line {
    ///         origin: Some(" Vila Nova ".into()),
    ///         destination: Some("Centro".into()),
    ///         ..Line::default()
    ///     },
    /// ];
    ///
    /// let index = StopIndex::build(&lines);
    /// assert_eq!(index.names(), ["Centro", "Vila Nova", "Praça"]);
    /// ```
    pub fn build(lines: &[Line]) -> Self {
        Self {
            names: distinct(lines.iter().flat_map(|line| {
                line.origin
                    .as_deref()
                    .into_iter()
                    .chain(line.destination.as_deref())
                    .chain(line.stops.iter().map(String::as_str))
            })),
        }
    }

    /// Stop names in index order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        let name = name.trim();
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Distinct line origins, first-seen order.
pub fn unique_origins(lines: &[Line]) -> Vec<String> {
    distinct(lines.iter().filter_map(|l| l.origin.as_deref()))
}

/// Distinct line destinations, first-seen order.
pub fn unique_destinations(lines: &[Line]) -> Vec<String> {
    distinct(lines.iter().filter_map(|l| l.destination.as_deref()))
}

/// Trim, drop blanks and keep the first occurrence of each name.
fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for name in names.map(str::trim).filter(|n| !n.is_empty()) {
        if seen.insert(name) {
            out.push(name.to_string());
        }
    }

    out
}
