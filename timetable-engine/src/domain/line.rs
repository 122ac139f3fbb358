//! Timetable documents: lines, datasets and manifests.
//!
//! These types mirror the JSON documents served to the engine. A missing or
//! `null` field becomes an empty value rather than a parse failure, and list
//! entries of the wrong JSON type are dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::day_type::DayType;

/// Shown wherever a line is missing a label.
pub const PLACEHOLDER: &str = "—";

/// Departure times for one direction of a line.
///
/// Either a single list that runs every day, or one list per day-type code.
/// Entries are kept as written; invalid times are only dropped when the list
/// is read for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Departures {
    /// The same times for every day type.
    Daily(Vec<String>),
    /// Times keyed by day-type code (`SS`, `SA`, `DF`). Unknown keys are kept
    /// but never selected.
    ByDayType(BTreeMap<String, Vec<String>>),
}

impl<'de> Deserialize<'de> for Departures {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Departures::from_value(Value::deserialize(deserializer)?))
    }
}

impl Departures {
    /// Read departures from any JSON value.
    ///
    /// A list becomes `Daily` and an object `ByDayType`; in both, entries
    /// that are not strings are dropped, as are object values that are not
    /// lists. Any other value is an empty daily list.
    fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Departures::Daily(strings(items)),
            Value::Object(map) => Departures::ByDayType(
                map.into_iter()
                    .filter_map(|(code, times)| match times {
                        Value::Array(items) => Some((code, strings(items))),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => Departures::default(),
        }
    }

    /// The raw time strings that apply on `day_type`.
    ///
    /// A missing day-type entry yields an empty slice.
    pub fn for_day_type(&self, day_type: DayType) -> &[String] {
        match self {
            Departures::Daily(times) => times,
            Departures::ByDayType(map) => map
                .get(day_type.code())
                .map(Vec::as_slice)
                .unwrap_or_default(),
        }
    }
}

impl Default for Departures {
    fn default() -> Self {
        Departures::Daily(Vec::new())
    }
}

/// One directional bus route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    #[serde(default, alias = "empresa")]
    pub company: Option<String>,

    #[serde(default, alias = "origem")]
    pub origin: Option<String>,

    #[serde(default, alias = "destino")]
    pub destination: Option<String>,

    /// Intermediate and terminal stop names, in route order.
    #[serde(default, deserialize_with = "string_list")]
    pub stops: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departures_from_origin: Option<Departures>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departures_from_destination: Option<Departures>,
}

impl Line {
    /// Company label, or the placeholder.
    pub fn company_label(&self) -> &str {
        label(self.company.as_deref())
    }

    /// Origin label, or the placeholder.
    pub fn origin_label(&self) -> &str {
        label(self.origin.as_deref())
    }

    /// Destination label, or the placeholder.
    pub fn destination_label(&self) -> &str {
        label(self.destination.as_deref())
    }

    /// Whether one of this line's stops equals `stop` after trimming both.
    pub fn serves(&self, stop: &str) -> bool {
        let stop = stop.trim();
        self.stops.iter().any(|s| s.trim() == stop)
    }

    /// Departure strings from the origin on `day_type`.
    pub fn origin_times(&self, day_type: DayType) -> &[String] {
        self.departures_from_origin
            .as_ref()
            .map(|d| d.for_day_type(day_type))
            .unwrap_or_default()
    }

    /// Departure strings from the destination on `day_type`.
    pub fn destination_times(&self, day_type: DayType) -> &[String] {
        self.departures_from_destination
            .as_ref()
            .map(|d| d.for_day_type(day_type))
            .unwrap_or_default()
    }
}

fn label(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => PLACEHOLDER,
    }
}

/// The string entries of a JSON list.
fn strings(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect()
}

/// A list of strings where `null`, a non-list or a non-string entry reads
/// as nothing.
fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(strings(items)),
        _ => Ok(Vec::new()),
    }
}

/// A list where `null` reads as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A full timetable: every known line, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, alias = "linhas", deserialize_with = "null_as_empty")]
    pub lines: Vec<Line>,
}

impl Dataset {
    /// A dataset with no lines.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Concatenate datasets in the given order.
    pub fn concat<I: IntoIterator<Item = Dataset>>(parts: I) -> Self {
        Self {
            lines: parts.into_iter().flat_map(|d| d.lines).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// List of per-line documents to merge into one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, deserialize_with = "string_list")]
    pub files: Vec<String>,
}

impl Manifest {
    /// File paths with blank entries removed, in manifest order.
    pub fn paths(&self) -> Vec<&str> {
        self.files
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect()
    }
}
