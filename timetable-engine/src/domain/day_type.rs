//! Day-type classification.
//!
//! Each departure list belongs to one of three schedule calendars. Which one
//! applies is decided by the civil date in a fixed reference zone, so the
//! answer does not depend on where the code runs.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Zone used to interpret instants when none is configured.
pub const DEFAULT_REFERENCE_ZONE: Tz = chrono_tz::America::Sao_Paulo;

/// Schedule calendar a departure list belongs to.
///
/// Serialized with the timetable codes: `SS` (Monday to Friday), `SA`
/// (Saturday) and `DF` (Sunday and holidays).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayType {
    #[serde(rename = "SS")]
    Weekday,
    #[serde(rename = "SA")]
    Saturday,
    #[serde(rename = "DF")]
    SundayOrHoliday,
}

impl DayType {
    /// All day types, in timetable order.
    pub const ALL: [DayType; 3] = [DayType::Weekday, DayType::Saturday, DayType::SundayOrHoliday];

    /// Classify a civil date.
    ///
    /// Sundays and holidays share a calendar, so neither check needs to win.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use timetable_engine::domain::{DayType, Holidays};
    ///
    /// let holidays = Holidays::parse(["2026-11-02"]).unwrap();
    ///
    /// // Monday, but a holiday
    /// let finados = NaiveDate::from_ymd_opt(2026, 11, 2).unwrap();
    /// assert_eq!(DayType::for_date(finados, &holidays), DayType::SundayOrHoliday);
    ///
    /// let saturday = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    /// assert_eq!(DayType::for_date(saturday, &holidays), DayType::Saturday);
    /// ```
    pub fn for_date(date: NaiveDate, holidays: &Holidays) -> Self {
        match date.weekday() {
            Weekday::Sun => DayType::SundayOrHoliday,
            _ if holidays.contains(date) => DayType::SundayOrHoliday,
            Weekday::Sat => DayType::Saturday,
            _ => DayType::Weekday,
        }
    }

    /// Classify an instant, read as a civil date in `zone`.
    pub fn classify<Z: TimeZone>(instant: &DateTime<Z>, zone: Tz, holidays: &Holidays) -> Self {
        let local = instant.with_timezone(&zone);
        Self::for_date(local.date_naive(), holidays)
    }

    /// The timetable code for this day type.
    pub fn code(&self) -> &'static str {
        match self {
            DayType::Weekday => "SS",
            DayType::Saturday => "SA",
            DayType::SundayOrHoliday => "DF",
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unknown day-type code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown day type code: {0:?}")]
pub struct InvalidDayType(String);

impl FromStr for DayType {
    type Err = InvalidDayType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "SS" => Ok(DayType::Weekday),
            "SA" => Ok(DayType::Saturday),
            "DF" => Ok(DayType::SundayOrHoliday),
            other => Err(InvalidDayType(other.to_string())),
        }
    }
}

/// Set of holiday dates that run the Sunday timetable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Holidays(HashSet<NaiveDate>);

impl Holidays {
    /// An empty holiday set.
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse ISO `YYYY-MM-DD` dates.
    pub fn parse<I, S>(dates: I) -> Result<Self, chrono::ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        dates
            .into_iter()
            .map(|s| NaiveDate::parse_from_str(s.as_ref().trim(), "%Y-%m-%d"))
            .collect::<Result<HashSet<_>, _>>()
            .map(Self)
    }

    /// Whether `date` is a configured holiday.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<NaiveDate> for Holidays {
    fn from_iter<T: IntoIterator<Item = NaiveDate>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn valid_date()(
            year in 2000i32..2100,
            month in 1u32..=12,
            day in 1u32..=28
        ) -> NaiveDate {
            NaiveDate::from_ymd_opt(year, month, day).unwrap()
        }
    }

    proptest! {
        /// Sundays are always Sunday-or-holiday, with or without holidays
        #[test]
        fn sundays_always_df(d in valid_date()) {
            let holidays: Holidays = [d].into_iter().collect();
            if d.weekday() == Weekday::Sun {
                prop_assert_eq!(DayType::for_date(d, &Holidays::none()), DayType::SundayOrHoliday);
            }
            // A listed holiday is always Sunday-or-holiday
            prop_assert_eq!(DayType::for_date(d, &holidays), DayType::SundayOrHoliday);
        }

        /// Without holidays, the bucket is determined by weekday alone
        #[test]
        fn weekday_determines_bucket(d in valid_date()) {
            let expected = match d.weekday() {
                Weekday::Sun => DayType::SundayOrHoliday,
                Weekday::Sat => DayType::Saturday,
                _ => DayType::Weekday,
            };
            prop_assert_eq!(DayType::for_date(d, &Holidays::none()), expected);
        }
    }
}
