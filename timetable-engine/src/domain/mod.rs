//! Domain types for the timetable engine.
//!
//! Times, day types and the timetable documents themselves. Parsing is
//! strict where the value feeds a comparison (times, day-type codes) and
//! permissive where it only feeds display (line labels, stop lists).

mod day_type;
mod line;
mod time;

pub use day_type::{DEFAULT_REFERENCE_ZONE, DayType, Holidays, InvalidDayType};
pub use line::{Dataset, Departures, Line, Manifest, PLACEHOLDER};
pub use time::{MINUTES_PER_DAY, TimeError, TimeOfDay};
