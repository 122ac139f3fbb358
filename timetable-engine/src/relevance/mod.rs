//! Departure relevance.
//!
//! Narrows a line's full departure list to the handful of times worth
//! showing right now. Two policies are available: a fixed window around the
//! current time, or the last few departures that already left plus the next
//! few to come.

mod policy;
mod rows;
mod select;

pub use policy::{DEFAULT_AFTER_MINS, DEFAULT_BEFORE_MINS, DEFAULT_NEAREST_COUNT, RelevancePolicy};
pub use rows::{DisplayRow, display_rows};
pub use select::{DisplayTime, select_relevant, valid_times};
