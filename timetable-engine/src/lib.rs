//! Bus timetable engine.
//!
//! Keeps a list of bus lines and their departure timetables in sync with a
//! remote source, and answers: "from this stop, on today's calendar, which
//! departures matter right now?"

pub mod clock;
pub mod domain;
pub mod engine;
pub mod filter;
pub mod relevance;
pub mod snapshot;
pub mod source;
pub mod stops;
pub mod sync;
