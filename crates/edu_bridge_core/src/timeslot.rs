//! crates/edu_bridge_core/src/timeslot.rs
//!
//! Minute-resolution time-of-day parsing and the interval-overlap predicate
//! shared by availability validation and booking conflict checks.
//!
//! All slots use half-open `[start, end)` semantics: a slot ending at 10:00
//! does NOT conflict with one starting at 10:00.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Accepts 24-hour clock strings such as "09:00", "9:00", or "23:59".
static TIME_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").expect("time format pattern is valid")
});

/// Errors produced while building a [`TimeSlot`] from raw "HH:MM" input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeSlotError {
    #[error("Invalid time format. Use HH:MM format (e.g., 09:00)")]
    InvalidTimeFormat,
    #[error("End time must be after start time")]
    InvalidRange,
}

/// A time of day at minute resolution, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Parses a 24-hour "HH:MM" string.
    pub fn parse(raw: &str) -> Result<Self, TimeSlotError> {
        if !TIME_FORMAT.is_match(raw) {
            return Err(TimeSlotError::InvalidTimeFormat);
        }
        let (hours, minutes) = raw
            .split_once(':')
            .ok_or(TimeSlotError::InvalidTimeFormat)?;
        let hours: u16 = hours.parse().map_err(|_| TimeSlotError::InvalidTimeFormat)?;
        let minutes: u16 = minutes
            .parse()
            .map_err(|_| TimeSlotError::InvalidTimeFormat)?;
        Ok(Self(hours * 60 + minutes))
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ClockTime {
    /// Renders the zero-padded "HH:MM" form, e.g. "09:00".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// A half-open time interval `[start, end)` within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeSlot {
    /// Parses a start/end pair, rejecting empty or inverted ranges.
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeSlotError> {
        let start = ClockTime::parse(start)?;
        let end = ClockTime::parse(end)?;
        if end <= start {
            return Err(TimeSlotError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    /// Two intervals overlap iff `a.start < b.end AND b.start < a.end`.
    /// This excludes the adjacent case where one ends exactly when the
    /// other starts.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }
}
