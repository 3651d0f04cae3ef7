use serde::{Deserialize, Serialize};

use crate::error::SchedulingError;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time of day as minutes since midnight. Parsed from and formatted as
/// `HH:MM` 24-hour strings; `24:00` is allowed as an end-of-day boundary.
///
/// All times are naive local time in the provider's operating region; no
/// timezone conversion is performed anywhere in the crate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Builds a time of day from minutes since midnight, capped at 24:00.
    pub fn from_minutes(minutes: u16) -> Self {
        TimeOfDay(minutes.min(MINUTES_PER_DAY))
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchedulingError::InvalidTime(s.to_string());

        let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
        let hour: u16 = hour.parse().map_err(|_| invalid())?;
        let minute: u16 = minute.parse().map_err(|_| invalid())?;

        if hour > 24 || minute > 59 || (hour == 24 && minute != 0) {
            return Err(invalid());
        }

        Ok(TimeOfDay(hour * 60 + minute))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = SchedulingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// A half-open `[start, end)` time window within a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl Interval {
    /// Validated construction; rejects inverted or empty windows before any
    /// query runs against the booking store.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, SchedulingError> {
        if end <= start {
            return Err(SchedulingError::InvalidInterval { start, end });
        }
        Ok(Interval { start, end })
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        intervals_overlap(self, other)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Half-open overlap test: touching endpoints do not overlap.
pub fn intervals_overlap(a: &Interval, b: &Interval) -> bool {
    a.start < b.end && b.start < a.end
}
