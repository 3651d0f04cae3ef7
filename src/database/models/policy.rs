use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::SchedulingError;
use crate::scheduling::time::TimeOfDay;

/// Open hours for a single weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayWindow {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl DayWindow {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, SchedulingError> {
        if end <= start {
            return Err(SchedulingError::InvalidInterval { start, end });
        }
        Ok(DayWindow { start, end })
    }

}

/// Per-weekday open/closed windows; `None` means the provider does not take
/// bookings on that weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyHours {
    pub monday: Option<DayWindow>,
    pub tuesday: Option<DayWindow>,
    pub wednesday: Option<DayWindow>,
    pub thursday: Option<DayWindow>,
    pub friday: Option<DayWindow>,
    pub saturday: Option<DayWindow>,
    pub sunday: Option<DayWindow>,
}

impl WeeklyHours {
    pub fn window_for(&self, weekday: Weekday) -> Option<DayWindow> {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}

/// A provider's availability policy: weekly working hours plus calendar days
/// that are fully excluded regardless of the weekday schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPolicy {
    pub weekly: WeeklyHours,
    pub blackout_dates: HashSet<NaiveDate>,
}

impl AvailabilityPolicy {
    pub fn is_blackout(&self, date: NaiveDate) -> bool {
        self.blackout_dates.contains(&date)
    }
}
