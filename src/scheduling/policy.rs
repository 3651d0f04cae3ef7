use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::database::models::{AvailabilityPolicy, DayWindow};

/// Why a calendar day takes no bookings at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    BlackoutDate,
    DayUnavailable,
}

impl std::fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IneligibleReason::BlackoutDate => write!(f, "blackout_date"),
            IneligibleReason::DayUnavailable => write!(f, "day_unavailable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    pub eligible: bool,
    pub reason: Option<IneligibleReason>,
    pub hours: Option<DayWindow>,
}

impl Eligibility {
    fn ineligible(reason: IneligibleReason) -> Self {
        Eligibility {
            eligible: false,
            reason: Some(reason),
            hours: None,
        }
    }
}

/// Answers "does this calendar day take bookings at all". The blackout check
/// precedes the weekday check, so a date that is both blacked out and outside
/// working hours always reports `blackout_date`.
pub fn is_day_eligible(policy: &AvailabilityPolicy, date: NaiveDate) -> Eligibility {
    if policy.is_blackout(date) {
        return Eligibility::ineligible(IneligibleReason::BlackoutDate);
    }

    match policy.weekly.window_for(date.weekday()) {
        Some(hours) => Eligibility {
            eligible: true,
            reason: None,
            hours: Some(hours),
        },
        None => Eligibility::ineligible(IneligibleReason::DayUnavailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::WeeklyHours;
    use pretty_assertions::assert_eq;

    fn window(start: &str, end: &str) -> DayWindow {
        DayWindow::new(start.parse().unwrap(), end.parse().unwrap()).unwrap()
    }

    fn weekdays_only() -> AvailabilityPolicy {
        let hours = window("09:00", "18:00");
        AvailabilityPolicy {
            weekly: WeeklyHours {
                monday: Some(hours),
                tuesday: Some(hours),
                wednesday: Some(hours),
                thursday: Some(hours),
                friday: Some(hours),
                saturday: None,
                sunday: None,
            },
            blackout_dates: Default::default(),
        }
    }

    #[test]
    fn open_weekday_is_eligible_with_hours() {
        let policy = weekdays_only();
        // 2024-12-23 is a Monday.
        let result = is_day_eligible(&policy, NaiveDate::from_ymd_opt(2024, 12, 23).unwrap());

        assert_eq!(
            result,
            Eligibility {
                eligible: true,
                reason: None,
                hours: Some(window("09:00", "18:00")),
            }
        );
    }

    #[test]
    fn closed_weekday_reports_day_unavailable() {
        let policy = weekdays_only();
        // 2024-12-22 is a Sunday.
        let result = is_day_eligible(&policy, NaiveDate::from_ymd_opt(2024, 12, 22).unwrap());

        assert_eq!(result.eligible, false);
        assert_eq!(result.reason, Some(IneligibleReason::DayUnavailable));
        assert_eq!(result.hours, None);
    }

    #[test]
    fn blackout_date_reports_blackout() {
        let mut policy = weekdays_only();
        // 2024-12-25 is a Wednesday, normally open.
        let christmas = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        policy.blackout_dates.insert(christmas);

        let result = is_day_eligible(&policy, christmas);

        assert_eq!(result.eligible, false);
        assert_eq!(result.reason, Some(IneligibleReason::BlackoutDate));
    }

    #[test]
    fn blackout_takes_precedence_over_closed_weekday() {
        let mut policy = weekdays_only();
        // 2024-12-21 is a Saturday, closed by the weekly schedule too.
        let saturday = NaiveDate::from_ymd_opt(2024, 12, 21).unwrap();
        policy.blackout_dates.insert(saturday);

        let result = is_day_eligible(&policy, saturday);

        assert_eq!(result.reason, Some(IneligibleReason::BlackoutDate));
    }

    #[test]
    fn reason_codes_serialize_snake_case() {
        assert_eq!(
            serde_json::to_value(IneligibleReason::BlackoutDate).unwrap(),
            serde_json::json!("blackout_date")
        );
        assert_eq!(
            serde_json::to_value(IneligibleReason::DayUnavailable).unwrap(),
            serde_json::json!("day_unavailable")
        );
    }
}
