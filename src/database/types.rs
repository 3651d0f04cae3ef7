use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::database::models::{
    AvailabilityPolicy, Booking, BookingStatus, DayWindow, Equipment, Provider, ProviderKind,
    TeamAssignment, TeamMember, WeeklyHours,
};
use crate::scheduling::time::TimeOfDay;

/// Raw `bookings` row; times are stored as minutes since midnight.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub client_id: Uuid,
    pub event_date: NaiveDate,
    pub start_minutes: i16,
    pub end_minutes: i16,
    pub status: BookingStatus,
    pub team_member_ids: Vec<Uuid>,
    pub equipment_ids: Vec<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Booking {
            id: row.id,
            provider_id: row.provider_id,
            client_id: row.client_id,
            event_date: row.event_date,
            start_time: TimeOfDay::from_minutes(row.start_minutes.max(0) as u16),
            end_time: TimeOfDay::from_minutes(row.end_minutes.max(0) as u16),
            status: row.status,
            assignment: TeamAssignment {
                team_member_ids: row.team_member_ids,
                equipment_ids: row.equipment_ids,
            },
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Raw `providers` row; the weekly schedule is stored as one nullable
/// start/end minute pair per weekday.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProviderRow {
    pub id: Uuid,
    pub kind: ProviderKind,
    pub display_name: String,
    pub monday_start_minutes: Option<i16>,
    pub monday_end_minutes: Option<i16>,
    pub tuesday_start_minutes: Option<i16>,
    pub tuesday_end_minutes: Option<i16>,
    pub wednesday_start_minutes: Option<i16>,
    pub wednesday_end_minutes: Option<i16>,
    pub thursday_start_minutes: Option<i16>,
    pub thursday_end_minutes: Option<i16>,
    pub friday_start_minutes: Option<i16>,
    pub friday_end_minutes: Option<i16>,
    pub saturday_start_minutes: Option<i16>,
    pub saturday_end_minutes: Option<i16>,
    pub sunday_start_minutes: Option<i16>,
    pub sunday_end_minutes: Option<i16>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn day_window(start: Option<i16>, end: Option<i16>) -> Option<DayWindow> {
    match (start, end) {
        (Some(start), Some(end)) if start < end => Some(DayWindow {
            start: TimeOfDay::from_minutes(start.max(0) as u16),
            end: TimeOfDay::from_minutes(end.max(0) as u16),
        }),
        _ => None,
    }
}

impl ProviderRow {
    pub fn into_provider(
        self,
        team_members: Vec<TeamMember>,
        equipment: Vec<Equipment>,
        blackout_dates: Vec<NaiveDate>,
    ) -> Provider {
        let weekly = WeeklyHours {
            monday: day_window(self.monday_start_minutes, self.monday_end_minutes),
            tuesday: day_window(self.tuesday_start_minutes, self.tuesday_end_minutes),
            wednesday: day_window(self.wednesday_start_minutes, self.wednesday_end_minutes),
            thursday: day_window(self.thursday_start_minutes, self.thursday_end_minutes),
            friday: day_window(self.friday_start_minutes, self.friday_end_minutes),
            saturday: day_window(self.saturday_start_minutes, self.saturday_end_minutes),
            sunday: day_window(self.sunday_start_minutes, self.sunday_end_minutes),
        };

        Provider {
            id: self.id,
            kind: self.kind,
            display_name: self.display_name,
            policy: AvailabilityPolicy {
                weekly,
                blackout_dates: blackout_dates.into_iter().collect(),
            },
            team_members,
            equipment,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
