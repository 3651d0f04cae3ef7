use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use lensbook::SchedulingService;
use lensbook::database::memory::{InMemoryBookingStore, InMemoryProviderDirectory};
use lensbook::database::models::{
    AvailabilityPolicy, Booking, BookingStatus, DayWindow, Equipment, Provider, ProviderKind,
    TeamAssignment, TeamMember, WeeklyHours,
};
use lensbook::scheduling::time::TimeOfDay;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn tod(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

pub fn window(start: &str, end: &str) -> DayWindow {
    DayWindow::new(tod(start), tod(end)).unwrap()
}

/// Monday 2024-12-23, open under `weekdays_nine_to_six`.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 23).unwrap()
}

pub fn weekdays_nine_to_six() -> AvailabilityPolicy {
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

pub fn team_member(provider_id: Uuid, active: bool) -> TeamMember {
    TeamMember {
        id: Uuid::new_v4(),
        provider_id,
        name: "Second shooter".to_string(),
        role: Some("photographer".to_string()),
        is_active: active,
        created_at: Utc::now(),
    }
}

pub fn equipment_unit(provider_id: Uuid, available: bool) -> Equipment {
    Equipment {
        id: Uuid::new_v4(),
        provider_id,
        name: "A7 IV body".to_string(),
        kind: Some("camera".to_string()),
        is_available: available,
        created_at: Utc::now(),
    }
}

pub fn provider_with_team(active_members: usize) -> Provider {
    let id = Uuid::new_v4();
    let now = Utc::now();
    Provider {
        id,
        kind: ProviderKind::Photographer,
        display_name: "Golden Hour Studio".to_string(),
        policy: weekdays_nine_to_six(),
        team_members: (0..active_members).map(|_| team_member(id, true)).collect(),
        equipment: vec![equipment_unit(id, true)],
        created_at: now,
        updated_at: now,
    }
}

pub fn booking_with_assignment(
    provider: &Provider,
    date: NaiveDate,
    start: &str,
    end: &str,
    status: BookingStatus,
    assignment: TeamAssignment,
) -> Booking {
    let now = Utc::now();
    Booking {
        id: Uuid::new_v4(),
        provider_id: provider.id,
        client_id: Uuid::new_v4(),
        event_date: date,
        start_time: tod(start),
        end_time: tod(end),
        status,
        assignment,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

pub struct TestContext {
    pub directory: Arc<InMemoryProviderDirectory>,
    pub store: Arc<InMemoryBookingStore>,
    pub service: SchedulingService,
}

impl TestContext {
    pub fn new() -> Self {
        init_logging();
        let directory = Arc::new(InMemoryProviderDirectory::new());
        let store = Arc::new(InMemoryBookingStore::new());
        let service = SchedulingService::new(
            directory.clone(),
            store.clone(),
            Duration::from_millis(500),
        );

        TestContext {
            directory,
            store,
            service,
        }
    }
}
