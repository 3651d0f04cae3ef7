use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::database::models::{Booking, BookingInput, BookingStatus, Provider, TeamAssignment};
use crate::error::SchedulingError;

pub mod booking;
pub mod provider;

pub use booking::BookingRepository;
pub use provider::ProviderRepository;

/// Read-only access to provider profiles, rosters and availability policies.
#[async_trait]
pub trait ProviderDirectory: Send + Sync {
    async fn get_provider(&self, id: Uuid) -> Result<Option<Provider>, SchedulingError>;
}

/// Booking persistence. `confirm_assignment` and `update_status` are
/// conditional updates: they apply only while the booking is still in the
/// expected status, and return `None` when that precondition was lost to a
/// concurrent writer.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn create_booking(&self, input: BookingInput) -> Result<Booking, SchedulingError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, SchedulingError>;

    async fn find_for_provider_on_date(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>, SchedulingError>;

    async fn confirm_assignment(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        assignment: TeamAssignment,
    ) -> Result<Option<Booking>, SchedulingError>;

    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<Option<Booking>, SchedulingError>;
}
