//! In-memory implementations of the collaborator seams, used by the test
//! suite and by embedders that have not wired a database yet. Arena-style:
//! everything is stored by id, relationships resolve by lookup.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{Booking, BookingInput, BookingStatus, Provider, TeamAssignment};
use crate::database::repositories::{BookingStore, ProviderDirectory};
use crate::error::SchedulingError;

#[derive(Default)]
pub struct InMemoryProviderDirectory {
    providers: RwLock<HashMap<Uuid, Provider>>,
}

impl InMemoryProviderDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, provider: Provider) {
        self.providers.write().await.insert(provider.id, provider);
    }
}

#[async_trait]
impl ProviderDirectory for InMemoryProviderDirectory {
    async fn get_provider(&self, id: Uuid) -> Result<Option<Provider>, SchedulingError> {
        Ok(self.providers.read().await.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryBookingStore {
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a booking as-is, bypassing creation-time validation.
    pub async fn insert(&self, booking: Booking) {
        self.bookings.write().await.insert(booking.id, booking);
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn create_booking(&self, input: BookingInput) -> Result<Booking, SchedulingError> {
        if input.end_time <= input.start_time {
            return Err(SchedulingError::InvalidInterval {
                start: input.start_time,
                end: input.end_time,
            });
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            provider_id: input.provider_id,
            client_id: input.client_id,
            event_date: input.event_date,
            start_time: input.start_time,
            end_time: input.end_time,
            status: BookingStatus::Pending,
            assignment: TeamAssignment::default(),
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        self.bookings
            .write()
            .await
            .insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, SchedulingError> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn find_for_provider_on_date(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>, SchedulingError> {
        let bookings = self.bookings.read().await;
        let mut found: Vec<Booking> = bookings
            .values()
            .filter(|b| {
                b.provider_id == provider_id
                    && b.event_date == date
                    && statuses.contains(&b.status)
            })
            .cloned()
            .collect();
        found.sort_by_key(|b| b.start_time);

        Ok(found)
    }

    async fn confirm_assignment(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        assignment: TeamAssignment,
    ) -> Result<Option<Booking>, SchedulingError> {
        // The write lock makes the check-then-write atomic, mirroring the
        // conditional UPDATE of the Postgres store.
        let mut bookings = self.bookings.write().await;
        let Some(booking) = bookings.get_mut(&id) else {
            return Ok(None);
        };
        if booking.status != expected {
            return Ok(None);
        }

        booking.status = next;
        booking.assignment = assignment;
        booking.updated_at = Utc::now();

        Ok(Some(booking.clone()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<Option<Booking>, SchedulingError> {
        let mut bookings = self.bookings.write().await;
        let Some(booking) = bookings.get_mut(&id) else {
            return Ok(None);
        };
        if booking.status != expected {
            return Ok(None);
        }

        booking.status = next;
        booking.updated_at = Utc::now();

        Ok(Some(booking.clone()))
    }
}
