use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

use crate::database::models::{
    Booking, BookingStatus, DayWindow, Provider, TeamAssignment,
};
use crate::database::repositories::{BookingStore, ProviderDirectory};
use crate::error::{SchedulingError, UnitConflict};
use crate::scheduling::capacity::{self, CapacityReport};
use crate::scheduling::policy::{self, IneligibleReason};
use crate::scheduling::slots::AvailableSlots;
use crate::scheduling::time::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    BlackoutDate,
    DayUnavailable,
    InsufficientCapacity,
}

impl From<IneligibleReason> for UnavailableReason {
    fn from(reason: IneligibleReason) -> Self {
        match reason {
            IneligibleReason::BlackoutDate => UnavailableReason::BlackoutDate,
            IneligibleReason::DayUnavailable => UnavailableReason::DayUnavailable,
        }
    }
}

impl std::fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnavailableReason::BlackoutDate => write!(f, "blackout_date"),
            UnavailableReason::DayUnavailable => write!(f, "day_unavailable"),
            UnavailableReason::InsufficientCapacity => write!(f, "insufficient_capacity"),
        }
    }
}

/// Outcome of a date-level availability check. Ineligibility and exhausted
/// capacity are payloads here, never errors; only infrastructure failures
/// and illegal input error out of the check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    pub available: bool,
    pub reason: Option<UnavailableReason>,
    pub hours: Option<DayWindow>,
    pub team: Option<CapacityReport>,
    pub equipment: Option<CapacityReport>,
    /// Confirmed/in-progress intervals for the day, ready to feed the slot
    /// generator without a second store round trip.
    pub booked_intervals: Vec<Interval>,
}

impl AvailabilityResult {
    fn ineligible(reason: IneligibleReason) -> Self {
        AvailabilityResult {
            available: false,
            reason: Some(reason.into()),
            hours: None,
            team: None,
            equipment: None,
            booked_intervals: Vec::new(),
        }
    }
}

/// The availability and assignment façade over the provider directory and
/// booking store. All store access goes through a caller-configured timeout;
/// the assignment guard serializes per provider so its check-then-commit
/// cannot race another confirmation for the same roster.
pub struct SchedulingService {
    directory: Arc<dyn ProviderDirectory>,
    bookings: Arc<dyn BookingStore>,
    repository_timeout: Duration,
    provider_locks: StdMutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl SchedulingService {
    pub fn new(
        directory: Arc<dyn ProviderDirectory>,
        bookings: Arc<dyn BookingStore>,
        repository_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            bookings,
            repository_timeout,
            provider_locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Date-level availability verdict. Read-only and idempotent: repeated
    /// calls with no intervening booking writes return identical results.
    pub async fn check_availability(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        units_required: u32,
    ) -> Result<AvailabilityResult, SchedulingError> {
        let provider = self.fetch_provider(provider_id).await?;

        let eligibility = policy::is_day_eligible(&provider.policy, date);
        let Some(hours) = eligibility.hours else {
            let reason = eligibility
                .reason
                .unwrap_or(IneligibleReason::DayUnavailable);
            log::debug!(
                "Provider {} ineligible on {}: {}",
                provider_id,
                date,
                reason
            );
            return Ok(AvailabilityResult::ineligible(reason));
        };

        let day_bookings = self.fetch_day_bookings(provider_id, date).await?;

        let team = capacity::team_capacity(&provider, &day_bookings, None);
        let equipment = capacity::equipment_capacity(&provider, &day_bookings, None);
        let booked_intervals = day_bookings.iter().map(|b| b.interval()).collect();

        let available = team.free_units >= units_required;
        Ok(AvailabilityResult {
            available,
            reason: (!available).then_some(UnavailableReason::InsufficientCapacity),
            hours: Some(hours),
            team: Some(team),
            equipment: Some(equipment),
            booked_intervals,
        })
    }

    /// Candidate slots of `duration_hours` within the day's working hours,
    /// at hourly start boundaries, skipping booked intervals. Empty when the
    /// day is ineligible. Picking a slot is tentative; the assignment guard
    /// settles races at confirmation time.
    pub async fn find_available_slots(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
        duration_hours: u16,
    ) -> Result<AvailableSlots, SchedulingError> {
        let provider = self.fetch_provider(provider_id).await?;

        let eligibility = policy::is_day_eligible(&provider.policy, date);
        let Some(hours) = eligibility.hours else {
            return Ok(AvailableSlots::none());
        };

        let day_bookings = self.fetch_day_bookings(provider_id, date).await?;
        let booked = day_bookings.iter().map(|b| b.interval()).collect();

        Ok(AvailableSlots::new(
            hours,
            duration_hours.saturating_mul(60),
            booked,
        ))
    }

    /// The assignment guard: re-validates that every proposed unit is free
    /// for the booking's time window, then commits status and assignment as
    /// one conditional update. At most one of any set of racing
    /// confirmations sharing a unit over overlapping intervals can succeed.
    pub async fn guard_and_assign(
        &self,
        booking_id: Uuid,
        proposed: TeamAssignment,
        target: Interval,
    ) -> Result<Booking, SchedulingError> {
        // Interval fields are public; re-validate before touching the store.
        let target = Interval::new(target.start, target.end)?;

        let booking = self
            .with_timeout(self.bookings.get_booking(booking_id))
            .await?
            .ok_or(SchedulingError::BookingNotFound(booking_id))?;

        if !booking.status.can_transition_to(BookingStatus::Confirmed) {
            return Err(SchedulingError::InvalidTransition {
                from: booking.status,
                to: BookingStatus::Confirmed,
            });
        }

        // The conflict check below runs against the booking's stored window,
        // so a target that disagrees with it would confirm an assignment
        // whose real interval was never checked.
        if target != booking.interval() {
            return Err(SchedulingError::IntervalMismatch {
                stored: booking.interval(),
                given: target,
            });
        }

        let provider = self.fetch_provider(booking.provider_id).await?;
        validate_units(&provider, &proposed)?;

        let lock = self.provider_lock(provider.id);
        let result = {
            let _guard = lock.lock().await;
            self.confirm_under_lock(&booking, proposed).await
        };
        drop(lock);
        self.prune_provider_lock(provider.id);

        result
    }

    /// Lifecycle transitions other than confirmation: start, complete,
    /// cancel or dispute a booking. Consults the status state machine before
    /// the store's conditional update; cancellation and completion release
    /// the booking's units by virtue of leaving the resource-holding states.
    pub async fn update_booking_status(
        &self,
        booking_id: Uuid,
        next: BookingStatus,
    ) -> Result<Booking, SchedulingError> {
        let booking = self
            .with_timeout(self.bookings.get_booking(booking_id))
            .await?
            .ok_or(SchedulingError::BookingNotFound(booking_id))?;

        if !booking.status.can_transition_to(next) {
            return Err(SchedulingError::InvalidTransition {
                from: booking.status,
                to: next,
            });
        }

        let updated = self
            .with_timeout(self.bookings.update_status(booking_id, booking.status, next))
            .await?;

        match updated {
            Some(updated) => Ok(updated),
            None => {
                let current = self
                    .with_timeout(self.bookings.get_booking(booking_id))
                    .await?
                    .ok_or(SchedulingError::BookingNotFound(booking_id))?;
                Err(SchedulingError::InvalidTransition {
                    from: current.status,
                    to: next,
                })
            }
        }
    }

    async fn confirm_under_lock(
        &self,
        booking: &Booking,
        proposed: TeamAssignment,
    ) -> Result<Booking, SchedulingError> {
        // Re-read under the lock: another confirmation may have landed
        // between the caller's availability check and now.
        let day_bookings = self
            .fetch_day_bookings(booking.provider_id, booking.event_date)
            .await?;

        let conflicts = find_conflicts(booking.id, &proposed, &day_bookings, booking.interval());
        if !conflicts.is_empty() {
            log::warn!(
                "Assignment guard rejected booking {}: {} conflicting unit(s)",
                booking.id,
                conflicts.len()
            );
            return Err(SchedulingError::AssignmentConflict { conflicts });
        }

        // Commit is all-or-nothing; a lost precondition means a concurrent
        // writer changed the booking status after our initial read.
        let confirmed = self
            .with_timeout(self.bookings.confirm_assignment(
                booking.id,
                booking.status,
                BookingStatus::Confirmed,
                proposed,
            ))
            .await?;

        match confirmed {
            Some(confirmed) => Ok(confirmed),
            None => {
                let current = self
                    .with_timeout(self.bookings.get_booking(booking.id))
                    .await?
                    .ok_or(SchedulingError::BookingNotFound(booking.id))?;
                Err(SchedulingError::InvalidTransition {
                    from: current.status,
                    to: BookingStatus::Confirmed,
                })
            }
        }
    }

    async fn fetch_provider(&self, provider_id: Uuid) -> Result<Provider, SchedulingError> {
        self.with_timeout(self.directory.get_provider(provider_id))
            .await?
            .ok_or(SchedulingError::ProviderNotFound(provider_id))
    }

    async fn fetch_day_bookings(
        &self,
        provider_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Booking>, SchedulingError> {
        self.with_timeout(self.bookings.find_for_provider_on_date(
            provider_id,
            date,
            &BookingStatus::RESOURCE_HOLDING,
        ))
        .await
    }

    async fn with_timeout<T, F>(&self, fut: F) -> Result<T, SchedulingError>
    where
        F: Future<Output = Result<T, SchedulingError>>,
    {
        match tokio::time::timeout(self.repository_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(SchedulingError::RepositoryTimeout),
        }
    }

    fn provider_lock(&self, provider_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .provider_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(provider_id).or_default().clone()
    }

    /// Drops a provider's lock entry once no task holds a handle to it, so
    /// the registry stays bounded by the number of in-flight confirmations.
    /// Handing out and pruning both happen under the registry mutex, so a
    /// strong count of 1 means the map holds the only reference.
    fn prune_provider_lock(&self, provider_id: Uuid) {
        let mut locks = self
            .provider_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(lock) = locks.get(&provider_id)
            && Arc::strong_count(lock) == 1
        {
            locks.remove(&provider_id);
        }
    }
}

fn validate_units(
    provider: &Provider,
    proposed: &TeamAssignment,
) -> Result<(), SchedulingError> {
    for id in &proposed.team_member_ids {
        match provider.team_member(*id) {
            None => {
                return Err(SchedulingError::UnitNotAssignable {
                    unit_id: *id,
                    reason: "not on this provider's team roster".to_string(),
                });
            }
            Some(member) if !member.is_active => {
                return Err(SchedulingError::UnitNotAssignable {
                    unit_id: *id,
                    reason: "team member is inactive".to_string(),
                });
            }
            Some(_) => {}
        }
    }

    for id in &proposed.equipment_ids {
        match provider.equipment_unit(*id) {
            None => {
                return Err(SchedulingError::UnitNotAssignable {
                    unit_id: *id,
                    reason: "not on this provider's equipment roster".to_string(),
                });
            }
            Some(unit) if !unit.is_available => {
                return Err(SchedulingError::UnitNotAssignable {
                    unit_id: *id,
                    reason: "equipment unit is withdrawn".to_string(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(())
}

fn find_conflicts(
    booking_id: Uuid,
    proposed: &TeamAssignment,
    day_bookings: &[Booking],
    target: Interval,
) -> Vec<UnitConflict> {
    let mut conflicts = Vec::new();

    for other in day_bookings {
        if other.id == booking_id || !other.status.holds_resources() {
            continue;
        }
        if !other.interval().overlaps(&target) {
            continue;
        }
        for unit_id in proposed
            .team_member_ids
            .iter()
            .chain(proposed.equipment_ids.iter())
        {
            if other.assignment.contains(*unit_id) {
                conflicts.push(UnitConflict {
                    unit_id: *unit_id,
                    booking_id: other.id,
                });
            }
        }
    }

    conflicts
}
