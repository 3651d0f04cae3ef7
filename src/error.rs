use thiserror::Error;
use uuid::Uuid;

use crate::database::models::BookingStatus;
use crate::scheduling::time::{Interval, TimeOfDay};

/// A proposed unit that the assignment guard found already committed to an
/// overlapping booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitConflict {
    pub unit_id: Uuid,
    pub booking_id: Uuid,
}

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Provider not found: {0}")]
    ProviderNotFound(Uuid),

    #[error("Booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval { start: TimeOfDay, end: TimeOfDay },

    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Target interval {given} does not match the booking's stored window {stored}")]
    IntervalMismatch { stored: Interval, given: Interval },

    #[error("Unit {unit_id} is not assignable: {reason}")]
    UnitNotAssignable { unit_id: Uuid, reason: String },

    #[error("Assignment conflict: {} unit(s) already committed to an overlapping booking", conflicts.len())]
    AssignmentConflict { conflicts: Vec<UnitConflict> },

    #[error("Illegal booking status transition: {from} -> {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("Repository operation timed out")]
    RepositoryTimeout,

    #[error("Repository unavailable: {0}")]
    RepositoryUnavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for SchedulingError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => {
                log::error!("Database pool timed out");
                SchedulingError::RepositoryTimeout
            }
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                log::error!("Database unavailable: {}", error);
                SchedulingError::RepositoryUnavailable(error.to_string())
            }
            other => {
                log::error!("Database error: {}", other);
                SchedulingError::Database(other)
            }
        }
    }
}

impl SchedulingError {
    /// Transient infrastructure failures that are safe to retry for
    /// read-only operations. The assignment guard's commit step must
    /// re-read booking state before retrying instead.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SchedulingError::RepositoryTimeout | SchedulingError::RepositoryUnavailable(_)
        )
    }
}
