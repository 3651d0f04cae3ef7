pub mod booking;
pub mod policy;
pub mod provider;

pub use booking::{Booking, BookingInput, BookingStatus, TeamAssignment};
pub use policy::{AvailabilityPolicy, DayWindow, WeeklyHours};
pub use provider::{Equipment, Provider, ProviderKind, TeamMember};
