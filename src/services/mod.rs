pub mod scheduling;

pub use scheduling::{AvailabilityResult, SchedulingService, UnavailableReason};
