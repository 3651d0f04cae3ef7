pub mod capacity;
pub mod policy;
pub mod slots;
pub mod time;

pub use capacity::CapacityReport;
pub use policy::{Eligibility, IneligibleReason};
pub use slots::AvailableSlots;
pub use time::{Interval, TimeOfDay, intervals_overlap};
