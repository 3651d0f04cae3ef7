pub mod config;
pub mod database;
pub mod error;
pub mod scheduling;
pub mod services;

pub use config::Config;
pub use database::repositories::{BookingStore, ProviderDirectory};
pub use error::SchedulingError;
pub use services::SchedulingService;
