//! Domain models for Campaign Logs.

pub mod location;
pub mod log_entry;

pub use location::Location;
pub use log_entry::{LogDetails, LogEntry, LogStatus};
