//! Repository implementations for database operations.

pub mod log_entry;

pub use log_entry::LogEntryRepository;
