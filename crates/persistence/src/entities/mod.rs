//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod log_entry;

pub use log_entry::LogEntryEntity;
