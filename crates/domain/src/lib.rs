//! Domain layer for the Campaign Logs backend.
//!
//! This crate contains:
//! - Domain models (Location, LogEntry and its form payloads)
//! - Business logic services (listing, duplicate detection, storage seam)
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;
