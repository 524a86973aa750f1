//! Persistence layer for the Campaign Logs backend.
//!
//! This crate contains:
//! - Database connection management and migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations of the domain storage seam

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
