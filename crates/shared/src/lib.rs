//! Shared utilities and common types for the Campaign Logs backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Approximate string matching for free-text location names
//! - Common validation logic for submitted form fields

pub mod similarity;
pub mod validation;
