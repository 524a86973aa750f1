//! HTTP route handlers.

pub mod health;
pub mod locations;
pub mod logs;
