//! Domain error types.

use thiserror::Error;

/// Failure reported by a [`LogStore`](crate::services::LogStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors raised while creating, editing or removing logs.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("{0}")]
    Validation(String),

    #[error("A log for campaign {campaign_number} at {location} on {log_date} already exists")]
    Duplicate {
        campaign_number: String,
        location: String,
        log_date: String,
    },

    #[error("Log entry {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<validator::ValidationErrors> for LogError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |err| {
                    format!("{}: {}", field, err.message.as_ref().unwrap_or(&"".into()))
                })
            })
            .collect();
        messages.sort();
        LogError::Validation(messages.join(", "))
    }
}
