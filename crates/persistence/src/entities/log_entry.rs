//! Log entry entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database row mapping for the logs table.
#[derive(Debug, Clone, FromRow)]
pub struct LogEntryEntity {
    pub doc_key: String,
    pub id: i64,
    pub location: String,
    pub campaign_number: String,
    pub log_date: String,
    pub terminal_success: i64,
    pub abnormal: bool,
    pub errors: String,
    pub timestamp: DateTime<Utc>,
}

impl From<LogEntryEntity> for domain::models::LogEntry {
    fn from(entity: LogEntryEntity) -> Self {
        Self {
            id: entity.id,
            location: entity.location,
            campaign_number: entity.campaign_number,
            log_date: entity.log_date,
            terminal_success: entity.terminal_success,
            abnormal: entity.abnormal,
            errors: entity.errors,
            timestamp: entity.timestamp,
        }
    }
}

/// Document key a log is stored under.
pub fn doc_key(id: i64) -> String {
    id.to_string()
}
