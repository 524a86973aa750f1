//! Log entry repository for database operations.

use domain::error::StoreError;
use domain::models::LogEntry;
use domain::services::LogStore;
use sqlx::{PgPool, Postgres};

use crate::entities::log_entry::{doc_key, LogEntryEntity};
use crate::metrics::QueryTimer;

const UPSERT_LOG: &str = r#"
    INSERT INTO logs (doc_key, id, location, campaign_number, log_date,
                      terminal_success, abnormal, errors, timestamp)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
    ON CONFLICT (doc_key) DO UPDATE SET
        id = EXCLUDED.id,
        location = EXCLUDED.location,
        campaign_number = EXCLUDED.campaign_number,
        log_date = EXCLUDED.log_date,
        terminal_success = EXCLUDED.terminal_success,
        abnormal = EXCLUDED.abnormal,
        errors = EXCLUDED.errors,
        timestamp = EXCLUDED.timestamp
    "#;

/// Repository for log-related database operations.
#[derive(Clone)]
pub struct LogEntryRepository {
    pool: PgPool,
}

impl LogEntryRepository {
    /// Creates a new LogEntryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Largest stored id plus one, or 1 for an empty table.
    pub async fn next_id(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("next_log_id");
        let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
            r#"
            SELECT COALESCE(MAX(id), 0) + 1 FROM logs
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.map(|row| row.0)
    }

    /// Create or fully replace a log.
    pub async fn upsert(&self, entry: &LogEntry) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("upsert_log");
        let result = upsert_query(entry).execute(&self.pool).await;
        timer.record();
        result.map(|_| ())
    }

    /// Create or fully replace several logs in one transaction.
    pub async fn upsert_many(&self, entries: &[LogEntry]) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("upsert_logs_batch");
        let result = self.upsert_batch(entries).await;
        timer.record();
        result
    }

    async fn upsert_batch(&self, entries: &[LogEntry]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for entry in entries {
            upsert_query(entry).execute(&mut *tx).await?;
        }
        tx.commit().await
    }

    /// Find a log by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<LogEntryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_log_by_id");
        let result = sqlx::query_as::<_, LogEntryEntity>(
            r#"
            SELECT * FROM logs WHERE doc_key = $1
            "#,
        )
        .bind(doc_key(id))
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a log.
    /// Returns the number of rows deleted (0 or 1).
    pub async fn delete(&self, id: i64) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_log");
        let result = sqlx::query(
            r#"
            DELETE FROM logs WHERE doc_key = $1
            "#,
        )
        .bind(doc_key(id))
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|done| done.rows_affected())
    }

    /// All logs, by id.
    pub async fn find_all(&self) -> Result<Vec<LogEntryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_logs");
        let result = sqlx::query_as::<_, LogEntryEntity>(
            r#"
            SELECT * FROM logs ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Logs with exactly this campaign number and log date.
    pub async fn find_by_campaign_and_date(
        &self,
        campaign_number: &str,
        log_date: &str,
    ) -> Result<Vec<LogEntryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_logs_by_campaign_and_date");
        let result = sqlx::query_as::<_, LogEntryEntity>(
            r#"
            SELECT * FROM logs
            WHERE campaign_number = $1 AND log_date = $2
            ORDER BY id
            "#,
        )
        .bind(campaign_number)
        .bind(log_date)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Round-trip to the database.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ())
    }
}

fn upsert_query(entry: &LogEntry) -> sqlx::query::Query<'_, Postgres, sqlx::postgres::PgArguments> {
    sqlx::query(UPSERT_LOG)
        .bind(doc_key(entry.id))
        .bind(entry.id)
        .bind(&entry.location)
        .bind(&entry.campaign_number)
        .bind(&entry.log_date)
        .bind(entry.terminal_success)
        .bind(entry.abnormal)
        .bind(&entry.errors)
        .bind(entry.timestamp)
}

fn store_error(err: sqlx::Error) -> StoreError {
    tracing::error!(error = %err, "Log store query failed");
    StoreError::Backend(err.to_string())
}

#[async_trait::async_trait]
impl LogStore for LogEntryRepository {
    async fn next_id(&self) -> Result<i64, StoreError> {
        LogEntryRepository::next_id(self).await.map_err(store_error)
    }

    async fn upsert(&self, entry: &LogEntry) -> Result<(), StoreError> {
        LogEntryRepository::upsert(self, entry)
            .await
            .map_err(store_error)
    }

    async fn upsert_many(&self, entries: &[LogEntry]) -> Result<(), StoreError> {
        LogEntryRepository::upsert_many(self, entries)
            .await
            .map_err(store_error)
    }

    async fn get(&self, id: i64) -> Result<Option<LogEntry>, StoreError> {
        self.find_by_id(id)
            .await
            .map(|entity| entity.map(Into::into))
            .map_err(store_error)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        LogEntryRepository::delete(self, id)
            .await
            .map(|rows| rows > 0)
            .map_err(store_error)
    }

    async fn list_all(&self) -> Result<Vec<LogEntry>, StoreError> {
        self.find_all()
            .await
            .map(|entities| entities.into_iter().map(Into::into).collect())
            .map_err(store_error)
    }

    async fn find_by_campaign_and_date(
        &self,
        campaign_number: &str,
        log_date: &str,
    ) -> Result<Vec<LogEntry>, StoreError> {
        LogEntryRepository::find_by_campaign_and_date(self, campaign_number, log_date)
            .await
            .map(|entities| entities.into_iter().map(Into::into).collect())
            .map_err(store_error)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        LogEntryRepository::ping(self).await.map_err(store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Query behavior is covered by tests/log_entry_repository.rs against PostgreSQL

    #[test]
    fn test_store_error_keeps_cause() {
        let err = store_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Backend(ref m) if m.contains("no rows")));
    }
}
