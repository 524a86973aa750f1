//! Storage seam for log entries.
//!
//! The core never talks to a database directly: it goes through [`LogStore`],
//! which is implemented by the PostgreSQL repository and by
//! [`InMemoryLogStore`] for development and tests.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::LogEntry;

/// Keyed storage of log entries.
///
/// Writes are whole-record replacements keyed by `id`; there is no partial
/// merge.
#[async_trait::async_trait]
pub trait LogStore: Send + Sync {
    /// One more than the largest stored id, or 1 when empty.
    async fn next_id(&self) -> Result<i64, StoreError>;

    /// Creates or fully replaces the entry with `entry.id`.
    async fn upsert(&self, entry: &LogEntry) -> Result<(), StoreError>;

    /// Writes a batch of entries. Implementations that can should make the
    /// batch all-or-nothing.
    async fn upsert_many(&self, entries: &[LogEntry]) -> Result<(), StoreError> {
        for entry in entries {
            self.upsert(entry).await?;
        }
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<LogEntry>, StoreError>;

    /// Removes the entry. Returns false when nothing was stored under `id`.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    async fn list_all(&self) -> Result<Vec<LogEntry>, StoreError>;

    /// Entries whose stored campaign number and log date equal the given
    /// values exactly.
    async fn find_by_campaign_and_date(
        &self,
        campaign_number: &str,
        log_date: &str,
    ) -> Result<Vec<LogEntry>, StoreError>;

    /// Checks the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// In-process store backed by an ordered map.
#[derive(Debug, Default)]
pub struct InMemoryLogStore {
    entries: RwLock<BTreeMap<i64, LogEntry>>,
    /// Whether to simulate an unreachable backend.
    simulate_failure: bool,
}

impl InMemoryLogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries(entries: impl IntoIterator<Item = LogEntry>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().map(|e| (e.id, e)).collect()),
            simulate_failure: false,
        }
    }

    /// Create a store whose every operation fails.
    pub fn unavailable() -> Self {
        Self {
            entries: RwLock::default(),
            simulate_failure: true,
        }
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.simulate_failure {
            tracing::warn!("In-memory log store simulating failure");
            return Err(StoreError::Backend("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl LogStore for InMemoryLogStore {
    async fn next_id(&self) -> Result<i64, StoreError> {
        self.check_available()?;
        let entries = self.entries.read().await;
        Ok(entries.keys().next_back().map_or(1, |max| max + 1))
    }

    async fn upsert(&self, entry: &LogEntry) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries.write().await.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn upsert_many(&self, batch: &[LogEntry]) -> Result<(), StoreError> {
        self.check_available()?;
        let mut entries = self.entries.write().await;
        for entry in batch {
            entries.insert(entry.id, entry.clone());
        }
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<Option<LogEntry>, StoreError> {
        self.check_available()?;
        Ok(self.entries.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.entries.write().await.remove(&id).is_some())
    }

    async fn list_all(&self) -> Result<Vec<LogEntry>, StoreError> {
        self.check_available()?;
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn find_by_campaign_and_date(
        &self,
        campaign_number: &str,
        log_date: &str,
    ) -> Result<Vec<LogEntry>, StoreError> {
        self.check_available()?;
        Ok(self
            .entries
            .read()
            .await
            .values()
            .filter(|e| e.campaign_number == campaign_number && e.log_date == log_date)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}
