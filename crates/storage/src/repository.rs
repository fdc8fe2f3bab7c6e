use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guess_core::model::{SessionStats, SessionStatsError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage operation timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Schema version stamped on every persisted stats snapshot.
///
/// Bump when the snapshot shape changes incompatibly; older rows then load as
/// absent instead of being reinterpreted.
pub const STATS_SCHEMA_VERSION: u32 = 1;

/// Persisted shape of the local `SessionStats` snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRecord {
    pub schema_version: u32,
    pub total_seen: u32,
    pub total_correct: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub saved_at: DateTime<Utc>,
}

impl StatsRecord {
    #[must_use]
    pub fn from_stats(stats: &SessionStats, saved_at: DateTime<Utc>) -> Self {
        Self {
            schema_version: STATS_SCHEMA_VERSION,
            total_seen: stats.total_seen(),
            total_correct: stats.total_correct(),
            current_streak: stats.current_streak(),
            best_streak: stats.best_streak(),
            saved_at,
        }
    }

    #[must_use]
    pub fn is_current_schema(&self) -> bool {
        self.schema_version == STATS_SCHEMA_VERSION
    }

    /// Convert the record back into domain stats.
    ///
    /// # Errors
    ///
    /// Returns `SessionStatsError` if the stored counters break an invariant.
    pub fn into_stats(self) -> Result<SessionStats, SessionStatsError> {
        SessionStats::from_persisted(
            self.total_seen,
            self.total_correct,
            self.current_streak,
            self.best_streak,
        )
    }
}

/// Client-local storage for the single stats snapshot.
#[async_trait]
pub trait SessionStatsRepository: Send + Sync {
    /// Fetch the stored snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored row cannot be decoded,
    /// or other storage errors.
    async fn load_stats(&self) -> Result<Option<StatsRecord>, StorageError>;

    /// Replace the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    async fn save_stats(&self, record: &StatsRecord) -> Result<(), StorageError>;
}

/// Shared counter store with an atomic increment primitive.
///
/// Missing keys read as zero.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically add one to `key` and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the increment could not be applied.
    async fn incr(&self, key: &str) -> Result<u64, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get(&self, key: &str) -> Result<u64, StorageError>;

    /// Values for `keys`, in the same order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<u64>, StorageError>;

    /// Cheap reachability probe used by health checks.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store cannot be reached.
    async fn ping(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    stats: Arc<Mutex<Option<StatsRecord>>>,
    counters: Arc<Mutex<HashMap<String, u64>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStatsRepository for InMemoryRepository {
    async fn load_stats(&self) -> Result<Option<StatsRecord>, StorageError> {
        let guard = self
            .stats
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_stats(&self, record: &StatsRecord) -> Result<(), StorageError> {
        let mut guard = self
            .stats
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(record.clone());
        Ok(())
    }
}

#[async_trait]
impl CounterStore for InMemoryRepository {
    async fn incr(&self, key: &str) -> Result<u64, StorageError> {
        let mut guard = self
            .counters
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let value = guard.entry(key.to_owned()).or_insert(0);
        *value = value.saturating_add(1);
        Ok(*value)
    }

    async fn get(&self, key: &str) -> Result<u64, StorageError> {
        let guard = self
            .counters
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).copied().unwrap_or(0))
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<u64>, StorageError> {
        let guard = self
            .counters
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(keys
            .iter()
            .map(|key| guard.get(key).copied().unwrap_or(0))
            .collect())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.counters
            .lock()
            .map(|_| ())
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub stats: Arc<dyn SessionStatsRepository>,
    pub counters: Arc<dyn CounterStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let stats: Arc<dyn SessionStatsRepository> = Arc::new(repo.clone());
        let counters: Arc<dyn CounterStore> = Arc::new(repo);
        Self { stats, counters }
    }
}
