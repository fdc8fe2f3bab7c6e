use std::sync::Arc;
use std::time::Duration;

use guess_core::model::{RoundResult, SessionStats};
use storage::{SessionStatsRepository, StatsRecord, StorageError};

use crate::Clock;
use crate::bounded::{DEFAULT_STORE_TIMEOUT, bounded};

/// How the tracker's starting state was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A valid snapshot was found and loaded verbatim.
    Restored,
    /// Nothing was stored; starting from zero.
    Missing,
    /// A snapshot existed but was unusable (old schema or bad counters); it
    /// was ignored and stats start from zero.
    Discarded,
    /// The store could not be read. Whatever is stored is kept and no write
    /// happens until a read succeeds or stats are reset.
    Unavailable,
}

/// New snapshot after an update, plus the write failure if persisting failed.
///
/// A failed write leaves the in-memory stats authoritative until the next
/// successful write.
#[derive(Debug)]
pub struct StatsUpdate {
    pub stats: SessionStats,
    pub persist_error: Option<StorageError>,
}

impl StatsUpdate {
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}

/// Single-writer owner of the local player's running stats.
pub struct SessionStatsService {
    repo: Arc<dyn SessionStatsRepository>,
    clock: Clock,
    timeout: Duration,
    stats: SessionStats,
    /// `Some` until the stored snapshot has been read, holding rounds counted
    /// in the meantime.
    unsynced: Option<Vec<RoundResult>>,
}

impl SessionStatsService {
    /// Tracker starting from zero; call [`Self::load`] to restore a snapshot.
    ///
    /// The first write reads the store first if `load` has not succeeded.
    #[must_use]
    pub fn new(repo: Arc<dyn SessionStatsRepository>, clock: Clock) -> Self {
        Self {
            repo,
            clock,
            timeout: DEFAULT_STORE_TIMEOUT,
            stats: SessionStats::zero(),
            unsynced: Some(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Replace in-memory stats with the persisted snapshot, if it is usable.
    ///
    /// Never fails. Absent or malformed data starts from zero. If the store
    /// cannot be read, the stored snapshot is left alone and nothing is written
    /// until a later read succeeds or [`Self::reset`] is called.
    pub async fn load(&mut self) -> LoadOutcome {
        match self.restore().await {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("could not read stored stats, leaving them untouched: {err}");
                LoadOutcome::Unavailable
            }
        }
    }

    /// Count one resolved round and persist the new snapshot.
    ///
    /// While the stored snapshot has not been read yet, the read is retried
    /// first; if it still fails the round is kept in memory only and the read
    /// error is returned as `persist_error`.
    pub async fn record_result(&mut self, result: &RoundResult) -> StatsUpdate {
        if self.unsynced.is_some() {
            if let Err(err) = self.restore().await {
                log::warn!("stored stats still unreadable, not saving: {err}");
                self.stats = self.stats.apply(result);
                if let Some(rounds) = self.unsynced.as_mut() {
                    rounds.push(result.clone());
                }
                return StatsUpdate {
                    stats: self.stats,
                    persist_error: Some(err),
                };
            }
        }

        self.stats = self.stats.apply(result);
        self.persist().await
    }

    /// Zero every counter, including the best streak, and persist.
    pub async fn reset(&mut self) -> StatsUpdate {
        self.stats = SessionStats::zero();
        self.unsynced = None;
        log::info!("session stats reset");
        self.persist().await
    }

    /// Read the stored snapshot and replay any rounds counted before it could
    /// be read. On error nothing changes.
    async fn restore(&mut self) -> Result<LoadOutcome, StorageError> {
        let record = bounded(self.timeout, self.repo.load_stats()).await?;
        let (base, outcome) = match record {
            None => (SessionStats::zero(), LoadOutcome::Missing),
            Some(record) if !record.is_current_schema() => {
                log::warn!(
                    "ignoring stats snapshot with schema version {}",
                    record.schema_version
                );
                (SessionStats::zero(), LoadOutcome::Discarded)
            }
            Some(record) => match record.into_stats() {
                Ok(stats) => (stats, LoadOutcome::Restored),
                Err(err) => {
                    log::warn!("discarding malformed stats snapshot: {err}");
                    (SessionStats::zero(), LoadOutcome::Discarded)
                }
            },
        };

        let replay = self.unsynced.take().unwrap_or_default();
        self.stats = replay.iter().fold(base, |stats, result| stats.apply(result));
        Ok(outcome)
    }

    async fn persist(&self) -> StatsUpdate {
        let record = StatsRecord::from_stats(&self.stats, self.clock.now());
        let persist_error = bounded(self.timeout, self.repo.save_stats(&record))
            .await
            .inspect_err(|err| log::warn!("failed to persist session stats: {err}"))
            .err();
        StatsUpdate {
            stats: self.stats,
            persist_error,
        }
    }
}
