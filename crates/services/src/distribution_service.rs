use std::sync::Arc;
use std::time::Duration;

use guess_core::model::{DECILE_COUNT, Decile, Distribution};
use storage::{CounterStore, StorageError};

use crate::bounded::{DEFAULT_STORE_TIMEOUT, bounded};
use crate::error::DistributionError;

/// Counter holding the number of accepted reports.
pub const TOTAL_GAMES_KEY: &str = "stats:total_games";

/// Counter key for one histogram bucket, e.g. `stats:accuracy:50`.
#[must_use]
pub fn bucket_key(decile: Decile) -> String {
    format!("stats:accuracy:{}", decile.lower())
}

/// Population-wide accuracy histogram backed by an atomic counter store.
///
/// Holds no counts itself; every call goes to the store.
#[derive(Clone)]
pub struct DistributionService {
    counters: Arc<dyn CounterStore>,
    timeout: Duration,
    bucket_keys: Vec<String>,
}

impl DistributionService {
    #[must_use]
    pub fn new(counters: Arc<dyn CounterStore>) -> Self {
        Self {
            counters,
            timeout: DEFAULT_STORE_TIMEOUT,
            bucket_keys: Decile::all().map(bucket_key).collect(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Record one player's final accuracy.
    ///
    /// The bucket and the total are bumped by two independent atomic
    /// increments; a failure between them leaves the total one behind.
    ///
    /// # Errors
    ///
    /// Returns `DistributionError::InvalidAccuracy` (nothing written) for values
    /// outside `0..=100`, or `DistributionError::Storage` if an increment fails.
    pub async fn report(&self, accuracy: f64) -> Result<Decile, DistributionError> {
        let decile = Decile::from_accuracy(accuracy)?;
        let key = bucket_key(decile);

        bounded(self.timeout, self.counters.incr(&key)).await?;
        bounded(self.timeout, self.counters.incr(TOTAL_GAMES_KEY)).await?;

        log::debug!("recorded accuracy {accuracy} in bucket {decile}");
        Ok(decile)
    }

    /// Read the full histogram.
    ///
    /// Buckets and total are fetched concurrently and are not a consistent
    /// snapshot under concurrent reports.
    ///
    /// # Errors
    ///
    /// Returns `DistributionError::Storage` if any read fails.
    pub async fn distribution(&self) -> Result<Distribution, DistributionError> {
        let (counts, total) = tokio::try_join!(
            bounded(self.timeout, self.counters.get_many(&self.bucket_keys)),
            bounded(self.timeout, self.counters.get(TOTAL_GAMES_KEY)),
        )?;

        let counts: [u64; DECILE_COUNT] = counts.try_into().map_err(|got: Vec<u64>| {
            StorageError::Serialization(format!(
                "expected {DECILE_COUNT} bucket counts, got {}",
                got.len()
            ))
        })?;

        Ok(Distribution::from_counts(counts, total))
    }

    /// Like [`Self::distribution`], but degrades to an empty histogram on failure.
    pub async fn distribution_or_empty(&self) -> Distribution {
        self.distribution().await.unwrap_or_else(|err| {
            log::error!("failed to read accuracy distribution: {err}");
            Distribution::unavailable()
        })
    }

    /// # Errors
    ///
    /// Returns `DistributionError::Storage` if the counter store is unreachable.
    pub async fn health(&self) -> Result<(), DistributionError> {
        bounded(self.timeout, self.counters.ping()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storage::InMemoryRepository;

    /// Counter store that fails every call after `ok_calls` successful ones.
    struct FlakyCounters {
        inner: InMemoryRepository,
        ok_calls: usize,
        calls: AtomicUsize,
    }

    impl FlakyCounters {
        fn gate(&self) -> Result<(), StorageError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.ok_calls {
                Ok(())
            } else {
                Err(StorageError::Connection("counter store down".into()))
            }
        }
    }

    #[async_trait]
    impl CounterStore for FlakyCounters {
        async fn incr(&self, key: &str) -> Result<u64, StorageError> {
            self.gate()?;
            self.inner.incr(key).await
        }

        async fn get(&self, key: &str) -> Result<u64, StorageError> {
            self.gate()?;
            self.inner.get(key).await
        }

        async fn get_many(&self, keys: &[String]) -> Result<Vec<u64>, StorageError> {
            self.gate()?;
            self.inner.get_many(keys).await
        }

        async fn ping(&self) -> Result<(), StorageError> {
            self.gate()
        }
    }

    fn service() -> (DistributionService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        (DistributionService::new(Arc::new(repo.clone())), repo)
    }

    #[tokio::test]
    async fn report_buckets_into_expected_keys() {
        let (svc, repo) = service();
        assert_eq!(svc.report(0.0).await.unwrap().to_string(), "0-9");
        assert_eq!(svc.report(55.0).await.unwrap().to_string(), "50-59");
        assert_eq!(svc.report(100.0).await.unwrap().to_string(), "90-100");

        assert_eq!(repo.get("stats:accuracy:0").await.unwrap(), 1);
        assert_eq!(repo.get("stats:accuracy:50").await.unwrap(), 1);
        assert_eq!(repo.get("stats:accuracy:90").await.unwrap(), 1);
        assert_eq!(repo.get(TOTAL_GAMES_KEY).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn out_of_range_reports_do_not_touch_counters() {
        let (svc, repo) = service();
        for bad in [-1.0, 101.0, f64::NAN] {
            let err = svc.report(bad).await.unwrap_err();
            assert!(err.is_validation());
        }
        let dist = svc.distribution().await.unwrap();
        assert_eq!(dist.total_samples, 0);
        assert!(dist.entries.iter().all(|e| e.count == 0));
        assert_eq!(repo.get(TOTAL_GAMES_KEY).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn distribution_lists_ten_buckets_with_percentages() {
        let (svc, _repo) = service();
        for accuracy in [12.0, 15.0, 18.0, 95.0] {
            svc.report(accuracy).await.unwrap();
        }
        let dist = svc.distribution().await.unwrap();
        assert_eq!(dist.entries.len(), DECILE_COUNT);
        assert_eq!(dist.total_samples, 4);
        assert_eq!(dist.entries[1].range, "10-19");
        assert_eq!(dist.entries[1].count, 3);
        assert_eq!(dist.entries[1].percent_of_players, 75);
        assert_eq!(dist.entries[9].percent_of_players, 25);
        let sum: u64 = dist.entries.iter().map(|e| e.count).sum();
        assert_eq!(sum, dist.total_samples);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_reports_lose_no_increments() {
        let (svc, _repo) = service();
        let tasks: Vec<_> = (0..200)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.report(f64::from(i % 101)).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        let dist = svc.distribution().await.unwrap();
        assert_eq!(dist.total_samples, 200);
        let sum: u64 = dist.entries.iter().map(|e| e.count).sum();
        assert_eq!(sum, 200);
    }

    #[tokio::test]
    async fn read_failure_surfaces_and_fallback_is_empty() {
        let flaky = FlakyCounters {
            inner: InMemoryRepository::new(),
            ok_calls: 0,
            calls: AtomicUsize::new(0),
        };
        let svc = DistributionService::new(Arc::new(flaky));
        assert!(matches!(
            svc.distribution().await,
            Err(DistributionError::Storage(_))
        ));
        let fallback = svc.distribution_or_empty().await;
        assert!(fallback.is_empty());
        assert_eq!(fallback.total_samples, 0);
        assert!(svc.health().await.is_err());
    }

    #[tokio::test]
    async fn write_failure_after_bucket_surfaces_as_storage_error() {
        let flaky = FlakyCounters {
            inner: InMemoryRepository::new(),
            ok_calls: 1,
            calls: AtomicUsize::new(0),
        };
        let svc = DistributionService::new(Arc::new(flaky));
        let err = svc.report(40.0).await.unwrap_err();
        assert!(!err.is_validation());
    }
}
