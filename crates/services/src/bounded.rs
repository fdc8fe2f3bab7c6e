use std::future::Future;
use std::time::Duration;

use storage::StorageError;

/// Default upper bound on a single storage round trip.
pub(crate) const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs a storage future, turning an elapsed deadline into `StorageError::Timeout`.
pub(crate) async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, StorageError>
where
    F: Future<Output = Result<T, StorageError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| StorageError::Timeout(limit))?
}
