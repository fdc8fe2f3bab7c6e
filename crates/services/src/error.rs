//! Shared error types for the services crate.

use thiserror::Error;

use guess_core::model::{DecileError, RoundError};
use storage::StorageError;

/// Errors emitted while loading a subject catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors emitted by the round machine and game session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no subjects loaded yet")]
    DataUnavailable,
    #[error(transparent)]
    InvalidGuess(#[from] RoundError),
}

/// Errors emitted by `DistributionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DistributionError {
    #[error(transparent)]
    InvalidAccuracy(#[from] DecileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DistributionError {
    /// True when the caller sent bad input, as opposed to a backend failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, DistributionError::InvalidAccuracy(_))
    }
}

/// Errors emitted while reporting a final score.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    #[error("score report failed with status {status}: {message}")]
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Distribution(#[from] DistributionError),
}
