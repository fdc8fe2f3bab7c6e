use thiserror::Error;

use crate::model::{DecileError, RoundError, SessionStatsError, SubjectError};

/// Umbrella error for callers that do not care which domain rule failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    Round(#[from] RoundError),
    #[error(transparent)]
    SessionStats(#[from] SessionStatsError),
    #[error(transparent)]
    Decile(#[from] DecileError),
}
