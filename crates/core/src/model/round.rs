use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Party, Subject, SubjectId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum RoundError {
    #[error("swipe displacement must be finite, got {0}")]
    NonFiniteSwipe(f32),
    #[error("swipe threshold must be positive and finite, got {0}")]
    InvalidThreshold(f32),
}

//
// ─── GUESS INPUT ──────────────────────────────────────────────────────────────
//

/// Default horizontal distance a drag must travel before it commits.
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 100.0;

/// Minimum horizontal travel, in pixels, that turns a released drag into a guess.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeThreshold(f32);

impl SwipeThreshold {
    /// # Errors
    ///
    /// Returns `RoundError::InvalidThreshold` for zero, negative or non-finite values.
    pub fn new(distance: f32) -> Result<Self, RoundError> {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(RoundError::InvalidThreshold(distance));
        }
        Ok(Self(distance))
    }

    #[must_use]
    pub fn distance(self) -> f32 {
        self.0
    }
}

impl Default for SwipeThreshold {
    fn default() -> Self {
        Self(DEFAULT_SWIPE_THRESHOLD)
    }
}

/// Raw user input for the current round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Guess {
    /// One of the two exclusive buttons was pressed.
    Pick(Party),
    /// A drag was released with the given horizontal displacement.
    Swipe(f32),
}

impl Guess {
    /// Resolves the input to a party.
    ///
    /// A swipe that ends inside `(-threshold, +threshold)` resolves to `None`.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::NonFiniteSwipe` if the displacement is NaN or infinite.
    pub fn resolve(self, threshold: SwipeThreshold) -> Result<Option<Party>, RoundError> {
        match self {
            Guess::Pick(party) => Ok(Some(party)),
            Guess::Swipe(dx) if !dx.is_finite() => Err(RoundError::NonFiniteSwipe(dx)),
            Guess::Swipe(dx) if dx <= -threshold.0 => Ok(Some(Party::Democrat)),
            Guess::Swipe(dx) if dx >= threshold.0 => Ok(Some(Party::Republican)),
            Guess::Swipe(_) => Ok(None),
        }
    }
}

//
// ─── ROUND RESULT ─────────────────────────────────────────────────────────────
//

/// Outcome of one resolved round. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundResult {
    subject_id: SubjectId,
    guessed: Party,
    actual: Party,
    correct: bool,
    resolved_at: DateTime<Utc>,
}

impl RoundResult {
    #[must_use]
    pub fn resolve(subject: &Subject, guessed: Party, resolved_at: DateTime<Utc>) -> Self {
        let actual = subject.party();
        Self {
            subject_id: subject.id(),
            guessed,
            actual,
            correct: guessed == actual,
            resolved_at,
        }
    }

    #[must_use]
    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    #[must_use]
    pub fn guessed(&self) -> Party {
        self.guessed
    }

    #[must_use]
    pub fn actual(&self) -> Party {
        self.actual
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.correct
    }

    #[must_use]
    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }
}
