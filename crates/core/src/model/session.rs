use thiserror::Error;

use crate::model::RoundResult;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStatsError {
    #[error("total_correct ({correct}) exceeds total_seen ({seen})")]
    CorrectExceedsSeen { correct: u32, seen: u32 },

    #[error("current_streak ({current}) exceeds best_streak ({best})")]
    StreakExceedsBest { current: u32, best: u32 },

    #[error("best_streak ({best}) exceeds total_correct ({correct})")]
    BestExceedsCorrect { best: u32, correct: u32 },
}

/// Running accuracy and streak counters for the local player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SessionStats {
    total_seen: u32,
    total_correct: u32,
    current_streak: u32,
    best_streak: u32,
}

impl SessionStats {
    /// All counters at zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Rehydrate stats from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionStatsError` if the counters violate any invariant; such a
    /// snapshot is malformed and must not be loaded.
    pub fn from_persisted(
        total_seen: u32,
        total_correct: u32,
        current_streak: u32,
        best_streak: u32,
    ) -> Result<Self, SessionStatsError> {
        if total_correct > total_seen {
            return Err(SessionStatsError::CorrectExceedsSeen {
                correct: total_correct,
                seen: total_seen,
            });
        }
        if current_streak > best_streak {
            return Err(SessionStatsError::StreakExceedsBest {
                current: current_streak,
                best: best_streak,
            });
        }
        if best_streak > total_correct {
            return Err(SessionStatsError::BestExceedsCorrect {
                best: best_streak,
                correct: total_correct,
            });
        }

        Ok(Self {
            total_seen,
            total_correct,
            current_streak,
            best_streak,
        })
    }

    /// Returns the stats after counting one more round.
    #[must_use]
    pub fn apply(&self, result: &RoundResult) -> Self {
        let total_seen = self.total_seen.saturating_add(1);
        let (total_correct, current_streak) = if result.is_correct() {
            (
                self.total_correct.saturating_add(1),
                self.current_streak.saturating_add(1),
            )
        } else {
            (self.total_correct, 0)
        };

        Self {
            total_seen,
            total_correct,
            current_streak,
            best_streak: self.best_streak.max(current_streak),
        }
    }

    #[must_use]
    pub fn total_seen(&self) -> u32 {
        self.total_seen
    }

    #[must_use]
    pub fn total_correct(&self) -> u32 {
        self.total_correct
    }

    #[must_use]
    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    #[must_use]
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Whole-number accuracy, rounded half away from zero. Zero before any round.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_seen == 0 {
            return 0;
        }
        let pct = f64::from(self.total_correct) / f64::from(self.total_seen) * 100.0;
        // Bounded to [0, 100] by the correct <= seen invariant.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = pct.round() as u32;
        rounded
    }
}
