use std::sync::Arc;
use std::time::Duration;

use guess_core::model::{Guess, Party, RoundResult, SessionStats, Subject};
use tokio::sync::mpsc;

use super::machine::RoundMachine;
use super::timer::RevealTimer;
use crate::error::{ReportError, SessionError};
use crate::reporter::ScoreReporter;
use crate::stats_service::{SessionStatsService, StatsUpdate};

/// Default time the answer stays revealed before the next subject.
pub const DEFAULT_REVEAL_DWELL: Duration = Duration::from_millis(1500);

/// Tunables for a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundConfig {
    pub reveal_dwell: Duration,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            reveal_dwell: DEFAULT_REVEAL_DWELL,
        }
    }
}

/// Everything that can drive the session forward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Guess(Guess),
    /// Reveal dwell for `round` has elapsed.
    Advance { round: u64 },
}

/// What handling one event did.
#[derive(Debug)]
pub enum SessionUpdate {
    Resolved {
        result: RoundResult,
        update: StatsUpdate,
    },
    /// The next subject is now presented under this round number.
    Advanced { round: u64 },
    Ignored,
}

/// Stats at the end of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRecap {
    /// This session only; its accuracy is what gets reported.
    pub session: SessionStats,
    /// Persisted all-time stats.
    pub lifetime: SessionStats,
    pub reported: bool,
}

/// Cloneable handle for pushing user input into a session.
#[derive(Debug, Clone)]
pub struct GameInput {
    tx: mpsc::UnboundedSender<GameEvent>,
}

impl GameInput {
    /// Queue a guess. Returns false once the session is gone.
    #[must_use]
    pub fn send(&self, guess: Guess) -> bool {
        self.tx.send(GameEvent::Guess(guess)).is_ok()
    }

    #[must_use]
    pub fn pick(&self, party: Party) -> bool {
        self.send(Guess::Pick(party))
    }

    #[must_use]
    pub fn swipe(&self, dx: f32) -> bool {
        self.send(Guess::Swipe(dx))
    }
}

/// Single-writer loop tying the round machine, reveal timer and stats together.
///
/// Input and timer firings are serialized through one queue, so no state is
/// ever touched from two places at once.
pub struct GameSession {
    machine: RoundMachine,
    stats: SessionStatsService,
    tally: SessionStats,
    timer: RevealTimer,
    config: RoundConfig,
    reporter: Option<Arc<dyn ScoreReporter>>,
    tx: mpsc::UnboundedSender<GameEvent>,
    rx: mpsc::UnboundedReceiver<GameEvent>,
    reported: bool,
    finished: bool,
}

impl GameSession {
    #[must_use]
    pub fn new(machine: RoundMachine, stats: SessionStatsService, config: RoundConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            machine,
            stats,
            tally: SessionStats::zero(),
            timer: RevealTimer::idle(),
            config,
            reporter: None,
            tx,
            rx,
            reported: false,
            finished: false,
        }
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ScoreReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    #[must_use]
    pub fn input(&self) -> GameInput {
        GameInput {
            tx: self.tx.clone(),
        }
    }

    #[must_use]
    pub fn machine(&self) -> &RoundMachine {
        &self.machine
    }

    #[must_use]
    pub fn current_subject(&self) -> Option<&Subject> {
        self.machine.current_subject()
    }

    /// All-time stats, including this session.
    #[must_use]
    pub fn lifetime_stats(&self) -> SessionStats {
        self.stats.stats()
    }

    /// Stats for rounds played in this session only.
    #[must_use]
    pub fn session_stats(&self) -> SessionStats {
        self.tally
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Wait for the next queued event.
    pub async fn next_event(&mut self) -> Option<GameEvent> {
        self.rx.recv().await
    }

    /// Take a queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<GameEvent> {
        self.rx.try_recv().ok()
    }

    /// Apply one event.
    ///
    /// An accepted guess is recorded with the stats tracker before this returns,
    /// and the reveal timer is armed to advance this exact round.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for input rejected by the round machine; nothing
    /// changes in that case.
    pub async fn handle(&mut self, event: GameEvent) -> Result<SessionUpdate, SessionError> {
        if self.finished {
            return Ok(SessionUpdate::Ignored);
        }

        match event {
            GameEvent::Guess(guess) => {
                let Some(result) = self.machine.submit(guess)? else {
                    return Ok(SessionUpdate::Ignored);
                };

                let update = self.stats.record_result(&result).await;
                self.tally = self.tally.apply(&result);
                self.arm_reveal_timer();

                Ok(SessionUpdate::Resolved { result, update })
            }
            GameEvent::Advance { round } => {
                if self.machine.advance(round) {
                    Ok(SessionUpdate::Advanced {
                        round: self.machine.round(),
                    })
                } else {
                    log::trace!("dropping stale advance for round {round}");
                    Ok(SessionUpdate::Ignored)
                }
            }
        }
    }

    /// Zero the persisted all-time stats. The current session tally is kept.
    pub async fn reset_stats(&mut self) -> StatsUpdate {
        self.stats.reset().await
    }

    /// End the session: stop the timer and report this session's accuracy once.
    ///
    /// Nothing is reported when no round was played or no reporter is set.
    /// Calling again returns the recap without reporting twice.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the report was attempted and failed. The
    /// session is still finished.
    pub async fn finish(&mut self) -> Result<SessionRecap, ReportError> {
        self.finished = true;
        self.timer.cancel();

        if !self.reported && self.tally.total_seen() > 0 {
            if let Some(reporter) = self.reporter.as_ref() {
                let accuracy = f64::from(self.tally.accuracy_percent());
                reporter
                    .report(accuracy)
                    .await
                    .inspect_err(|err| log::warn!("failed to report session score: {err}"))?;
                self.reported = true;
                log::info!("reported session accuracy {accuracy}%");
            }
        }

        Ok(self.recap())
    }

    #[must_use]
    pub fn recap(&self) -> SessionRecap {
        SessionRecap {
            session: self.tally,
            lifetime: self.stats.stats(),
            reported: self.reported,
        }
    }

    fn arm_reveal_timer(&mut self) {
        let round = self.machine.round();
        let tx = self.tx.clone();
        self.timer.schedule(self.config.reveal_dwell, move || {
            // The receiver is gone once the session is dropped.
            let _ = tx.send(GameEvent::Advance { round });
        });
    }
}
