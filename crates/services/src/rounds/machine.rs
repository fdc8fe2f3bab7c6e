use std::fmt;

use guess_core::model::{Guess, RoundResult, Subject, SwipeThreshold};

use crate::Clock;
use crate::catalog::Catalog;
use crate::error::SessionError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where the current round is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundState {
    /// No subjects loaded; all input is rejected.
    AwaitingData,
    /// The current subject is shown and a guess is accepted.
    Presenting,
    /// The guess was taken and the answer is being revealed.
    Resolved(RoundResult),
}

//
// ─── MACHINE ───────────────────────────────────────────────────────────────────
//

/// Presentation → commit → reveal → advance over a fixed catalog order.
///
/// Rounds are numbered from 1. Advancing past the last subject wraps to the first.
pub struct RoundMachine {
    catalog: Catalog,
    position: usize,
    round: u64,
    resolved: u64,
    state: RoundState,
    threshold: SwipeThreshold,
    clock: Clock,
}

impl RoundMachine {
    #[must_use]
    pub fn new(catalog: Catalog, clock: Clock) -> Self {
        let mut machine = Self::awaiting(clock);
        machine.load(catalog);
        machine
    }

    /// Machine with no catalog yet.
    #[must_use]
    pub fn awaiting(clock: Clock) -> Self {
        Self {
            catalog: Catalog::default(),
            position: 0,
            round: 0,
            resolved: 0,
            state: RoundState::AwaitingData,
            threshold: SwipeThreshold::default(),
            clock,
        }
    }

    #[must_use]
    pub fn with_swipe_threshold(mut self, threshold: SwipeThreshold) -> Self {
        self.threshold = threshold;
        self
    }

    /// Install a catalog and start presenting its first subject.
    ///
    /// Bumps the round number so any advance scheduled for the old catalog is stale.
    pub fn load(&mut self, catalog: Catalog) {
        self.catalog = catalog;
        self.position = 0;
        if self.catalog.is_empty() {
            self.state = RoundState::AwaitingData;
        } else {
            self.round += 1;
            self.state = RoundState::Presenting;
        }
    }

    #[must_use]
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    #[must_use]
    pub fn is_presenting(&self) -> bool {
        matches!(self.state, RoundState::Presenting)
    }

    /// Current round number; 0 before any catalog was loaded.
    #[must_use]
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Number of rounds resolved by this machine.
    #[must_use]
    pub fn rounds_played(&self) -> u64 {
        self.resolved
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn current_subject(&self) -> Option<&Subject> {
        match self.state {
            RoundState::AwaitingData => None,
            _ => self.catalog.get_wrapped(self.position),
        }
    }

    /// Offer a guess for the current round.
    ///
    /// Returns `Ok(None)` when the input does not resolve the round: the round is
    /// already resolved, or a swipe was released inside the threshold.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::DataUnavailable` before a catalog is loaded and
    /// `SessionError::InvalidGuess` for a non-finite swipe. State is unchanged.
    pub fn submit(&mut self, guess: Guess) -> Result<Option<RoundResult>, SessionError> {
        match self.state {
            RoundState::AwaitingData => return Err(SessionError::DataUnavailable),
            RoundState::Resolved(_) => {
                log::trace!("ignoring {guess:?} during reveal of round {}", self.round);
                return Ok(None);
            }
            RoundState::Presenting => {}
        }

        let Some(party) = guess.resolve(self.threshold)? else {
            return Ok(None);
        };
        let subject = self
            .catalog
            .get_wrapped(self.position)
            .ok_or(SessionError::DataUnavailable)?;

        let result = RoundResult::resolve(subject, party, self.clock.now());
        self.state = RoundState::Resolved(result.clone());
        self.resolved += 1;
        Ok(Some(result))
    }

    /// Move to the next subject if `round` is the round currently being revealed.
    ///
    /// Returns false, without changing anything, for stale or early advances.
    pub fn advance(&mut self, round: u64) -> bool {
        if round != self.round || !matches!(self.state, RoundState::Resolved(_)) {
            return false;
        }
        self.position = (self.position + 1) % self.catalog.len();
        self.round += 1;
        self.state = RoundState::Presenting;
        true
    }
}

impl fmt::Debug for RoundMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoundMachine")
            .field("catalog_len", &self.catalog.len())
            .field("position", &self.position)
            .field("round", &self.round)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use guess_core::model::{Party, SubjectId};
    use guess_core::time::fixed_clock;

    fn subject(id: u64, party: Party) -> Subject {
        Subject::parse(
            SubjectId::new(id),
            format!("Subject {id}"),
            "https://example.org/s.jpg",
            party,
        )
        .unwrap()
    }

    fn machine() -> RoundMachine {
        let catalog = Catalog::new(vec![
            subject(1, Party::Democrat),
            subject(2, Party::Republican),
            subject(3, Party::Democrat),
        ]);
        RoundMachine::new(catalog, fixed_clock())
    }

    #[test]
    fn empty_catalog_awaits_data_and_rejects_input() {
        let mut machine = RoundMachine::new(Catalog::default(), fixed_clock());
        assert_eq!(machine.state(), &RoundState::AwaitingData);
        assert!(machine.current_subject().is_none());
        assert!(matches!(
            machine.submit(Guess::Pick(Party::Democrat)),
            Err(SessionError::DataUnavailable)
        ));
        assert!(!machine.advance(0));
        assert_eq!(machine.state(), &RoundState::AwaitingData);
    }

    #[test]
    fn accepted_guess_produces_one_result() {
        let mut machine = machine();
        assert_eq!(machine.round(), 1);
        let result = machine
            .submit(Guess::Pick(Party::Democrat))
            .unwrap()
            .expect("resolved");
        assert!(result.is_correct());
        assert_eq!(result.subject_id(), SubjectId::new(1));
        assert_eq!(machine.state(), &RoundState::Resolved(result));
        assert_eq!(machine.rounds_played(), 1);
    }

    #[test]
    fn guesses_during_reveal_are_ignored() {
        let mut machine = machine();
        machine.submit(Guess::Pick(Party::Republican)).unwrap();
        let before = machine.state().clone();

        assert_eq!(machine.submit(Guess::Pick(Party::Democrat)).unwrap(), None);
        assert_eq!(machine.submit(Guess::Swipe(-500.0)).unwrap(), None);
        assert_eq!(machine.state(), &before);
        assert_eq!(machine.rounds_played(), 1);
    }

    #[test]
    fn short_swipe_leaves_round_presenting() {
        let mut machine = machine();
        assert_eq!(machine.submit(Guess::Swipe(40.0)).unwrap(), None);
        assert!(machine.is_presenting());

        let result = machine.submit(Guess::Swipe(-150.0)).unwrap().unwrap();
        assert_eq!(result.guessed(), Party::Democrat);
    }

    #[test]
    fn non_finite_swipe_is_rejected_without_mutation() {
        let mut machine = machine();
        assert!(matches!(
            machine.submit(Guess::Swipe(f32::NAN)),
            Err(SessionError::InvalidGuess(_))
        ));
        assert!(machine.is_presenting());
        assert_eq!(machine.rounds_played(), 0);
    }

    #[test]
    fn advance_only_applies_to_current_resolved_round() {
        let mut machine = machine();
        assert!(!machine.advance(1), "cannot advance while presenting");

        machine.submit(Guess::Pick(Party::Democrat)).unwrap();
        assert!(!machine.advance(0), "stale round number");
        assert!(machine.advance(1));
        assert_eq!(machine.round(), 2);
        assert_eq!(machine.current_subject().map(Subject::id), Some(SubjectId::new(2)));
        assert!(!machine.advance(1), "already advanced");
    }

    #[test]
    fn catalog_order_wraps_around() {
        let mut machine = machine();
        let mut seen = Vec::new();
        for _ in 0..7 {
            seen.push(machine.current_subject().unwrap().id().value());
            let round = machine.round();
            machine.submit(Guess::Pick(Party::Democrat)).unwrap();
            assert!(machine.advance(round));
        }
        assert_eq!(seen, vec![1, 2, 3, 1, 2, 3, 1]);
        assert_eq!(machine.rounds_played(), 7);
    }

    #[test]
    fn loading_a_catalog_invalidates_pending_advance() {
        let mut machine = RoundMachine::awaiting(fixed_clock());
        machine.load(Catalog::new(vec![subject(9, Party::Republican)]));
        assert!(machine.is_presenting());
        machine.submit(Guess::Pick(Party::Republican)).unwrap();
        let pending = machine.round();

        machine.load(Catalog::new(vec![subject(10, Party::Democrat)]));
        assert!(!machine.advance(pending));
        assert_eq!(machine.current_subject().map(Subject::id), Some(SubjectId::new(10)));
    }
}
