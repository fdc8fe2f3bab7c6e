mod machine;
mod timer;
mod workflow;

// Public API of the round subsystem.
pub use crate::error::SessionError;
pub use machine::{RoundMachine, RoundState};
pub use timer::RevealTimer;
pub use workflow::{
    DEFAULT_REVEAL_DWELL, GameEvent, GameInput, GameSession, RoundConfig, SessionRecap,
    SessionUpdate,
};
