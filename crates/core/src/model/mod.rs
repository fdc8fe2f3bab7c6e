mod distribution;
mod ids;
mod party;
mod round;
mod session;
mod subject;

pub use distribution::{DECILE_COUNT, Decile, DecileError, Distribution, DistributionEntry};
pub use ids::{ParseIdError, SubjectId};
pub use party::{ParsePartyError, Party};
pub use round::{
    DEFAULT_SWIPE_THRESHOLD, Guess, RoundError, RoundResult, SwipeThreshold,
};
pub use session::{SessionStats, SessionStatsError};
pub use subject::{Office, Subject, SubjectError};
