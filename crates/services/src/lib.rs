#![forbid(unsafe_code)]

mod bounded;
pub mod catalog;
pub mod distribution_service;
pub mod error;
pub mod reporter;
pub mod rounds;
pub mod stats_service;

pub use guess_core::Clock;

pub use catalog::{Catalog, load_catalog_json, parse_catalog_json, shuffle};
pub use distribution_service::{DistributionService, TOTAL_GAMES_KEY, bucket_key};
pub use error::{CatalogError, DistributionError, ReportError, SessionError};
pub use reporter::{HttpScoreReporter, ScoreReporter};
pub use rounds::{
    DEFAULT_REVEAL_DWELL, GameEvent, GameInput, GameSession, RevealTimer, RoundConfig,
    RoundMachine, RoundState, SessionRecap, SessionUpdate,
};
pub use stats_service::{LoadOutcome, SessionStatsService, StatsUpdate};
