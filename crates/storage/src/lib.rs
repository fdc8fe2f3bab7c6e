#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    CounterStore, InMemoryRepository, STATS_SCHEMA_VERSION, SessionStatsRepository, StatsRecord,
    Storage, StorageError,
};
