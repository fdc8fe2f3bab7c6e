use std::path::PathBuf;
use std::sync::Arc;

use guess_core::model::SessionStats;
use guess_core::time::fixed_now;
use storage::repository::{CounterStore, STATS_SCHEMA_VERSION, SessionStatsRepository, StatsRecord};
use storage::sqlite::SqliteRepository;

fn temp_db(name: &str) -> String {
    let path: PathBuf = std::env::temp_dir().join(format!(
        "guess-storage-{name}-{}.sqlite3",
        std::process::id()
    ));
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
    format!("sqlite://{}?mode=rwc", path.display())
}

async fn open(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&temp_db(name))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrips_stats_snapshot() {
    let repo = open("stats").await;
    assert!(repo.load_stats().await.unwrap().is_none());

    let stats = SessionStats::from_persisted(11, 10, 0, 10).unwrap();
    repo.save_stats(&StatsRecord::from_stats(&stats, fixed_now()))
        .await
        .unwrap();

    let loaded = repo.load_stats().await.unwrap().expect("row present");
    assert_eq!(loaded.schema_version, STATS_SCHEMA_VERSION);
    assert_eq!(loaded.saved_at, fixed_now());
    assert_eq!(loaded.into_stats().unwrap(), stats);

    // Overwrite with a reset snapshot.
    repo.save_stats(&StatsRecord::from_stats(&SessionStats::zero(), fixed_now()))
        .await
        .unwrap();
    let loaded = repo.load_stats().await.unwrap().unwrap();
    assert_eq!(loaded.into_stats().unwrap(), SessionStats::zero());
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = open("migrate").await;
    repo.migrate().await.expect("second migrate");
    repo.incr("k").await.unwrap();
    repo.migrate().await.expect("third migrate");
    assert_eq!(repo.get("k").await.unwrap(), 1);
}

#[tokio::test]
async fn sqlite_counters_increment_and_multi_get_in_order() {
    let repo = open("counters").await;
    assert_eq!(repo.get("stats:total_games").await.unwrap(), 0);
    assert_eq!(repo.incr("stats:accuracy:50").await.unwrap(), 1);
    assert_eq!(repo.incr("stats:accuracy:50").await.unwrap(), 2);
    assert_eq!(repo.incr("stats:accuracy:90").await.unwrap(), 1);

    let keys: Vec<String> = ["stats:accuracy:90", "stats:accuracy:0", "stats:accuracy:50"]
        .iter()
        .map(|k| (*k).to_string())
        .collect();
    assert_eq!(repo.get_many(&keys).await.unwrap(), vec![1, 0, 2]);
    assert!(repo.get_many(&[]).await.unwrap().is_empty());
    repo.ping().await.unwrap();
}

#[tokio::test]
async fn sqlite_concurrent_increments_are_not_lost() {
    let repo = Arc::new(open("concurrent").await);
    let tasks: Vec<_> = (0..40)
        .map(|_| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move { repo.incr("stats:total_games").await })
        })
        .collect();
    for task in tasks {
        task.await.expect("join").expect("incr");
    }
    assert_eq!(repo.get("stats:total_games").await.unwrap(), 40);
}
