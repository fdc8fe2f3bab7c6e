use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Guess the party of public figures", long_about = None)]
pub struct Cli {
    /// `SQLite` database holding local stats and score counters.
    #[arg(
        long = "db",
        env = "GUESS_DB_URL",
        default_value = "sqlite://guess.sqlite3",
        value_parser = parse_db_url,
        global = true
    )]
    pub db_url: String,

    /// Upper bound on any single store round trip, in milliseconds.
    #[arg(long, env = "GUESS_STORE_TIMEOUT_MS", default_value_t = 2000, global = true)]
    pub store_timeout_ms: u64,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(about = "Serve the score submission and distribution API")]
    Serve {
        #[arg(long, env = "GUESS_BIND_ADDR", default_value = "127.0.0.1:8080")]
        bind: String,
        #[arg(long, default_value_t = 4)]
        workers: usize,
    },
    #[command(about = "Play rounds in the terminal")]
    Play(PlayArgs),
    #[command(about = "Show lifetime stats")]
    Stats,
    #[command(about = "Zero lifetime stats")]
    Reset,
}

#[derive(Debug, Args)]
pub struct PlayArgs {
    /// JSON catalog of subjects.
    #[arg(long, env = "GUESS_CATALOG")]
    pub catalog: PathBuf,

    /// Report the final score to this server instead of the local counters.
    #[arg(long, env = "GUESS_SERVER_URL")]
    pub server: Option<String>,

    #[arg(long, env = "GUESS_REVEAL_MS", default_value_t = 1500)]
    pub reveal_ms: u64,

    /// Horizontal drag distance that commits a swipe.
    #[arg(long, env = "GUESS_SWIPE_THRESHOLD", default_value_t = 100.0)]
    pub swipe_threshold: f32,

    /// Fixed shuffle seed; random order when absent.
    #[arg(long, env = "GUESS_SEED")]
    pub seed: Option<u64>,

    /// Stop after this many rounds.
    #[arg(long)]
    pub rounds: Option<u32>,
}

fn parse_db_url(raw: &str) -> Result<String, String> {
    if raw.trim().is_empty() {
        return Err("database url must not be empty".to_owned());
    }
    Ok(normalize_sqlite_url(raw))
}

/// Turn bare paths and `sqlite:` urls into absolute `sqlite://` urls.
pub fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path = Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file and its directory exist before connecting.
///
/// # Errors
///
/// Returns an error for a url without a path, or if the file cannot be created.
pub fn prepare_sqlite_file(db_url: &str) -> anyhow::Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow::anyhow!("invalid database url: {db_url}"))?;
    let path = path.split('?').next().unwrap_or(path);
    anyhow::ensure!(!path.is_empty(), "invalid database url: {db_url}");

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}
