mod cli;
mod play;

use std::time::Duration;

use clap::Parser;
use server::ServerConfig;
use services::{Clock, DistributionService, LoadOutcome, SessionStatsService};
use storage::Storage;

use crate::cli::{Cli, Command};

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    // Stderr keeps the game's stdout clean.
    simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let store_timeout = Duration::from_millis(cli.store_timeout_ms);

    // Open + migrate SQLite at startup; the library crates never touch the filesystem layout.
    cli::prepare_sqlite_file(&cli.db_url)?;
    let storage = Storage::sqlite(&cli.db_url).await?;

    match cli.command {
        Command::Serve { bind, workers } => {
            let service =
                DistributionService::new(storage.counters.clone()).with_timeout(store_timeout);
            server::run(ServerConfig { bind_addr: bind, workers }, service).await?;
        }
        Command::Play(args) => play::run(args, storage, store_timeout).await?,
        Command::Stats => {
            let mut stats = SessionStatsService::new(storage.stats.clone(), Clock::system())
                .with_timeout(store_timeout);
            if stats.load().await == LoadOutcome::Unavailable {
                anyhow::bail!("stored stats could not be read");
            }
            println!("{}", play::summary(stats.stats()));
        }
        Command::Reset => {
            let mut stats = SessionStatsService::new(storage.stats.clone(), Clock::system())
                .with_timeout(store_timeout);
            let update = stats.reset().await;
            if let Some(err) = update.persist_error {
                anyhow::bail!("failed to reset stats: {err}");
            }
            println!("Stats reset.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_logging(cli.verbose) {
        eprintln!("logging disabled: {err}");
    }
    if let Err(err) = run(cli).await {
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}
