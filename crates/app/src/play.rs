use std::sync::Arc;
use std::time::Duration;

use guess_core::model::{Guess, Party, RoundResult, SessionStats, Subject, SwipeThreshold};
use services::{
    Catalog, Clock, DistributionService, GameSession, HttpScoreReporter, LoadOutcome, RoundConfig,
    RoundMachine, ScoreReporter, SessionStatsService, SessionUpdate, load_catalog_json,
};
use storage::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::PlayArgs;

/// One line of terminal input.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Input {
    Guess(Guess),
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => Some(Input::Quit),
        "left" | "a" => Some(Input::Guess(Guess::Pick(Party::Democrat))),
        "right" | "b" => Some(Input::Guess(Guess::Pick(Party::Republican))),
        other => match other.parse::<Party>() {
            Ok(party) => Some(Input::Guess(Guess::Pick(party))),
            Err(_) => other.parse::<f32>().ok().map(|dx| Input::Guess(Guess::Swipe(dx))),
        },
    }
}

pub async fn run(args: PlayArgs, storage: Storage, store_timeout: Duration) -> anyhow::Result<()> {
    let subjects = load_catalog_json(&args.catalog).await?;
    anyhow::ensure!(
        !subjects.is_empty(),
        "catalog {} has no playable subjects",
        args.catalog.display()
    );

    let clock = Clock::system();
    let mut stats =
        SessionStatsService::new(storage.stats.clone(), clock).with_timeout(store_timeout);
    match stats.load().await {
        LoadOutcome::Restored => log::info!("restored lifetime stats"),
        LoadOutcome::Missing => log::info!("no saved stats, starting fresh"),
        LoadOutcome::Discarded => log::warn!("saved stats were unusable, starting fresh"),
        LoadOutcome::Unavailable => log::warn!("saved stats could not be read, will retry"),
    }

    let threshold = SwipeThreshold::new(args.swipe_threshold)?;
    let machine = RoundMachine::new(Catalog::shuffled(subjects, args.seed), clock)
        .with_swipe_threshold(threshold);
    let config = RoundConfig {
        reveal_dwell: Duration::from_millis(args.reveal_ms),
    };

    let reporter: Arc<dyn ScoreReporter> = match args.server.as_deref() {
        Some(url) => Arc::new(HttpScoreReporter::new(url, store_timeout)?),
        None => Arc::new(
            DistributionService::new(storage.counters.clone()).with_timeout(store_timeout),
        ),
    };

    let mut session = GameSession::new(machine, stats, config).with_reporter(reporter);
    println!("Guess the party: [d]emocrat or left, [r]epublican or right.");
    println!("A swipe distance like -150 also works. q quits.");
    if rounds_done(args.rounds, 0) {
        println!("No rounds to play.");
    } else {
        present(session.current_subject(), session.machine().round());
        play_rounds(&mut session, args.rounds).await?;
    }

    match session.finish().await {
        Ok(recap) => {
            println!("This session: {}", summary(recap.session));
            println!("All time:     {}", summary(recap.lifetime));
            if recap.reported {
                println!("Score submitted.");
            }
        }
        Err(err) => {
            let recap = session.recap();
            println!("This session: {}", summary(recap.session));
            println!("Score not submitted: {err}");
        }
    }
    Ok(())
}

/// True once `played` rounds satisfy the optional `--rounds` limit.
fn rounds_done(limit: Option<u32>, played: u32) -> bool {
    limit.is_some_and(|limit| played >= limit)
}

/// Read stdin and drive the session until quit, end of input, or the round limit.
async fn play_rounds(session: &mut GameSession, limit: Option<u32>) -> anyhow::Result<()> {
    let input = session.input();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    Some(Input::Quit) => break,
                    Some(Input::Guess(guess)) => {
                        if !input.send(guess) {
                            log::warn!("session stopped accepting input");
                            break;
                        }
                    }
                    None => println!("?? try d, r, a number, or q"),
                }
            }
            Some(event) = session.next_event() => {
                match session.handle(event).await {
                    Ok(SessionUpdate::Resolved { result, update }) => {
                        reveal(&result, update.stats);
                        if let Some(err) = update.persist_error {
                            println!("(stats not saved: {err})");
                        }
                    }
                    Ok(SessionUpdate::Advanced { round }) => {
                        if rounds_done(limit, session.session_stats().total_seen()) {
                            break;
                        }
                        present(session.current_subject(), round);
                    }
                    Ok(SessionUpdate::Ignored) => {}
                    Err(err) => println!("{err}"),
                }
            }
        }
    }
    Ok(())
}

fn present(subject: Option<&Subject>, round: u64) {
    let Some(subject) = subject else {
        return;
    };
    let mut detail = Vec::new();
    if let Some(office) = subject.office() {
        detail.push(format!("{office:?}"));
    }
    if let Some(state) = subject.state() {
        detail.push(state.to_owned());
    }
    if detail.is_empty() {
        println!("\nRound {round}: {}", subject.name());
    } else {
        println!("\nRound {round}: {} ({})", subject.name(), detail.join(", "));
    }
    println!("  {}", subject.image());
}

fn reveal(result: &RoundResult, stats: SessionStats) {
    let verdict = if result.is_correct() { "Correct" } else { "Wrong" };
    println!("{verdict}! {}. {}", result.actual(), summary(stats));
}

pub fn summary(stats: SessionStats) -> String {
    format!(
        "{}/{} correct ({}%), streak {}, best {}",
        stats.total_correct(),
        stats.total_seen(),
        stats.accuracy_percent(),
        stats.current_streak(),
        stats.best_streak()
    )
}
