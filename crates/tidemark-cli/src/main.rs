//! Tidemark CLI
//!
//! Replays decoded wrapped-token events through the points engine.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tidemark_core::{format_balance, parse_units, TOKEN_DECIMALS};
use tidemark_indexer::{Indexer, IndexerConfig, LogFormat, MemoryEventLog, TokenEvent};
use tidemark_points::{classify, GlobalStats, MemoryStore, Tier, User};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tidemark")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Tidemark - wrapped-token tier and loyalty points indexer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TIDEMARK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines event file and print the resulting state
    Replay {
        /// Event file, one JSON event per line, in chain order
        events: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a whole-token amount
    Tier {
        /// Amount in whole tokens, e.g. 12.5
        amount: String,
    },

    /// Version information
    Version,
}

fn init_logging(config: &IndexerConfig, verbose: bool) {
    let default_level = if verbose { "debug" } else { config.logging.level.as_str() };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<IndexerConfig> {
    match path {
        Some(path) => IndexerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(IndexerConfig::default()),
    }
}

/// Parse events from JSON lines, rejecting anything out of chain order
fn read_events(reader: impl BufRead) -> anyhow::Result<Vec<TokenEvent>> {
    let mut events: Vec<TokenEvent> = Vec::new();

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let event: TokenEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("line {}: malformed event", n + 1))?;
        if let Some(prev) = events.last() {
            if event.position() <= prev.position() {
                bail!(
                    "line {}: event at {:?} is not after {:?}",
                    n + 1,
                    event.position(),
                    prev.position()
                );
            }
        }
        events.push(event);
    }

    Ok(events)
}

#[derive(Serialize)]
struct ReplaySummary {
    events: usize,
    skipped: usize,
    stats: GlobalStats,
    users: Vec<User>,
}

fn replay(events: &[TokenEvent], config: &IndexerConfig) -> anyhow::Result<ReplaySummary> {
    let indexer = Indexer::new(MemoryStore::new(), MemoryEventLog::new(), config)?;
    let mut skipped = 0;

    for event in events {
        let outcome = indexer
            .handle(event)
            .with_context(|| format!("handling {} {}", event.name(), event.meta().record_id()))?;
        if outcome == tidemark_indexer::HandleOutcome::Skipped {
            skipped += 1;
        }
    }

    tracing::info!(events = events.len(), skipped, "replay complete");

    Ok(ReplaySummary {
        events: events.len(),
        skipped,
        stats: indexer.engine().global_stats()?,
        users: indexer.engine().store().users(),
    })
}

fn print_summary(summary: &ReplaySummary, config: &IndexerConfig) {
    let token = &config.token;
    let stats = &summary.stats;

    println!("Events:        {} ({} skipped)", summary.events, summary.skipped);
    println!("Users:         {}", stats.total_users);
    println!("Points:        {}", stats.total_points);
    println!("Current week:  {}", stats.current_week);
    println!("Last hour:     {}", stats.last_snapshot_hour);
    println!("Tiers:");
    for tier in Tier::ALL {
        println!("  {:<6} {}", tier.name(), stats.tier_histogram.get(tier));
    }
    println!();
    println!("{:<44} {:>24} {:>6} {:>8}", "address", token.symbol, "tier", "points");
    for user in &summary.users {
        println!(
            "{:<44} {:>24} {:>6} {:>8}",
            user.id,
            format_balance(user.balance, token.decimals, token.display_decimals),
            user.tier.index(),
            user.total_points
        );
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Replay { events, json } => {
            let file = std::fs::File::open(&events)
                .with_context(|| format!("opening {}", events.display()))?;
            let parsed = read_events(BufReader::new(file))?;
            tracing::info!(path = %events.display(), count = parsed.len(), "events loaded");

            let summary = replay(&parsed, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary, &config);
            }
        }

        Commands::Tier { amount } => {
            let raw = parse_units(&amount, TOKEN_DECIMALS)?;
            let balance = i128::try_from(raw).context("amount too large")?;
            let tier = classify(balance);

            println!("Amount:       {} {}", amount, config.token.symbol);
            println!("Tier:         {}", tier.index());
            println!("Points/hour:  {}", tier.points_per_hour());
            println!("Weekly cap:   {}", tier.weekly_cap());
        }

        Commands::Version => {
            println!("Tidemark v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
