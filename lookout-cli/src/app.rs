use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lookout_alerts::Direction;
use lookout_config::Settings;
use lookout_core::{RuleId, Symbol, UserId};
use lookout_indicators::analyze;
use rust_decimal::Decimal;
use tracing::warn;

use crate::live::{self, ShutdownSignal};
use crate::sinks::LogSink;
use crate::state::EngineState;
use crate::telemetry;

#[derive(Parser)]
#[command(name = "lookout", version, about = "Market indicator and alert engine")]
struct Cli {
    /// Path to a TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the polling engine until interrupted.
    Run,
    /// Fetch the current price and print an indicator snapshot.
    Analyze {
        /// Instrument ticker, e.g. BTC.
        symbol: String,
    },
    /// Manage price alert rules.
    Alerts {
        #[command(subcommand)]
        command: AlertsCommand,
    },
}

#[derive(Subcommand)]
enum AlertsCommand {
    /// Create a rule: fire when the price crosses the threshold.
    Add {
        user: i64,
        symbol: String,
        /// `above` or `below`.
        direction: String,
        threshold: Decimal,
    },
    /// List a user's rules.
    List { user: i64 },
    /// Remove a rule by id.
    Remove { user: i64, id: u64 },
}

/// Entry point for the `lookout` binary.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init();
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;

    match cli.command {
        Command::Run => run_engine(settings).await,
        Command::Analyze { symbol } => analyze_symbol(settings, &symbol).await,
        Command::Alerts { command } => manage_alerts(settings, command),
    }
}

async fn run_engine(settings: Settings) -> Result<()> {
    let state = EngineState::build(settings)?;
    let shutdown = ShutdownSignal::new();

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.trigger();
        }
    });

    live::run(state, &LogSink, shutdown).await
}

async fn analyze_symbol(settings: Settings, ticker: &str) -> Result<()> {
    let config = settings.indicators.to_indicator_config();
    let window = settings.series_capacity;
    let state = EngineState::build(settings)?;
    let symbol = Symbol::from(ticker);

    let point = state
        .feed
        .fetch(&symbol)
        .await
        .with_context(|| format!("fetching price for {symbol}"))?;
    if let Err(err) = state.registry.apply(&point) {
        warn!(%symbol, error = %err, "price rejected at the boundary");
    }

    let snapshot = analyze(&state.registry.snapshot(&symbol, window), &config);
    println!("{symbol}: {}", point.price);
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn manage_alerts(settings: Settings, command: AlertsCommand) -> Result<()> {
    let state = EngineState::build(settings)?;
    match command {
        AlertsCommand::Add {
            user,
            symbol,
            direction,
            threshold,
        } => {
            let direction = Direction::from_str(&direction)
                .map_err(|err| anyhow::anyhow!(err))
                .context("parsing direction")?;
            let id = state
                .book
                .create(UserId(user), Symbol::from(symbol.as_str()), direction, threshold)?;
            println!("created rule {id}");
        }
        AlertsCommand::List { user } => {
            let rules = state.book.list(UserId(user));
            if rules.is_empty() {
                println!("no rules for user {user}");
            }
            for rule in rules {
                println!(
                    "{}  {} {} {}  [{}]",
                    rule.id, rule.symbol, rule.direction, rule.threshold, rule.state
                );
            }
        }
        AlertsCommand::Remove { user, id } => {
            if state.book.remove(UserId(user), RuleId(id))? {
                println!("removed rule {id}");
            } else {
                println!("no rule {id} owned by user {user}");
            }
        }
    }
    Ok(())
}
