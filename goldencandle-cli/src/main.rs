//! Golden Candle CLI: config checks and candle-file replay.
//!
//! Commands:
//! - `init`: print the default configuration as TOML
//! - `validate`: load a TOML config, report the first problem or its fingerprint
//! - `replay`: stream a CSV of candles through one engine, one JSON report per line
//!
//! `replay` is a feed shim, not a backtester. It reports no performance figures.
//! The host terminal normally supplies the account snapshot. Here a running
//! balance stands in for it: it starts at `--balance` and moves only by the P&L of
//! positions the ledger closes, so the risk gate has something to check.
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries only JSON.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use goldencandle_core::domain::{AccountSnapshot, Candle, MarketQuote};
use goldencandle_core::engine::{DayBoundary, Decision, Engine, Tick};
use goldencandle_core::ledger::PositionEvent;
use goldencandle_core::EngineConfig;

#[derive(Parser)]
#[command(
    name = "goldencandle",
    about = "Golden candle signal and progression engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the default configuration as TOML.
    Init,
    /// Validate a TOML config file.
    Validate {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
    /// Replay a CSV candle file through the engine.
    Replay {
        /// CSV with columns timestamp,open,high,low,close,tick_volume,spread.
        #[arg(long)]
        candles: PathBuf,

        /// Path to a TOML config file. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Starting balance of the stand-in account.
        #[arg(long, default_value_t = 10_000.0)]
        balance: f64,

        /// Price value of one point.
        #[arg(long, default_value_t = 0.01)]
        point: f64,

        /// Stand-in account currency per unit of price move per lot.
        #[arg(long, default_value_t = 1.0)]
        contract_size: f64,

        /// Only print ticks with a signal or a position event.
        #[arg(long, default_value_t = false)]
        signals_only: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => run_init(),
        Commands::Validate { config } => run_validate(&config),
        Commands::Replay {
            candles,
            config,
            balance,
            point,
            contract_size,
            signals_only,
        } => run_replay(
            &candles,
            config.as_deref(),
            balance,
            point,
            contract_size,
            signals_only,
        ),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("invalid config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

// ─── init ────────────────────────────────────────────────────────────

fn run_init() -> Result<()> {
    let toml = EngineConfig::default().to_toml()?;
    print!("{toml}");
    Ok(())
}

// ─── validate ────────────────────────────────────────────────────────

fn run_validate(path: &Path) -> Result<()> {
    let config = load_config(Some(path))?;
    println!("OK  {}", path.display());
    println!("  fingerprint: {}", config.fingerprint());
    println!(
        "  ladder: {} levels, lots {:?}, R:R {:?}",
        config.money.lot_table.len(),
        config.money.lot_table,
        config.money.rr_table
    );
    Ok(())
}

// ─── replay ──────────────────────────────────────────────────────────

fn run_replay(
    candles_path: &Path,
    config_path: Option<&Path>,
    balance: f64,
    point: f64,
    contract_size: f64,
    signals_only: bool,
) -> Result<()> {
    if !(balance > 0.0) {
        bail!("--balance must be > 0 (got {balance})");
    }
    if !(point > 0.0) {
        bail!("--point must be > 0 (got {point})");
    }

    let config = load_config(config_path)?;
    let mut engine = Engine::new(config)?;
    let mut reader = csv::Reader::from_path(candles_path)
        .with_context(|| format!("open {}", candles_path.display()))?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut day = DayBoundary::new();
    // stand-in for the host's account
    let mut balance = balance;
    let mut ticks = 0usize;

    for (row, record) in reader.deserialize::<Candle>().enumerate() {
        let candle = match record {
            Ok(candle) => candle,
            Err(e) => {
                warn!(row = row + 1, error = %e, "skipping unreadable row");
                continue;
            }
        };

        let tick = Tick {
            candle,
            account: AccountSnapshot::flat(balance),
            quote: MarketQuote::from_close(candle.close, point, candle.spread),
            new_day: day.observe(candle.timestamp),
        };
        let report = engine.on_tick(&tick, &[]);
        ticks += 1;

        for event in &report.events {
            if let PositionEvent::Closed(position) = event {
                balance += position.profit * contract_size;
            }
        }

        let interesting = report.signal.is_actionable()
            || !report.events.is_empty()
            || report.decision != Decision::None;
        if !signals_only || interesting {
            serde_json::to_writer(&mut out, &report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    if ticks == 0 {
        bail!("no candles read from {}", candles_path.display());
    }

    info!(ticks, "replay finished");
    Ok(())
}
