//! Per-tick input and the report handed back to the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{AccountSnapshot, Candle, MarketQuote, PositionId};
use crate::error::InsufficientHistory;
use crate::indicators::{CrossoverReading, TrendReading};
use crate::ledger::{OpenRejection, PositionEvent, PositionRecord};
use crate::pattern::PatternVerdict;
use crate::signals::Signal;

use super::command::CommandOutcome;

/// Everything the host supplies on one call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub candle: Candle,
    pub account: AccountSnapshot,
    pub quote: MarketQuote,
    /// First tick of a new trading day (see `DayBoundary`).
    #[serde(default)]
    pub new_day: bool,
}

/// Why a tick was refused before evaluation. Nothing but commands is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TickRejection {
    #[error("candle fails the OHLC sanity check")]
    InsaneCandle,

    #[error("candle at {at} is not after the latest candle at {latest}")]
    OutOfOrder {
        at: DateTime<Utc>,
        latest: DateTime<Utc>,
    },

    #[error("account snapshot has non-finite or out-of-range metrics")]
    InvalidAccount,

    #[error("quote point must be finite and > 0")]
    InvalidQuote,
}

/// What the engine did with this tick's signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", content = "detail", rename_all = "snake_case")]
pub enum Decision {
    /// No actionable signal.
    None,
    Opened(PositionId),
    Blocked(OpenRejection),
    /// Suppressed by `IgnoreCurrentAlert`.
    Ignored,
}

/// Ladder and risk state exposed after every tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub level: usize,
    pub lot_size: f64,
    pub risk_reward: f64,
    pub paused: bool,
    pub pending_skip_level: Option<usize>,
    pub worst_drawdown: f64,
    pub current_drawdown: f64,
    pub daily_profit: f64,
    pub open_positions: Vec<PositionRecord>,
    pub config_fingerprint: String,
}

/// Full result of one `Engine::on_tick` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub timestamp: DateTime<Utc>,
    pub commands: Vec<CommandOutcome>,
    /// Set when the tick's inputs were refused and nothing was evaluated.
    pub rejected: Option<TickRejection>,
    pub trend: Option<TrendReading>,
    pub crossover: Option<CrossoverReading>,
    pub pattern: Option<PatternVerdict>,
    pub signal: Signal,
    /// Set when the signal could not be evaluated yet.
    pub not_evaluable: Option<InsufficientHistory>,
    pub decision: Decision,
    pub events: Vec<PositionEvent>,
    pub snapshot: EngineSnapshot,
}
