//! The engine: single owner of every detector, the ladder, the risk gate and the
//! ledger. One instance per traded symbol.
//!
//! Per tick, in order:
//! 1. apply operator commands
//! 2. reject insane or out-of-order candles and unusable account or quote
//!    inputs (no state touched)
//! 3. roll the daily baseline and fold account metrics into the risk gate
//! 4. complete and close positions whose stop or target was touched
//! 5. advance trend and crossover state, validate the candle pattern
//! 6. compose the signal and try to open a position

pub mod command;
pub mod day;
pub mod report;

pub use command::{Command, CommandOutcome, CommandStatus};
pub use day::DayBoundary;
pub use report::{Decision, EngineSnapshot, Tick, TickRejection, TickReport};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::domain::{AccountSnapshot, CandleHistory, PositionId};
use crate::error::{CommandError, ConfigError};
use crate::indicators::{CrossoverDetector, TrendDetector};
use crate::ledger::{ClosedPosition, LedgerError, PositionEvent, PositionLedger};
use crate::money::ProgressionLadder;
use crate::pattern::PatternValidator;
use crate::risk::RiskGate;
use crate::signals::{Signal, SignalComposer, SignalInputs, Sizing};

#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    fingerprint: String,
    history: CandleHistory,
    trend: TrendDetector,
    crossover: CrossoverDetector,
    pattern: PatternValidator,
    composer: SignalComposer,
    ladder: ProgressionLadder,
    risk: RiskGate,
    ledger: PositionLedger,
    last_account: Option<AccountSnapshot>,
    /// Survives `reinitialize_indicators`, so the feed can never rewind.
    last_candle_at: Option<DateTime<Utc>>,
    ignore_next_signal: bool,
}

impl Engine {
    /// Validate `config` and build every component. No engine exists on error.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = Self {
            fingerprint: config.fingerprint(),
            history: CandleHistory::new(config.history_capacity),
            trend: TrendDetector::new(config.trend)?,
            crossover: CrossoverDetector::new(config.crossover, config.history_capacity),
            pattern: PatternValidator::new(config.pattern)?,
            composer: SignalComposer::new(config.signal, config.pricing),
            ladder: ProgressionLadder::new(&config.money)?,
            risk: RiskGate::new(config.risk),
            ledger: PositionLedger::new(config.positions),
            last_account: None,
            last_candle_at: None,
            ignore_next_signal: false,
            config,
        };
        info!(
            fingerprint = %engine.fingerprint,
            levels = engine.ladder.size(),
            "engine ready"
        );
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ladder(&self) -> &ProgressionLadder {
        &self.ladder
    }

    pub fn risk(&self) -> &RiskGate {
        &self.risk
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn trend(&self) -> &TrendDetector {
        &self.trend
    }

    pub fn history(&self) -> &CandleHistory {
        &self.history
    }

    /// Apply one command. `Ok(false)` means valid but already in effect.
    pub fn apply_command(&mut self, command: Command) -> Result<bool, CommandError> {
        let result = match command {
            Command::Pause => Ok(self.ladder.pause()),
            Command::Resume => Ok(self.ladder.resume()),
            Command::SkipToLevel(level) => self.ladder.skip_to_level(level).map(|_| true),
            Command::AdjustMinCandleSize(value) => {
                let before = self.pattern.settings().size;
                self.pattern
                    .adjust_min_size(value)
                    .map(|after| after != before)
            }
            Command::IgnoreCurrentAlert => {
                let changed = !self.ignore_next_signal;
                self.ignore_next_signal = true;
                Ok(changed)
            }
        };
        match &result {
            Ok(changed) => info!(?command, changed, "command applied"),
            Err(err) => warn!(?command, %err, "command rejected"),
        }
        result
    }

    /// Process one tick: commands first, then the evaluation cycle.
    pub fn on_tick(&mut self, tick: &Tick, commands: &[Command]) -> TickReport {
        let commands: Vec<CommandOutcome> = commands
            .iter()
            .map(|&command| CommandOutcome::new(command, self.apply_command(command)))
            .collect();
        let candle = tick.candle;

        if let Some(rejection) = self.screen(tick) {
            warn!(at = %candle.timestamp, %rejection, "tick rejected");
            return TickReport {
                timestamp: candle.timestamp,
                commands,
                rejected: Some(rejection),
                trend: None,
                crossover: None,
                pattern: None,
                signal: Signal::none(candle.timestamp),
                not_evaluable: None,
                decision: Decision::None,
                events: Vec::new(),
                snapshot: self.snapshot(),
            };
        }
        self.last_candle_at = Some(candle.timestamp);

        if tick.new_day {
            self.risk.on_new_day(tick.account.balance);
        }
        self.risk.update_state(&tick.account);
        self.last_account = Some(tick.account);

        let mut events = Vec::new();
        for id in self.ledger.update(&candle) {
            match self
                .ledger
                .close_completed(id, candle.timestamp, &mut self.ladder, &mut self.risk)
            {
                Ok(closed) => events.push(PositionEvent::Closed(closed)),
                Err(err) => warn!(%id, %err, "completed position not closed"),
            }
        }

        let previous = self.history.latest().copied();
        self.history.push(candle);
        let trend = self.trend.update(&candle);
        let crossover = self.crossover.update(candle.close);
        let pattern = self
            .pattern
            .validate(&candle, previous.as_ref(), trend.direction);

        let sizing = Sizing {
            lots: self.ladder.lot_size(),
            risk_reward: self.ladder.risk_reward(),
            point: tick.quote.point,
        };
        let composed = self.composer.compose(
            SignalInputs {
                candle: &candle,
                trend: self.trend.evaluable_reading(),
                crossover: self.crossover.crossover(),
                pattern: &pattern,
            },
            sizing,
        );
        let (signal, not_evaluable) = match composed {
            Ok(signal) => (signal, None),
            Err(missing) => (Signal::none(candle.timestamp), Some(missing)),
        };

        let ignore = std::mem::take(&mut self.ignore_next_signal);
        let decision = if !signal.is_actionable() {
            Decision::None
        } else if ignore {
            info!(signal = ?signal.signal_type, "signal ignored by operator");
            Decision::Ignored
        } else {
            match self
                .ledger
                .open(&signal, &self.ladder, &self.risk, &tick.account, &tick.quote)
            {
                Ok(record) => {
                    let id = record.id();
                    events.push(PositionEvent::Opened(record));
                    Decision::Opened(id)
                }
                Err(rejection) => {
                    warn!(%rejection, "entry refused");
                    Decision::Blocked(rejection)
                }
            }
        };

        TickReport {
            timestamp: candle.timestamp,
            commands,
            rejected: None,
            trend: Some(trend),
            crossover: Some(crossover),
            pattern: Some(pattern),
            signal,
            not_evaluable,
            decision,
            events,
            snapshot: self.snapshot(),
        }
    }

    /// Input checks run before any state is touched.
    fn screen(&self, tick: &Tick) -> Option<TickRejection> {
        let candle = &tick.candle;
        if !candle.is_sane() {
            return Some(TickRejection::InsaneCandle);
        }
        if let Some(latest) = self.last_candle_at {
            if candle.timestamp <= latest {
                return Some(TickRejection::OutOfOrder {
                    at: candle.timestamp,
                    latest,
                });
            }
        }
        if !tick.account.is_sane() {
            return Some(TickRejection::InvalidAccount);
        }
        if !tick.quote.is_sane() {
            return Some(TickRejection::InvalidQuote);
        }
        None
    }

    /// Close an open position at a host-supplied price (e.g. a manual exit).
    pub fn close_position(
        &mut self,
        id: PositionId,
        exit_price: f64,
        at: DateTime<Utc>,
    ) -> Result<ClosedPosition, LedgerError> {
        self.ledger
            .close(id, exit_price, at, &mut self.ladder, &mut self.risk)
    }

    /// Ladder and risk state as of the last tick.
    pub fn snapshot(&self) -> EngineSnapshot {
        let ladder = self.ladder.state();
        let (current_drawdown, daily_profit) = match &self.last_account {
            Some(account) => (
                self.risk.current_drawdown(account.equity),
                self.risk.daily_profit(account.balance),
            ),
            None => (0.0, 0.0),
        };
        EngineSnapshot {
            level: ladder.current_level,
            lot_size: self.ladder.lot_size(),
            risk_reward: self.ladder.risk_reward(),
            paused: ladder.paused,
            pending_skip_level: ladder.pending_skip_level,
            worst_drawdown: self.risk.state().worst_drawdown,
            current_drawdown,
            daily_profit,
            open_positions: self.ledger.open_positions().cloned().collect(),
            config_fingerprint: self.fingerprint.clone(),
        }
    }

    /// Re-initialize the indicator state. The next candle seeds a fresh trend.
    /// Ladder, risk and positions are kept.
    pub fn reinitialize_indicators(&mut self) {
        self.history.clear();
        self.trend.reset();
        self.crossover.reset();
        info!("indicator state re-initialized");
    }
}
