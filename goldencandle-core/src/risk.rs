//! Risk gate: account and market checks that must all pass before a new entry.
//!
//! Checks run independently and every failure is reported:
//! - ladder not paused
//! - account metrics finite, with a positive balance
//! - margin level >= minimum (passes when no margin is in use)
//! - drawdown from peak balance <= maximum
//! - loss against the day's starting balance <= maximum
//! - spread <= maximum points
//!
//! A blocked entry never touches positions that are already open.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::RiskSettings;
use crate::domain::{AccountSnapshot, MarketQuote};

/// Closed-trade profits kept for reporting.
pub const PROFIT_HISTORY_CAPACITY: usize = 100;

/// One failed risk check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum RiskBreach {
    #[error("trading is paused")]
    Paused,

    #[error("account snapshot has non-finite or out-of-range metrics")]
    InvalidAccount,

    #[error("margin level {level:.1}% is below {minimum}%")]
    MarginLevel { level: f64, minimum: f64 },

    #[error("drawdown {drawdown_pct:.2}% exceeds {max}%")]
    Drawdown { drawdown_pct: f64, max: f64 },

    #[error("daily loss {loss_pct:.2}% exceeds {max}%")]
    DailyLoss { loss_pct: f64, max: f64 },

    #[error("spread {spread} points exceeds {max}")]
    Spread { spread: u32, max: u32 },
}

/// Entry refused by the risk gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("entry blocked: {}", .breaches.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct RiskViolation {
    pub breaches: Vec<RiskBreach>,
}

/// Balance history the gate tracks between ticks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskState {
    /// First balance the gate observed.
    pub initial_balance: Option<f64>,
    pub daily_start_balance: Option<f64>,
    pub peak_balance: f64,
    /// Largest drawdown percentage seen so far.
    pub worst_drawdown: f64,
    pub profit_history: VecDeque<f64>,
}

#[derive(Debug, Clone)]
pub struct RiskGate {
    limits: RiskSettings,
    state: RiskState,
}

impl RiskGate {
    pub fn new(limits: RiskSettings) -> Self {
        Self {
            limits,
            state: RiskState::default(),
        }
    }

    pub fn limits(&self) -> &RiskSettings {
        &self.limits
    }

    pub fn state(&self) -> &RiskState {
        &self.state
    }

    /// Fold the latest account metrics into the tracked state.
    /// Snapshots failing `AccountSnapshot::is_sane` are ignored.
    pub fn update_state(&mut self, account: &AccountSnapshot) {
        if !account.is_sane() {
            warn!(?account, "account snapshot ignored");
            return;
        }
        if self.state.initial_balance.is_none() {
            self.state.initial_balance = Some(account.balance);
            self.state.daily_start_balance = Some(account.balance);
        }
        self.state.peak_balance = self.state.peak_balance.max(account.balance);
        let drawdown = self.current_drawdown(account.equity);
        self.state.worst_drawdown = self.state.worst_drawdown.max(drawdown);
    }

    /// Reset the daily baseline. Driven by the host's day-boundary detection.
    pub fn on_new_day(&mut self, balance: f64) {
        if !(balance.is_finite() && balance > 0.0) {
            warn!(balance, "daily baseline not reset");
            return;
        }
        info!(
            balance,
            previous = ?self.state.daily_start_balance,
            "new trading day"
        );
        self.state.daily_start_balance = Some(balance);
        if self.state.initial_balance.is_none() {
            self.state.initial_balance = Some(balance);
        }
    }

    /// Append a closed trade's realized profit (bounded history).
    pub fn record_profit(&mut self, profit: f64) {
        if self.state.profit_history.len() == PROFIT_HISTORY_CAPACITY {
            self.state.profit_history.pop_front();
        }
        self.state.profit_history.push_back(profit);
    }

    fn peak(&self) -> f64 {
        self.state
            .peak_balance
            .max(self.state.initial_balance.unwrap_or(0.0))
    }

    /// Drawdown of `equity` from the peak balance, in percent.
    pub fn current_drawdown(&self, equity: f64) -> f64 {
        let peak = self.peak();
        if peak <= 0.0 {
            return 0.0;
        }
        ((peak - equity) / peak * 100.0).max(0.0)
    }

    /// Profit since the day's starting balance.
    pub fn daily_profit(&self, balance: f64) -> f64 {
        self.state
            .daily_start_balance
            .map_or(0.0, |start| balance - start)
    }

    /// Loss against the day's starting balance, in percent.
    pub fn daily_loss_pct(&self, balance: f64) -> f64 {
        match self.state.daily_start_balance {
            Some(start) if start > 0.0 => ((start - balance) / start * 100.0).max(0.0),
            _ => 0.0,
        }
    }

    /// Run every check for a new entry.
    pub fn authorize(
        &self,
        account: &AccountSnapshot,
        quote: &MarketQuote,
        paused: bool,
    ) -> Result<(), RiskViolation> {
        let mut breaches = Vec::new();

        if paused {
            breaches.push(RiskBreach::Paused);
        }

        if !account.is_sane() {
            breaches.push(RiskBreach::InvalidAccount);
        } else {
            if let Some(level) = account.margin_level() {
                if level < self.limits.margin_minimum_pct {
                    breaches.push(RiskBreach::MarginLevel {
                        level,
                        minimum: self.limits.margin_minimum_pct,
                    });
                }
            }

            let drawdown_pct = self.current_drawdown(account.equity);
            if drawdown_pct > self.limits.max_drawdown_pct {
                breaches.push(RiskBreach::Drawdown {
                    drawdown_pct,
                    max: self.limits.max_drawdown_pct,
                });
            }

            let loss_pct = self.daily_loss_pct(account.balance);
            if loss_pct > self.limits.max_daily_loss_pct {
                breaches.push(RiskBreach::DailyLoss {
                    loss_pct,
                    max: self.limits.max_daily_loss_pct,
                });
            }
        }

        if quote.spread_points > self.limits.max_spread_points {
            breaches.push(RiskBreach::Spread {
                spread: quote.spread_points,
                max: self.limits.max_spread_points,
            });
        }

        if breaches.is_empty() {
            Ok(())
        } else {
            let violation = RiskViolation { breaches };
            warn!(%violation, "risk gate");
            Err(violation)
        }
    }
}
