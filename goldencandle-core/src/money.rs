//! Progression ladder: staged lot sizes and risk/reward ratios.
//!
//! The ladder holds a current level into two parallel tables. Trade outcomes move
//! it: a loss advances one level (capped at the top), a win resets to level 0, a
//! breakeven close leaves it where it is.
//!
//! # Invariants
//! - `0 <= current_level < lot_table.len()`
//! - `lot_table.len() == rr_table.len()`, both non-empty and at most 25 entries
//! - while paused, every lot size query returns 0

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::MoneySettings;
use crate::error::{CommandError, ConfigError};

/// Realized result of a closed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeOutcome {
    Win,
    Loss,
    Breakeven,
}

impl TradeOutcome {
    pub fn from_profit(profit: f64) -> Self {
        if profit > 0.0 {
            Self::Win
        } else if profit < 0.0 {
            Self::Loss
        } else {
            Self::Breakeven
        }
    }
}

/// A level change (or non-change) caused by an outcome or command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTransition {
    pub from: usize,
    pub to: usize,
}

impl LevelTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Ladder state, mutated only through `ProgressionLadder` operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderState {
    pub current_level: usize,
    pub lot_table: Vec<f64>,
    pub rr_table: Vec<f64>,
    pub paused: bool,
    /// Zero-based level set by the last accepted skip, until the next outcome.
    pub pending_skip_level: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ProgressionLadder {
    state: LadderState,
}

impl ProgressionLadder {
    pub fn new(settings: &MoneySettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            state: LadderState {
                current_level: 0,
                lot_table: settings.lot_table.clone(),
                rr_table: settings.rr_table.clone(),
                paused: false,
                pending_skip_level: None,
            },
        })
    }

    pub fn state(&self) -> &LadderState {
        &self.state
    }

    /// Number of levels.
    pub fn size(&self) -> usize {
        self.state.lot_table.len()
    }

    pub fn level(&self) -> usize {
        self.state.current_level
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    fn clamp(&self, level: usize) -> usize {
        level.min(self.size() - 1)
    }

    /// Lot size for `level` (clamped into the table). Zero while paused.
    pub fn current_lot_size(&self, level: usize) -> f64 {
        if self.state.paused {
            return 0.0;
        }
        self.state.lot_table[self.clamp(level)]
    }

    /// R:R for `level` (clamped into the table). Unaffected by pause.
    pub fn current_risk_reward(&self, level: usize) -> f64 {
        self.state.rr_table[self.clamp(level)]
    }

    /// Lot size at the current level.
    pub fn lot_size(&self) -> f64 {
        self.current_lot_size(self.state.current_level)
    }

    /// R:R at the current level.
    pub fn risk_reward(&self) -> f64 {
        self.current_risk_reward(self.state.current_level)
    }

    /// Stop new exposure. Idempotent; returns whether the flag changed.
    pub fn pause(&mut self) -> bool {
        let changed = !self.state.paused;
        self.state.paused = true;
        if changed {
            info!(level = self.state.current_level, "ladder paused");
        }
        changed
    }

    /// Restore table-driven lot sizes. Idempotent; returns whether the flag changed.
    pub fn resume(&mut self) -> bool {
        let changed = self.state.paused;
        self.state.paused = false;
        if changed {
            info!(level = self.state.current_level, "ladder resumed");
        }
        changed
    }

    /// Jump to the one-based `level`. Out-of-range requests change nothing.
    pub fn skip_to_level(&mut self, level: usize) -> Result<usize, CommandError> {
        if level == 0 || level > self.size() {
            return Err(CommandError::LevelOutOfRange {
                requested: level,
                max: self.size(),
            });
        }
        let from = self.state.current_level;
        self.state.current_level = level - 1;
        self.state.pending_skip_level = Some(level - 1);
        info!(from, to = level - 1, "ladder skip");
        Ok(level - 1)
    }

    /// Move up one level, capped at the top.
    pub fn advance_level(&mut self) -> LevelTransition {
        let from = self.state.current_level;
        self.state.current_level = self.clamp(from + 1);
        self.state.pending_skip_level = None;
        LevelTransition {
            from,
            to: self.state.current_level,
        }
    }

    /// Return to level 0.
    pub fn reset_level(&mut self) -> LevelTransition {
        let from = self.state.current_level;
        self.state.current_level = 0;
        self.state.pending_skip_level = None;
        LevelTransition { from, to: 0 }
    }

    /// Apply the outcome policy: loss advances, win resets, breakeven holds.
    pub fn apply_outcome(&mut self, outcome: TradeOutcome) -> LevelTransition {
        let transition = match outcome {
            TradeOutcome::Loss => self.advance_level(),
            TradeOutcome::Win => self.reset_level(),
            TradeOutcome::Breakeven => {
                self.state.pending_skip_level = None;
                LevelTransition {
                    from: self.state.current_level,
                    to: self.state.current_level,
                }
            }
        };
        info!(
            ?outcome,
            from = transition.from,
            to = transition.to,
            lots = self.lot_size(),
            rr = self.risk_reward(),
            "ladder transition"
        );
        transition
    }
}
