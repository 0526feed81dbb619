//! Position ledger: open, track and close positions keyed by id.
//!
//! Opening goes through the risk gate and the position-count policy and sizes the
//! record from the ladder's current level. Each candle re-evaluates open records
//! against their stop and target. Closing reports the realized outcome back to the
//! ladder and the risk gate, then moves the record to a bounded archive.
//!
//! Profit is measured in price units times lots: `(exit - open) * sign * lots`.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::PositionSettings;
use crate::domain::ids::IdGen;
use crate::domain::{AccountSnapshot, Candle, MarketQuote, PositionId, TradeDirection};
use crate::money::{LevelTransition, ProgressionLadder, TradeOutcome};
use crate::risk::{RiskGate, RiskViolation};
use crate::signals::Signal;

/// Closed positions kept for reporting.
pub const ARCHIVE_CAPACITY: usize = 100;

/// Why a position was not opened.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
pub enum OpenRejection {
    #[error("signal carries no direction")]
    NoDirection,

    #[error(transparent)]
    Risk(#[from] RiskViolation),

    #[error("{open} positions already open (limit {max})")]
    PositionLimit { open: usize, max: usize },

    #[error("ladder lot size is zero")]
    ZeroLots,
}

#[derive(Debug, Clone, PartialEq, Serialize, Error)]
pub enum LedgerError {
    #[error("position {0} is not open")]
    UnknownPosition(PositionId),

    #[error("position {0} has no exit price yet")]
    NotComplete(PositionId),
}

/// One tracked position. Fields are read-only outside the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    id: PositionId,
    direction: TradeDirection,
    lots: f64,
    open_price: f64,
    stop_loss: f64,
    take_profit: f64,
    level_at_open: usize,
    opened_at: DateTime<Utc>,
    is_complete: bool,
    is_profit: bool,
    exit_price: Option<f64>,
}

impl PositionRecord {
    pub fn id(&self) -> PositionId {
        self.id
    }

    pub fn direction(&self) -> TradeDirection {
        self.direction
    }

    pub fn lots(&self) -> f64 {
        self.lots
    }

    pub fn open_price(&self) -> f64 {
        self.open_price
    }

    pub fn stop_loss(&self) -> f64 {
        self.stop_loss
    }

    pub fn take_profit(&self) -> f64 {
        self.take_profit
    }

    /// Ladder level when the position opened. Never changes afterwards.
    pub fn level_at_open(&self) -> usize {
        self.level_at_open
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Stop or target has been touched.
    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn is_profit(&self) -> bool {
        self.is_profit
    }

    pub fn exit_price(&self) -> Option<f64> {
        self.exit_price
    }

    /// Realized profit if the position exits at `price`.
    pub fn profit_at(&self, price: f64) -> f64 {
        (price - self.open_price) * self.direction.sign() * self.lots
    }

    /// Check the candle against stop and target. The stop wins when both are touched.
    fn evaluate(&mut self, candle: &Candle) -> bool {
        if self.is_complete {
            return false;
        }
        let exit = match self.direction {
            TradeDirection::Buy if candle.low <= self.stop_loss => Some(self.stop_loss),
            TradeDirection::Buy if candle.high >= self.take_profit => Some(self.take_profit),
            TradeDirection::Sell if candle.high >= self.stop_loss => Some(self.stop_loss),
            TradeDirection::Sell if candle.low <= self.take_profit => Some(self.take_profit),
            _ => None,
        };
        match exit {
            Some(price) => {
                self.is_complete = true;
                self.is_profit = self.profit_at(price) > 0.0;
                self.exit_price = Some(price);
                true
            }
            None => false,
        }
    }
}

/// A finalized position with its outcome and the ladder move it caused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedPosition {
    pub record: PositionRecord,
    pub exit_price: f64,
    pub profit: f64,
    pub outcome: TradeOutcome,
    pub transition: LevelTransition,
    pub closed_at: DateTime<Utc>,
}

/// Lifecycle events reported to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PositionEvent {
    Opened(PositionRecord),
    Closed(ClosedPosition),
}

#[derive(Debug, Clone)]
pub struct PositionLedger {
    policy: PositionSettings,
    ids: IdGen,
    open: BTreeMap<PositionId, PositionRecord>,
    archive: VecDeque<ClosedPosition>,
}

impl PositionLedger {
    pub fn new(policy: PositionSettings) -> Self {
        Self {
            policy,
            ids: IdGen::default(),
            open: BTreeMap::new(),
            archive: VecDeque::with_capacity(ARCHIVE_CAPACITY),
        }
    }

    fn limit(&self) -> usize {
        if self.policy.one_trade_at_a_time {
            1
        } else {
            self.policy.max_positions
        }
    }

    /// Open a position for `signal` at the ladder's current level and size.
    pub fn open(
        &mut self,
        signal: &Signal,
        ladder: &ProgressionLadder,
        risk: &RiskGate,
        account: &AccountSnapshot,
        quote: &MarketQuote,
    ) -> Result<PositionRecord, OpenRejection> {
        let direction = signal.direction().ok_or(OpenRejection::NoDirection)?;
        risk.authorize(account, quote, ladder.is_paused())?;

        let max = self.limit();
        if self.open.len() >= max {
            warn!(open = self.open.len(), max, "position limit reached");
            return Err(OpenRejection::PositionLimit {
                open: self.open.len(),
                max,
            });
        }

        let lots = ladder.lot_size();
        if lots <= 0.0 {
            return Err(OpenRejection::ZeroLots);
        }

        let record = PositionRecord {
            id: self.ids.next_position_id(),
            direction,
            lots,
            open_price: signal.price,
            stop_loss: signal.stop_loss,
            take_profit: signal.take_profit,
            level_at_open: ladder.level(),
            opened_at: signal.timestamp,
            is_complete: false,
            is_profit: false,
            exit_price: None,
        };
        info!(
            id = %record.id,
            ?direction,
            lots,
            price = record.open_price,
            sl = record.stop_loss,
            tp = record.take_profit,
            level = record.level_at_open,
            "position opened"
        );
        self.open.insert(record.id, record.clone());
        Ok(record)
    }

    /// Re-evaluate every open position. Returns the ids completed by this candle.
    pub fn update(&mut self, candle: &Candle) -> Vec<PositionId> {
        self.open
            .values_mut()
            .filter_map(|record| record.evaluate(candle).then_some(record.id))
            .collect()
    }

    /// Finalize position `id` at `exit_price` and report the outcome.
    pub fn close(
        &mut self,
        id: PositionId,
        exit_price: f64,
        closed_at: DateTime<Utc>,
        ladder: &mut ProgressionLadder,
        risk: &mut RiskGate,
    ) -> Result<ClosedPosition, LedgerError> {
        let mut record = self
            .open
            .remove(&id)
            .ok_or(LedgerError::UnknownPosition(id))?;

        let profit = record.profit_at(exit_price);
        let outcome = TradeOutcome::from_profit(profit);
        record.is_complete = true;
        record.is_profit = profit > 0.0;
        record.exit_price = Some(exit_price);

        let transition = ladder.apply_outcome(outcome);
        risk.record_profit(profit);

        let closed = ClosedPosition {
            record,
            exit_price,
            profit,
            outcome,
            transition,
            closed_at,
        };
        info!(
            %id,
            exit_price,
            profit,
            ?outcome,
            level = transition.to,
            "position closed"
        );
        if self.archive.len() == ARCHIVE_CAPACITY {
            self.archive.pop_front();
        }
        self.archive.push_back(closed.clone());
        Ok(closed)
    }

    /// Close a position whose stop or target was touched, at that level.
    pub fn close_completed(
        &mut self,
        id: PositionId,
        closed_at: DateTime<Utc>,
        ladder: &mut ProgressionLadder,
        risk: &mut RiskGate,
    ) -> Result<ClosedPosition, LedgerError> {
        let record = self.open.get(&id).ok_or(LedgerError::UnknownPosition(id))?;
        let exit_price = record.exit_price.ok_or(LedgerError::NotComplete(id))?;
        self.close(id, exit_price, closed_at, ladder, risk)
    }

    pub fn get(&self, id: PositionId) -> Option<&PositionRecord> {
        self.open.get(&id)
    }

    pub fn open_positions(&self) -> impl Iterator<Item = &PositionRecord> {
        self.open.values()
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Most recent closed positions, oldest first.
    pub fn archive(&self) -> &VecDeque<ClosedPosition> {
        &self.archive
    }
}
