//! Entry, stop-loss and take-profit levels for a directional signal.
//!
//! Buy:  entry = close + offset * point, stop = entry - sl * point
//! Sell: entry = close - offset * point, stop = entry + sl * point
//! Target sits `R:R` stop distances beyond the entry.

use serde::{Deserialize, Serialize};

use crate::config::PricingSettings;
use crate::domain::TradeDirection;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

pub fn price_levels(
    direction: TradeDirection,
    close: f64,
    point: f64,
    pricing: &PricingSettings,
    risk_reward: f64,
) -> PriceLevels {
    let sign = direction.sign();
    let entry = close + sign * pricing.entry_offset_points * point;
    let stop_loss = entry - sign * pricing.stop_loss_points * point;
    let take_profit = entry + sign * (entry - stop_loss).abs() * risk_reward;
    PriceLevels {
        entry,
        stop_loss,
        take_profit,
    }
}
