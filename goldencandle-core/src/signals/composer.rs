//! Combines trend, crossover and pattern readings into one signal.
//!
//! Buy requires all of:
//! - a fresh Up trend (direction Up, not yet continuous)
//! - close above the trend level
//! - a bullish moving-average cross on this bar
//! - a bullish golden candle, unless `require_golden_candle` is off
//!
//! Sell mirrors every condition.

use tracing::info;

use crate::config::{PricingSettings, SignalSettings};
use crate::domain::{Candle, TradeDirection};
use crate::error::InsufficientHistory;
use crate::indicators::{CrossDirection, TrendDirection, TrendReading};
use crate::pattern::PatternVerdict;

use super::pricing::price_levels;
use super::{Signal, SignalType};

/// Detector outputs for the candle under evaluation.
#[derive(Debug, Clone, Copy)]
pub struct SignalInputs<'a> {
    pub candle: &'a Candle,
    pub trend: Result<TrendReading, InsufficientHistory>,
    pub crossover: Result<Option<CrossDirection>, InsufficientHistory>,
    pub pattern: &'a PatternVerdict,
}

/// Ladder sizing at the current level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sizing {
    pub lots: f64,
    pub risk_reward: f64,
    pub point: f64,
}

#[derive(Debug, Clone)]
pub struct SignalComposer {
    settings: SignalSettings,
    pricing: PricingSettings,
}

impl SignalComposer {
    pub fn new(settings: SignalSettings, pricing: PricingSettings) -> Self {
        Self { settings, pricing }
    }

    pub fn settings(&self) -> &SignalSettings {
        &self.settings
    }

    /// Compose the signal for this cycle.
    ///
    /// Fails with `InsufficientHistory` when the trend or the crossover cannot be
    /// evaluated yet; callers treat that as "no signal".
    pub fn compose(
        &self,
        inputs: SignalInputs<'_>,
        sizing: Sizing,
    ) -> Result<Signal, InsufficientHistory> {
        let trend = inputs.trend?;
        let cross = inputs.crossover?;
        let candle = inputs.candle;

        let Some(direction) = self.direction(candle, &trend, cross, inputs.pattern) else {
            return Ok(Signal::none(candle.timestamp));
        };

        let weights = &self.settings.weights;
        let mut confidence = weights.trend + weights.crossover;
        if inputs.pattern.golden().map(|g| g.direction) == Some(direction) {
            confidence += weights.pattern;
        }

        let levels = price_levels(
            direction,
            candle.close,
            sizing.point,
            &self.pricing,
            sizing.risk_reward,
        );
        let signal = Signal {
            signal_type: SignalType::from(direction),
            price: levels.entry,
            stop_loss: levels.stop_loss,
            take_profit: levels.take_profit,
            lots: sizing.lots,
            confidence: confidence.min(1.0),
            timestamp: candle.timestamp,
        };
        info!(
            signal = ?signal.signal_type,
            price = signal.price,
            sl = signal.stop_loss,
            tp = signal.take_profit,
            lots = signal.lots,
            confidence = signal.confidence,
            "signal"
        );
        Ok(signal)
    }

    fn direction(
        &self,
        candle: &Candle,
        trend: &TrendReading,
        cross: Option<CrossDirection>,
        pattern: &PatternVerdict,
    ) -> Option<TradeDirection> {
        if trend.is_continuous {
            return None;
        }
        let direction = match (trend.direction, cross) {
            (TrendDirection::Up, Some(CrossDirection::Bullish)) if candle.close > trend.value => {
                TradeDirection::Buy
            }
            (TrendDirection::Down, Some(CrossDirection::Bearish)) if candle.close < trend.value => {
                TradeDirection::Sell
            }
            _ => return None,
        };
        if self.settings.require_golden_candle
            && pattern.golden().map(|g| g.direction) != Some(direction)
        {
            return None;
        }
        Some(direction)
    }
}
