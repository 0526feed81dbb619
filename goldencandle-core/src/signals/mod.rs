//! Trade signals: the composed output of one evaluation cycle.
//!
//! A `Signal` is created fresh on every evaluation and never mutated once emitted.
//! A `SignalType::None` signal still carries the candle timestamp so hosts can
//! log every cycle uniformly.

pub mod composer;
pub mod pricing;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::TradeDirection;

pub use composer::{SignalComposer, SignalInputs, Sizing};
pub use pricing::{price_levels, PriceLevels};

/// Directional intent of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalType {
    None,
    Buy,
    Sell,
}

impl SignalType {
    pub fn direction(self) -> Option<TradeDirection> {
        match self {
            Self::None => None,
            Self::Buy => Some(TradeDirection::Buy),
            Self::Sell => Some(TradeDirection::Sell),
        }
    }
}

impl From<TradeDirection> for SignalType {
    fn from(direction: TradeDirection) -> Self {
        match direction {
            TradeDirection::Buy => Self::Buy,
            TradeDirection::Sell => Self::Sell,
        }
    }
}

/// One evaluation's trade decision with its entry, stop, target and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub signal_type: SignalType,
    pub price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub lots: f64,
    /// Sum of the weights of the detectors that agreed (0.0 to 1.0).
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    /// No trade this cycle.
    pub fn none(timestamp: DateTime<Utc>) -> Self {
        Self {
            signal_type: SignalType::None,
            price: 0.0,
            stop_loss: 0.0,
            take_profit: 0.0,
            lots: 0.0,
            confidence: 0.0,
            timestamp,
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.signal_type != SignalType::None
    }

    pub fn direction(&self) -> Option<TradeDirection> {
        self.signal_type.direction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn none_signal_is_not_actionable() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let signal = Signal::none(ts);
        assert!(!signal.is_actionable());
        assert_eq!(signal.direction(), None);
        assert_eq!(signal.timestamp, ts);
    }

    #[test]
    fn signal_type_maps_to_direction() {
        assert_eq!(SignalType::from(TradeDirection::Sell), SignalType::Sell);
        assert_eq!(SignalType::Buy.direction(), Some(TradeDirection::Buy));
    }

    #[test]
    fn signal_serializes() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let json = serde_json::to_string(&Signal::none(ts)).unwrap();
        assert!(json.contains("\"signal_type\":\"None\""));
    }
}
