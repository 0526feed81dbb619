//! Account metrics and market quote supplied by the host on every tick.

use serde::{Deserialize, Serialize};

/// Trade direction of a signal or position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl TradeDirection {
    /// +1.0 for Buy, -1.0 for Sell.
    pub fn sign(self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
        }
    }
}

/// Account state as reported by the host terminal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub balance: f64,
    pub equity: f64,
    /// Margin currently in use. Zero when nothing is open.
    pub margin: f64,
}

impl AccountSnapshot {
    /// Flat account: equity equals balance and no margin is used.
    pub fn flat(balance: f64) -> Self {
        Self {
            balance,
            equity: balance,
            margin: 0.0,
        }
    }

    /// Finite metrics, a positive balance and non-negative margin.
    pub fn is_sane(&self) -> bool {
        self.balance.is_finite()
            && self.equity.is_finite()
            && self.margin.is_finite()
            && self.balance > 0.0
            && self.margin >= 0.0
    }

    /// Margin level in percent (`equity / margin * 100`), `None` with no margin in use.
    pub fn margin_level(&self) -> Option<f64> {
        if self.margin > 0.0 {
            Some(self.equity / self.margin * 100.0)
        } else {
            None
        }
    }
}

/// Current quote for the traded symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub bid: f64,
    pub ask: f64,
    /// Price value of one point.
    pub point: f64,
    pub spread_points: u32,
}

impl MarketQuote {
    /// Finite prices and a positive point value.
    pub fn is_sane(&self) -> bool {
        self.bid.is_finite() && self.ask.is_finite() && self.point.is_finite() && self.point > 0.0
    }

    /// Quote derived from a candle close, for hosts that only stream bars.
    pub fn from_close(close: f64, point: f64, spread_points: u32) -> Self {
        let half = point * spread_points as f64 / 2.0;
        Self {
            bid: close - half,
            ask: close + half,
            point,
            spread_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn margin_level_without_margin_is_none() {
        assert_eq!(AccountSnapshot::flat(10_000.0).margin_level(), None);
    }

    #[test]
    fn margin_level_percent() {
        let account = AccountSnapshot {
            balance: 10_000.0,
            equity: 9_000.0,
            margin: 3_000.0,
        };
        assert_eq!(account.margin_level(), Some(300.0));
    }

    #[test]
    fn non_finite_or_empty_accounts_are_not_sane() {
        assert!(AccountSnapshot::flat(10_000.0).is_sane());
        assert!(!AccountSnapshot::flat(f64::NAN).is_sane());
        assert!(!AccountSnapshot::flat(0.0).is_sane());
        let account = AccountSnapshot {
            balance: 10_000.0,
            equity: f64::INFINITY,
            margin: 0.0,
        };
        assert!(!account.is_sane());
        let account = AccountSnapshot {
            margin: -1.0,
            ..AccountSnapshot::flat(10_000.0)
        };
        assert!(!account.is_sane());
    }

    #[test]
    fn quote_needs_a_positive_point() {
        assert!(MarketQuote::from_close(1.2, 0.0001, 10).is_sane());
        assert!(!MarketQuote::from_close(1.2, 0.0, 10).is_sane());
        assert!(!MarketQuote::from_close(1.2, f64::NAN, 10).is_sane());
    }

    #[test]
    fn quote_from_close_straddles_close() {
        let quote = MarketQuote::from_close(1.2000, 0.0001, 20);
        assert!((quote.ask - quote.bid - 0.0020).abs() < 1e-12);
        assert!(quote.bid < 1.2000 && quote.ask > 1.2000);
    }
}
