//! Indicator state machines fed once per candle.
//!
//! Unlike batch indicators, each detector here owns its own bounded state and is
//! advanced incrementally by the engine. Nothing is recomputed from scratch.

pub mod crossover;
pub mod moving_average;
pub mod trend;

pub use crossover::{CrossDirection, CrossoverDetector, CrossoverReading};
pub use moving_average::{moving_average, MaSeries};
pub use trend::{TrendDetector, TrendDirection, TrendReading, TrendState};

/// Build one synthetic candle at hourly offset `i` from a fixed base time.
#[cfg(test)]
pub fn make_candle(i: i64, open: f64, high: f64, low: f64, close: f64) -> crate::domain::Candle {
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    crate::domain::Candle {
        timestamp: base + chrono::Duration::hours(i),
        open,
        high,
        low,
        close,
        tick_volume: 1000,
        spread: 10,
    }
}

/// Create synthetic candles from close prices for testing.
///
/// open = prev_close (or close for the first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            make_candle(
                i as i64,
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
