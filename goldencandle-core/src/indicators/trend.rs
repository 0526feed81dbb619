//! Trailing-stop trend detector (acceleration-factor reversal system).
//!
//! Inherently sequential/stateful: maintains direction, extreme point (EP),
//! acceleration factor (AF) and a continuity counter. Updated once per candle.
//!
//! Parameters: step (seed AF and increment), maximum (AF cap).
//! Lookback: 1 (the first candle only seeds the state).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TrendSettings;
use crate::domain::Candle;
use crate::error::{ConfigError, InsufficientHistory};

/// Non-reversing candles after which a trend counts as continuous.
pub const CONTINUITY_THRESHOLD: u32 = 3;

/// Trend direction reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Up,
    Down,
    Unknown,
}

/// Mutable detector state, one update per candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendState {
    /// The trailing reversal level.
    pub current_value: f64,
    pub extreme_point: f64,
    pub acceleration_factor: f64,
    pub direction: TrendDirection,
    pub is_continuous: bool,
    pub consecutive_count: u32,
}

impl TrendState {
    fn uninitialized(step: f64) -> Self {
        Self {
            current_value: 0.0,
            extreme_point: 0.0,
            acceleration_factor: step,
            direction: TrendDirection::Unknown,
            is_continuous: false,
            consecutive_count: 0,
        }
    }
}

/// Result of feeding one candle to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    pub value: f64,
    pub direction: TrendDirection,
    /// The direction flipped on this candle.
    pub reversed: bool,
    pub is_continuous: bool,
}

/// Trailing-stop trend reversal detector.
#[derive(Debug, Clone)]
pub struct TrendDetector {
    step: f64,
    maximum: f64,
    state: TrendState,
    candles_seen: usize,
    last_reversed: bool,
}

impl TrendDetector {
    pub fn new(settings: TrendSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            step: settings.step,
            maximum: settings.maximum,
            state: TrendState::uninitialized(settings.step),
            candles_seen: 0,
            last_reversed: false,
        })
    }

    /// Feed one candle and return the updated reading.
    ///
    /// The first candle seeds direction from its polarity (close > open is Up,
    /// anything else Down); later candles apply the reversal rule.
    pub fn update(&mut self, candle: &Candle) -> TrendReading {
        if self.candles_seen == 0 {
            self.seed(candle);
        } else {
            self.advance(candle);
        }
        self.candles_seen += 1;
        self.reading()
    }

    fn seed(&mut self, candle: &Candle) {
        let up = candle.close > candle.open;
        self.state = TrendState {
            current_value: if up { candle.low } else { candle.high },
            extreme_point: if up { candle.high } else { candle.low },
            acceleration_factor: self.step,
            direction: if up {
                TrendDirection::Up
            } else {
                TrendDirection::Down
            },
            is_continuous: false,
            consecutive_count: 0,
        };
        self.last_reversed = false;
    }

    fn advance(&mut self, candle: &Candle) {
        let s = &mut self.state;
        let new_value = s.current_value + s.acceleration_factor * (s.extreme_point - s.current_value);

        let reversed = match s.direction {
            TrendDirection::Up if candle.low < new_value => {
                s.direction = TrendDirection::Down;
                s.current_value = s.extreme_point; // previous EP becomes the level
                s.extreme_point = candle.low;
                true
            }
            TrendDirection::Down if candle.high > new_value => {
                s.direction = TrendDirection::Up;
                s.current_value = s.extreme_point;
                s.extreme_point = candle.high;
                true
            }
            TrendDirection::Up => {
                if candle.high > s.extreme_point {
                    s.extreme_point = candle.high;
                    s.acceleration_factor = (s.acceleration_factor + self.step).min(self.maximum);
                }
                s.current_value = new_value;
                false
            }
            TrendDirection::Down => {
                if candle.low < s.extreme_point {
                    s.extreme_point = candle.low;
                    s.acceleration_factor = (s.acceleration_factor + self.step).min(self.maximum);
                }
                s.current_value = new_value;
                false
            }
            // Only reachable before seeding, which `update` rules out.
            TrendDirection::Unknown => false,
        };

        if reversed {
            s.acceleration_factor = self.step;
            s.consecutive_count = 0;
            s.is_continuous = false;
            debug!(
                direction = ?s.direction,
                level = s.current_value,
                at = %candle.timestamp,
                "trend reversal"
            );
        } else {
            s.consecutive_count += 1;
            s.is_continuous = s.consecutive_count >= CONTINUITY_THRESHOLD;
        }
        self.last_reversed = reversed;
    }

    fn reading(&self) -> TrendReading {
        TrendReading {
            value: self.state.current_value,
            direction: self.state.direction,
            reversed: self.last_reversed,
            is_continuous: self.state.is_continuous,
        }
    }

    /// Latest reading, or `InsufficientHistory` until a second candle has been applied.
    pub fn evaluable_reading(&self) -> Result<TrendReading, InsufficientHistory> {
        if self.candles_seen < 2 {
            return Err(InsufficientHistory {
                needed: 2,
                available: self.candles_seen,
            });
        }
        Ok(self.reading())
    }

    pub fn state(&self) -> &TrendState {
        &self.state
    }

    pub fn direction(&self) -> TrendDirection {
        self.state.direction
    }

    /// Explicit re-initialization: the next candle seeds a fresh trend.
    pub fn reset(&mut self) {
        self.state = TrendState::uninitialized(self.step);
        self.candles_seen = 0;
        self.last_reversed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candle, DEFAULT_EPSILON};

    fn detector(step: f64, maximum: f64) -> TrendDetector {
        TrendDetector::new(TrendSettings { step, maximum }).unwrap()
    }

    #[test]
    fn first_candle_seeds_up_from_bullish_polarity() {
        let mut det = detector(0.02, 0.2);
        let reading = det.update(&make_candle(0, 100.0, 105.0, 98.0, 104.0));
        assert_eq!(reading.direction, TrendDirection::Up);
        assert_approx(reading.value, 98.0, DEFAULT_EPSILON);
        assert_approx(det.state().extreme_point, 105.0, DEFAULT_EPSILON);
        assert_approx(det.state().acceleration_factor, 0.02, DEFAULT_EPSILON);
        assert!(!reading.reversed);
    }

    #[test]
    fn first_candle_seeds_down_from_bearish_or_doji() {
        let mut det = detector(0.02, 0.2);
        let reading = det.update(&make_candle(0, 104.0, 105.0, 98.0, 100.0));
        assert_eq!(reading.direction, TrendDirection::Down);
        assert_approx(reading.value, 105.0, DEFAULT_EPSILON);

        let mut det = detector(0.02, 0.2);
        let reading = det.update(&make_candle(0, 100.0, 101.0, 99.0, 100.0));
        assert_eq!(reading.direction, TrendDirection::Down);
    }

    #[test]
    fn continuation_moves_level_toward_extreme() {
        let mut det = detector(0.02, 0.2);
        det.update(&make_candle(0, 100.0, 105.0, 98.0, 104.0));
        // new = 98 + 0.02 * (105 - 98) = 98.14; low 103 stays above it
        let reading = det.update(&make_candle(1, 104.0, 107.0, 103.0, 106.0));
        assert_eq!(reading.direction, TrendDirection::Up);
        assert_approx(reading.value, 98.14, 1e-9);
        assert_approx(det.state().extreme_point, 107.0, DEFAULT_EPSILON);
        assert_approx(det.state().acceleration_factor, 0.04, 1e-12);
        assert_eq!(det.state().consecutive_count, 1);
    }

    #[test]
    fn up_trend_flips_when_low_breaks_level() {
        let mut det = detector(0.02, 0.2);
        det.update(&make_candle(0, 100.0, 105.0, 98.0, 104.0));
        det.update(&make_candle(1, 104.0, 107.0, 103.0, 106.0));
        let reading = det.update(&make_candle(2, 106.0, 106.5, 95.0, 96.0));
        assert_eq!(reading.direction, TrendDirection::Down);
        assert!(reading.reversed);
        assert!(!reading.is_continuous);
        // level jumps to the previous extreme, extreme becomes the breaking low
        assert_approx(reading.value, 107.0, DEFAULT_EPSILON);
        assert_approx(det.state().extreme_point, 95.0, DEFAULT_EPSILON);
        assert_approx(det.state().acceleration_factor, 0.02, DEFAULT_EPSILON);
        assert_eq!(det.state().consecutive_count, 0);
    }

    #[test]
    fn down_trend_flips_when_high_breaks_level() {
        let mut det = detector(0.02, 0.2);
        det.update(&make_candle(0, 104.0, 105.0, 98.0, 99.0));
        let reading = det.update(&make_candle(1, 99.0, 110.0, 99.0, 109.0));
        assert_eq!(reading.direction, TrendDirection::Up);
        assert!(reading.reversed);
        assert_approx(reading.value, 98.0, DEFAULT_EPSILON);
        assert_approx(det.state().extreme_point, 110.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rising_sequence_becomes_continuous_on_third_candle() {
        let mut det = detector(0.02, 0.2);
        det.update(&make_candle(0, 100.0, 101.5, 99.5, 101.0));
        for i in 1..=5 {
            let base = 100.0 + i as f64;
            let reading = det.update(&make_candle(i, base, base + 1.5, base - 0.5, base + 1.0));
            assert_eq!(reading.direction, TrendDirection::Up);
            assert!(!reading.reversed);
            assert_eq!(reading.is_continuous, i >= 3, "candle {i}");
        }
    }

    #[test]
    fn acceleration_caps_at_maximum() {
        let mut det = detector(0.05, 0.1);
        det.update(&make_candle(0, 100.0, 101.0, 99.5, 100.8));
        for i in 1..10 {
            let base = 100.0 + i as f64 * 2.0;
            det.update(&make_candle(i, base, base + 1.0, base - 0.5, base + 0.8));
        }
        assert_approx(det.state().acceleration_factor, 0.1, DEFAULT_EPSILON);
    }

    #[test]
    fn single_candle_is_not_evaluable() {
        let mut det = detector(0.02, 0.2);
        assert!(det.evaluable_reading().is_err());
        det.update(&make_candle(0, 100.0, 105.0, 98.0, 104.0));
        assert_eq!(
            det.evaluable_reading(),
            Err(InsufficientHistory {
                needed: 2,
                available: 1
            })
        );
        det.update(&make_candle(1, 104.0, 107.0, 103.0, 106.0));
        assert!(det.evaluable_reading().is_ok());
    }

    #[test]
    fn reset_reseeds_on_next_candle() {
        let mut det = detector(0.02, 0.2);
        det.update(&make_candle(0, 100.0, 105.0, 98.0, 104.0));
        det.update(&make_candle(1, 104.0, 107.0, 103.0, 106.0));
        det.reset();
        assert_eq!(det.direction(), TrendDirection::Unknown);
        let reading = det.update(&make_candle(2, 106.0, 107.0, 100.0, 101.0));
        assert_eq!(reading.direction, TrendDirection::Down);
        assert_approx(reading.value, 107.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rejects_invalid_settings() {
        assert!(TrendDetector::new(TrendSettings {
            step: 0.0,
            maximum: 0.2
        })
        .is_err());
        assert!(TrendDetector::new(TrendSettings {
            step: 0.02,
            maximum: 0.0
        })
        .is_err());
    }
}
