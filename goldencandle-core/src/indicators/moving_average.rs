//! Simple and exponential moving averages over a close series.
//!
//! Both methods read the same window: `period` closes ending `shift` bars back.
//! - Simple: arithmetic mean of the window.
//! - Exponential: seeded with the oldest value in the window, then
//!   `ema = alpha * close + (1 - alpha) * ema` walking toward the present,
//!   with `alpha = 2 / (period + 1)`.

use std::collections::VecDeque;

use crate::config::{MaMethod, MaSettings};
use crate::error::InsufficientHistory;

/// Moving average of `closes` (oldest first) under `settings`.
///
/// Returns `InsufficientHistory` when `closes.len() < period + shift`.
pub fn moving_average(closes: &[f64], settings: &MaSettings) -> Result<f64, InsufficientHistory> {
    let needed = settings.window();
    if settings.period == 0 || closes.len() < needed {
        return Err(InsufficientHistory {
            needed,
            available: closes.len(),
        });
    }

    let end = closes.len() - settings.shift;
    let window = &closes[end - settings.period..end];

    let value = match settings.method {
        MaMethod::Simple => window.iter().sum::<f64>() / settings.period as f64,
        MaMethod::Exponential => {
            let alpha = 2.0 / (settings.period as f64 + 1.0);
            window[1..]
                .iter()
                .fold(window[0], |ema, &close| alpha * close + (1.0 - alpha) * ema)
        }
    };
    Ok(value)
}

/// Bounded ring buffer of computed moving-average values, oldest evicted.
#[derive(Debug, Clone)]
pub struct MaSeries {
    settings: MaSettings,
    values: VecDeque<f64>,
    capacity: usize,
}

impl MaSeries {
    pub fn new(settings: MaSettings, capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            settings,
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Recompute against the latest closes and append the value if one exists.
    pub fn update(&mut self, closes: &[f64]) -> Result<f64, InsufficientHistory> {
        let value = moving_average(closes, &self.settings)?;
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
        Ok(value)
    }

    pub fn settings(&self) -> &MaSettings {
        &self.settings
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Value one bar before the latest.
    pub fn previous(&self) -> Option<f64> {
        self.values.len().checked_sub(2).map(|i| self.values[i])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_of_last_period_values() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sma = MaSettings::new(3, 0, MaMethod::Simple);
        assert_approx(moving_average(&closes, &sma).unwrap(), 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_respects_shift() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sma = MaSettings::new(3, 2, MaMethod::Simple);
        // window = [1, 2, 3]
        assert_approx(moving_average(&closes, &sma).unwrap(), 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_seeds_with_oldest_window_value() {
        let closes = [10.0, 11.0, 12.0];
        let ema = MaSettings::new(3, 0, MaMethod::Exponential);
        // alpha = 0.5: seed 10 -> 10.5 -> 11.25
        assert_approx(moving_average(&closes, &ema).unwrap(), 11.25, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_period_one_is_the_close() {
        let closes = [10.0, 11.0, 12.5];
        let ema = MaSettings::new(1, 0, MaMethod::Exponential);
        assert_approx(moving_average(&closes, &ema).unwrap(), 12.5, DEFAULT_EPSILON);

        let shifted = MaSettings::new(1, 1, MaMethod::Exponential);
        assert_approx(moving_average(&closes, &shifted).unwrap(), 11.0, DEFAULT_EPSILON);
    }

    #[test]
    fn insufficient_history_is_not_zero() {
        let closes = [1.0, 2.0, 3.0];
        let slow = MaSettings::new(3, 1, MaMethod::Exponential);
        assert_eq!(
            moving_average(&closes, &slow),
            Err(InsufficientHistory {
                needed: 4,
                available: 3
            })
        );
        assert!(moving_average(&[], &MaSettings::new(1, 0, MaMethod::Simple)).is_err());
    }

    #[test]
    fn series_is_bounded() {
        let mut series = MaSeries::new(MaSettings::new(1, 0, MaMethod::Simple), 3);
        let mut closes = Vec::new();
        for i in 0..10 {
            closes.push(i as f64);
            series.update(&closes).unwrap();
        }
        assert_eq!(series.len(), 3);
        assert_eq!(series.latest(), Some(9.0));
        assert_eq!(series.previous(), Some(8.0));
    }

    #[test]
    fn series_skips_values_until_history_fills() {
        let mut series = MaSeries::new(MaSettings::new(2, 0, MaMethod::Simple), 10);
        assert!(series.update(&[1.0]).is_err());
        assert!(series.is_empty());
        series.update(&[1.0, 3.0]).unwrap();
        assert_eq!(series.latest(), Some(2.0));
        assert_eq!(series.previous(), None);
    }
}
