//! Fast/slow moving average crossover detection.
//!
//! Bullish when fast moves from strictly below slow to strictly above it between
//! two adjacent bars. Bearish is the mirror. Equality on either bar is no cross.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CrossoverSettings;
use crate::error::InsufficientHistory;

use super::moving_average::MaSeries;

/// Direction of a moving-average cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossDirection {
    Bullish,
    Bearish,
}

/// Moving-average values and cross state after one update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossoverReading {
    pub fast: Option<f64>,
    pub slow: Option<f64>,
    /// `None` when both bars were computable but no sign change happened.
    pub cross: Option<CrossDirection>,
}

/// Tracks a bounded close history and the two derived average series.
#[derive(Debug, Clone)]
pub struct CrossoverDetector {
    closes: VecDeque<f64>,
    capacity: usize,
    fast: MaSeries,
    slow: MaSeries,
}

impl CrossoverDetector {
    /// `capacity` bounds the close history and both series. Config validation
    /// guarantees it covers the larger window.
    pub fn new(settings: CrossoverSettings, capacity: usize) -> Self {
        Self {
            closes: VecDeque::with_capacity(capacity),
            capacity,
            fast: MaSeries::new(settings.fast, capacity),
            slow: MaSeries::new(settings.slow, capacity),
        }
    }

    /// Closes needed before a cross can be evaluated (both series need two values).
    pub fn warmup(&self) -> usize {
        self.fast.settings().window().max(self.slow.settings().window()) + 1
    }

    /// Append one close and recompute both averages.
    pub fn update(&mut self, close: f64) -> CrossoverReading {
        if self.closes.len() == self.capacity {
            self.closes.pop_front();
        }
        self.closes.push_back(close);

        let closes = self.closes.make_contiguous();
        let fast = self.fast.update(closes).ok();
        let slow = self.slow.update(closes).ok();
        let cross = self.crossover().ok().flatten();

        if let Some(direction) = cross {
            debug!(?direction, fast, slow, "moving average cross");
        }

        CrossoverReading { fast, slow, cross }
    }

    /// Cross between the previous bar and the latest one.
    pub fn crossover(&self) -> Result<Option<CrossDirection>, InsufficientHistory> {
        let values = (
            self.fast.previous(),
            self.slow.previous(),
            self.fast.latest(),
            self.slow.latest(),
        );
        let (Some(fast_prev), Some(slow_prev), Some(fast_cur), Some(slow_cur)) = values else {
            return Err(InsufficientHistory {
                needed: self.warmup(),
                available: self.closes.len(),
            });
        };

        if fast_prev < slow_prev && fast_cur > slow_cur {
            Ok(Some(CrossDirection::Bullish))
        } else if fast_prev > slow_prev && fast_cur < slow_cur {
            Ok(Some(CrossDirection::Bearish))
        } else {
            Ok(None)
        }
    }

    pub fn fast(&self) -> &MaSeries {
        &self.fast
    }

    pub fn slow(&self) -> &MaSeries {
        &self.slow
    }

    pub fn reset(&mut self) {
        self.closes.clear();
        self.fast.clear();
        self.slow.clear();
    }
}
