//! Bounded candle history, oldest evicted first.

use std::collections::VecDeque;

use super::Candle;

/// Default capacity of history ring buffers.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Time-ordered ring buffer of ingested candles.
#[derive(Debug, Clone)]
pub struct CandleHistory {
    candles: VecDeque<Candle>,
    capacity: usize,
}

impl CandleHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            candles: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// True when `candle` is strictly newer than the latest stored candle.
    pub fn accepts(&self, candle: &Candle) -> bool {
        self.latest()
            .map_or(true, |latest| candle.timestamp > latest.timestamp)
    }

    /// Append a candle, evicting the oldest one when full.
    ///
    /// Returns `false` and stores nothing when the candle is not newer than the
    /// latest one, so the buffer stays time-ascending.
    pub fn push(&mut self, candle: Candle) -> bool {
        if !self.accepts(&candle) {
            return false;
        }
        if self.candles.len() == self.capacity {
            self.candles.pop_front();
        }
        self.candles.push_back(candle);
        true
    }

    pub fn latest(&self) -> Option<&Candle> {
        self.candles.back()
    }

    /// The candle before the latest one.
    pub fn previous(&self) -> Option<&Candle> {
        self.candles.iter().rev().nth(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.candles.clear();
    }
}

impl Default for CandleHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
