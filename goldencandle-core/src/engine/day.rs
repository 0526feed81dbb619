//! Day-boundary detection for hosts that only stream candles.

use chrono::{DateTime, NaiveDate, Utc};

/// Flags the first candle of each new UTC calendar date.
#[derive(Debug, Clone, Default)]
pub struct DayBoundary {
    current: Option<NaiveDate>,
}

impl DayBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `timestamp` falls on a later date than the last one observed.
    /// The very first observation only records the date.
    pub fn observe(&mut self, timestamp: DateTime<Utc>) -> bool {
        let date = timestamp.date_naive();
        match self.current {
            Some(current) if date > current => {
                self.current = Some(date);
                true
            }
            Some(_) => false,
            None => {
                self.current = Some(date);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn flags_date_change_once() {
        let mut day = DayBoundary::new();
        let t = |d, h| Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap();
        assert!(!day.observe(t(2, 22)));
        assert!(!day.observe(t(2, 23)));
        assert!(day.observe(t(3, 0)));
        assert!(!day.observe(t(3, 1)));
        // out-of-order candle from an earlier day is ignored
        assert!(!day.observe(t(2, 23)));
    }
}
