//! Error taxonomy shared across the engine.
//!
//! - `ConfigError`: invalid initialization parameters. Fatal to `Engine::new`.
//! - `InsufficientHistory`: a computation asked for more candles than are buffered.
//! - `CommandError`: a user command that failed validation and changed nothing.
//!
//! Risk and ledger failures live next to the code that produces them
//! (`risk::RiskViolation`, `ledger::OpenRejection`, `ledger::LedgerError`).

use serde::Serialize;
use thiserror::Error;

/// Invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("SAR step must be > 0 (got {0})")]
    NonPositiveSarStep(f64),

    #[error("SAR maximum must be > 0 (got {0})")]
    NonPositiveSarMaximum(f64),

    #[error("SAR maximum {maximum} is below SAR step {step}")]
    SarMaximumBelowStep { step: f64, maximum: f64 },

    #[error("{which} moving average period must be > 0")]
    NonPositiveMaPeriod { which: &'static str },

    #[error("{which} moving average needs {needed} closes but history capacity is {capacity}")]
    MaWindowExceedsHistory {
        which: &'static str,
        needed: usize,
        capacity: usize,
    },

    #[error("history capacity must be >= 2 (got {0})")]
    HistoryTooSmall(usize),

    #[error("lot table is empty")]
    EmptyLotTable,

    #[error("lot table has {lots} entries but R:R table has {rr}")]
    TableSizeMismatch { lots: usize, rr: usize },

    #[error("progression tables hold at most {max} levels (got {len})")]
    TableTooLarge { len: usize, max: usize },

    #[error("{table} table entry {index} must be > 0 (got {value})")]
    NonPositiveTableEntry {
        table: &'static str,
        index: usize,
        value: f64,
    },

    #[error("golden candle size bounds invalid: {0}")]
    InvalidCandleSize(String),

    #[error("{name} must be a finite value >= 0 (got {value})")]
    InvalidLimit { name: &'static str, value: f64 },

    #[error("max_positions must be >= 1")]
    ZeroMaxPositions,

    #[error("read config file: {0}")]
    Io(String),

    #[error("parse config TOML: {0}")]
    Parse(String),
}

/// Not enough candles (or indicator values) for a requested computation.
///
/// Callers treat this as "signal not evaluable", never as a zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[error("insufficient history: need {needed}, have {available}")]
pub struct InsufficientHistory {
    pub needed: usize,
    pub available: usize,
}

/// A user command that was rejected. Engine state is unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
pub enum CommandError {
    #[error("level {requested} is outside 1..={max}")]
    LevelOutOfRange { requested: usize, max: usize },

    #[error("minimum candle size {value} is invalid: {reason}")]
    InvalidCandleSize { value: f64, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_messages_name_the_field() {
        let err = ConfigError::TableSizeMismatch { lots: 3, rr: 2 };
        assert_eq!(err.to_string(), "lot table has 3 entries but R:R table has 2");

        let err = ConfigError::NonPositiveMaPeriod { which: "fast" };
        assert!(err.to_string().starts_with("fast"));
    }

    #[test]
    fn command_error_is_observable() {
        let err = CommandError::LevelOutOfRange {
            requested: 0,
            max: 3,
        };
        assert_eq!(err.to_string(), "level 0 is outside 1..=3");
    }
}
