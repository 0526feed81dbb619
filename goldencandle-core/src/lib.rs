//! Golden Candle core: signal detection and position progression for one symbol.
//!
//! This crate contains the decision engine a host terminal drives once per candle:
//! - Domain types (candles, bounded history, account and quote snapshots)
//! - Trend reversal and moving-average crossover state machines
//! - Golden candle pattern validation
//! - Signal composition with tunable confidence weights
//! - Progression ladder, risk gate and position ledger
//! - `Engine`, the single owner of all of the above

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod ledger;
pub mod money;
pub mod pattern;
pub mod risk;
pub mod signals;

pub use config::EngineConfig;
pub use engine::{Command, Engine, Tick, TickReport};
pub use error::{CommandError, ConfigError, InsufficientHistory};
