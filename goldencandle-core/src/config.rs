//! Serializable engine configuration.
//!
//! Captures every parameter the host hands the engine at initialization:
//! - Trend detector step/maximum and the two moving averages
//! - Golden candle size rule and wick ratio
//! - Entry offset and base stop-loss distance
//! - Lot and R:R progression tables
//! - Risk limits and the one-trade-at-a-time policy
//!
//! Loaded from TOML. Every section has defaults, so a partial file is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::history::DEFAULT_HISTORY_CAPACITY;
use crate::error::ConfigError;

/// Largest supported progression ladder.
pub const MAX_LADDER_LEVELS: usize = 25;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity of the candle and moving-average ring buffers.
    pub history_capacity: usize,
    pub trend: TrendSettings,
    pub crossover: CrossoverSettings,
    pub pattern: PatternSettings,
    pub signal: SignalSettings,
    pub pricing: PricingSettings,
    pub money: MoneySettings,
    pub risk: RiskSettings,
    pub positions: PositionSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            trend: TrendSettings::default(),
            crossover: CrossoverSettings::default(),
            pattern: PatternSettings::default(),
            signal: SignalSettings::default(),
            pricing: PricingSettings::default(),
            money: MoneySettings::default(),
            risk: RiskSettings::default(),
            positions: PositionSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check every parameter. The engine refuses to start on the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity < 2 {
            return Err(ConfigError::HistoryTooSmall(self.history_capacity));
        }
        self.trend.validate()?;
        self.crossover.fast.validate("fast", self.history_capacity)?;
        self.crossover.slow.validate("slow", self.history_capacity)?;
        self.pattern.validate()?;
        self.money.validate()?;
        self.risk.validate()?;
        non_negative("pricing.entry_offset_points", self.pricing.entry_offset_points)?;
        if !(self.pricing.stop_loss_points > 0.0 && self.pricing.stop_loss_points.is_finite()) {
            return Err(ConfigError::InvalidLimit {
                name: "pricing.stop_loss_points",
                value: self.pricing.stop_loss_points,
            });
        }
        if self.positions.max_positions == 0 {
            return Err(ConfigError::ZeroMaxPositions);
        }
        Ok(())
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two engines built from identical configs share a fingerprint, which lets the
    /// host key persisted ladder/risk state to the configuration that produced it.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidLimit { name, value })
    }
}

/// Trailing-stop trend detector parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendSettings {
    /// Acceleration step; also the seed acceleration after every reversal.
    pub step: f64,
    /// Acceleration cap.
    pub maximum: f64,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            step: 0.001,
            maximum: 0.2,
        }
    }
}

impl TrendSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.step > 0.0) {
            return Err(ConfigError::NonPositiveSarStep(self.step));
        }
        if !(self.maximum > 0.0) {
            return Err(ConfigError::NonPositiveSarMaximum(self.maximum));
        }
        if self.maximum < self.step {
            return Err(ConfigError::SarMaximumBelowStep {
                step: self.step,
                maximum: self.maximum,
            });
        }
        Ok(())
    }
}

/// Moving average method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaMethod {
    Simple,
    Exponential,
}

/// One moving average: `period` closes ending `shift` bars back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaSettings {
    pub period: usize,
    #[serde(default)]
    pub shift: usize,
    pub method: MaMethod,
}

impl MaSettings {
    pub fn new(period: usize, shift: usize, method: MaMethod) -> Self {
        Self {
            period,
            shift,
            method,
        }
    }

    /// Closes needed before the average has a value.
    pub fn window(&self) -> usize {
        self.period + self.shift
    }

    fn validate(&self, which: &'static str, capacity: usize) -> Result<(), ConfigError> {
        if self.period == 0 {
            return Err(ConfigError::NonPositiveMaPeriod { which });
        }
        if self.window() > capacity {
            return Err(ConfigError::MaWindowExceedsHistory {
                which,
                needed: self.window(),
                capacity,
            });
        }
        Ok(())
    }
}

/// Fast/slow moving average pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossoverSettings {
    pub fast: MaSettings,
    pub slow: MaSettings,
}

impl Default for CrossoverSettings {
    fn default() -> Self {
        Self {
            fast: MaSettings::new(1, 0, MaMethod::Exponential),
            slow: MaSettings::new(3, 1, MaMethod::Exponential),
        }
    }
}

/// How the golden candle body size is bounded (price units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SizeRule {
    /// Body must be at least `base_size`.
    Minimum { base_size: f64 },
    /// Body must fall within `[min_size, max_size]`.
    Band { min_size: f64, max_size: f64 },
}

impl SizeRule {
    /// Lower size bound under either rule.
    pub fn min_size(&self) -> f64 {
        match *self {
            Self::Minimum { base_size } => base_size,
            Self::Band { min_size, .. } => min_size,
        }
    }
}

/// Golden candle validation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSettings {
    /// Each wick may be at most this fraction of the body.
    pub max_wick_ratio: f64,
    /// When set, tick volume must be at least this multiple of the previous candle's.
    pub min_volume_multiplier: Option<f64>,
    pub size: SizeRule,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            max_wick_ratio: 0.5,
            min_volume_multiplier: None,
            size: SizeRule::Minimum { base_size: 0.001 },
        }
    }
}

impl PatternSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.size {
            SizeRule::Minimum { base_size } => {
                if !(base_size.is_finite() && base_size > 0.0) {
                    return Err(ConfigError::InvalidCandleSize(format!(
                        "base_size must be > 0 (got {base_size})"
                    )));
                }
            }
            SizeRule::Band { min_size, max_size } => {
                if !(min_size.is_finite() && min_size > 0.0) {
                    return Err(ConfigError::InvalidCandleSize(format!(
                        "min_size must be > 0 (got {min_size})"
                    )));
                }
                if !(max_size.is_finite() && max_size >= min_size) {
                    return Err(ConfigError::InvalidCandleSize(format!(
                        "max_size {max_size} must be >= min_size {min_size}"
                    )));
                }
            }
        }
        non_negative("pattern.max_wick_ratio", self.max_wick_ratio)?;
        if let Some(multiplier) = self.min_volume_multiplier {
            non_negative("pattern.min_volume_multiplier", multiplier)?;
        }
        Ok(())
    }
}

/// Confidence contributed by each detector that agrees with a signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    pub trend: f64,
    pub crossover: f64,
    pub pattern: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            trend: 0.4,
            crossover: 0.3,
            pattern: 0.3,
        }
    }
}

/// Signal composition parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalSettings {
    /// Refuse entries unless the latest candle is a golden candle.
    pub require_golden_candle: bool,
    pub weights: ConfidenceWeights,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            require_golden_candle: true,
            weights: ConfidenceWeights::default(),
        }
    }
}

/// Entry and stop distances, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    pub entry_offset_points: f64,
    pub stop_loss_points: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            entry_offset_points: 3500.0,
            stop_loss_points: 10000.0,
        }
    }
}

/// Progression ladder tables. Index = zero-based level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoneySettings {
    pub lot_table: Vec<f64>,
    pub rr_table: Vec<f64>,
}

impl Default for MoneySettings {
    fn default() -> Self {
        Self {
            lot_table: vec![0.01],
            rr_table: vec![2.0],
        }
    }
}

impl MoneySettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lot_table.is_empty() {
            return Err(ConfigError::EmptyLotTable);
        }
        if self.lot_table.len() != self.rr_table.len() {
            return Err(ConfigError::TableSizeMismatch {
                lots: self.lot_table.len(),
                rr: self.rr_table.len(),
            });
        }
        if self.lot_table.len() > MAX_LADDER_LEVELS {
            return Err(ConfigError::TableTooLarge {
                len: self.lot_table.len(),
                max: MAX_LADDER_LEVELS,
            });
        }
        for (table, values) in [("lot", &self.lot_table), ("R:R", &self.rr_table)] {
            if let Some((index, &value)) = values
                .iter()
                .enumerate()
                .find(|(_, v)| !(v.is_finite() && **v > 0.0))
            {
                return Err(ConfigError::NonPositiveTableEntry {
                    table,
                    index,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Risk gate limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Largest tolerated drawdown from the peak balance, percent.
    pub max_drawdown_pct: f64,
    /// Largest tolerated loss against the day's starting balance, percent.
    pub max_daily_loss_pct: f64,
    /// Smallest tolerated margin level, percent.
    pub margin_minimum_pct: f64,
    pub max_spread_points: u32,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            max_drawdown_pct: 20.0,
            max_daily_loss_pct: 5.0,
            margin_minimum_pct: 100.0,
            max_spread_points: 20,
        }
    }
}

impl RiskSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("risk.max_drawdown_pct", self.max_drawdown_pct)?;
        non_negative("risk.max_daily_loss_pct", self.max_daily_loss_pct)?;
        non_negative("risk.margin_minimum_pct", self.margin_minimum_pct)
    }
}

/// Position ledger policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionSettings {
    pub one_trade_at_a_time: bool,
    /// Concurrent position limit when `one_trade_at_a_time` is off.
    pub max_positions: usize,
}

impl Default for PositionSettings {
    fn default() -> Self {
        Self {
            one_trade_at_a_time: true,
            max_positions: 1,
        }
    }
}
