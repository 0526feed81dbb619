//! Golden candle validation.
//!
//! A candle qualifies when all checks pass:
//! 1. body size satisfies the configured `SizeRule`
//! 2. upper wick <= `max_wick_ratio * body`
//! 3. lower wick <= `max_wick_ratio * body`
//! 4. candle polarity agrees with the trend (bullish needs Up, bearish needs Down)
//!
//! plus the optional tick-volume filter against the previous candle.
//! Every failing check is reported, not just the first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{PatternSettings, SizeRule};
use crate::domain::{Candle, TradeDirection};
use crate::error::{CommandError, ConfigError};
use crate::indicators::TrendDirection;

/// A candle that passed every check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoldenCandle {
    pub timestamp: DateTime<Utc>,
    pub direction: TradeDirection,
    pub body: f64,
    pub upper_wick: f64,
    pub lower_wick: f64,
}

/// Why a candle is not a golden candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("body {body} is below the minimum size {min}")]
    BodyTooSmall { body: f64, min: f64 },

    #[error("body {body} is above the maximum size {max}")]
    BodyTooLarge { body: f64, max: f64 },

    #[error("upper wick {wick} exceeds {limit}")]
    UpperWickTooLong { wick: f64, limit: f64 },

    #[error("lower wick {wick} exceeds {limit}")]
    LowerWickTooLong { wick: f64, limit: f64 },

    #[error("candle direction {candle:?} does not follow the {trend:?} trend")]
    TrendMismatch {
        candle: Option<TradeDirection>,
        trend: TrendDirection,
    },

    #[error("tick volume {volume} is below the required {required}")]
    VolumeTooLow { volume: u64, required: f64 },

    #[error("no previous candle to compare tick volume against")]
    NoPreviousVolume,
}

/// Outcome of validating one candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatternVerdict {
    Valid(GoldenCandle),
    Rejected(Vec<Rejection>),
}

impl PatternVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn golden(&self) -> Option<&GoldenCandle> {
        match self {
            Self::Valid(golden) => Some(golden),
            Self::Rejected(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PatternValidator {
    settings: PatternSettings,
}

impl PatternValidator {
    pub fn new(settings: PatternSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &PatternSettings {
        &self.settings
    }

    /// Validate `candle` against the current trend. `previous` feeds the volume filter.
    pub fn validate(
        &self,
        candle: &Candle,
        previous: Option<&Candle>,
        trend: TrendDirection,
    ) -> PatternVerdict {
        let body = candle.body();
        let upper_wick = candle.upper_wick();
        let lower_wick = candle.lower_wick();
        let mut reasons = Vec::new();

        match self.settings.size {
            SizeRule::Minimum { base_size } => {
                if body < base_size {
                    reasons.push(Rejection::BodyTooSmall {
                        body,
                        min: base_size,
                    });
                }
            }
            SizeRule::Band { min_size, max_size } => {
                if body < min_size {
                    reasons.push(Rejection::BodyTooSmall {
                        body,
                        min: min_size,
                    });
                } else if body > max_size {
                    reasons.push(Rejection::BodyTooLarge {
                        body,
                        max: max_size,
                    });
                }
            }
        }

        let limit = self.settings.max_wick_ratio * body;
        if upper_wick > limit {
            reasons.push(Rejection::UpperWickTooLong {
                wick: upper_wick,
                limit,
            });
        }
        if lower_wick > limit {
            reasons.push(Rejection::LowerWickTooLong {
                wick: lower_wick,
                limit,
            });
        }

        let polarity = if candle.is_bullish() {
            Some(TradeDirection::Buy)
        } else if candle.is_bearish() {
            Some(TradeDirection::Sell)
        } else {
            None
        };
        let aligned = matches!(
            (polarity, trend),
            (Some(TradeDirection::Buy), TrendDirection::Up)
                | (Some(TradeDirection::Sell), TrendDirection::Down)
        );
        if !aligned {
            reasons.push(Rejection::TrendMismatch {
                candle: polarity,
                trend,
            });
        }

        if let Some(multiplier) = self.settings.min_volume_multiplier {
            match previous {
                Some(prev) => {
                    let required = prev.tick_volume as f64 * multiplier;
                    if (candle.tick_volume as f64) < required {
                        reasons.push(Rejection::VolumeTooLow {
                            volume: candle.tick_volume,
                            required,
                        });
                    }
                }
                None => reasons.push(Rejection::NoPreviousVolume),
            }
        }

        match polarity {
            Some(direction) if reasons.is_empty() => PatternVerdict::Valid(GoldenCandle {
                timestamp: candle.timestamp,
                direction,
                body,
                upper_wick,
                lower_wick,
            }),
            _ => {
                debug!(
                    at = %candle.timestamp,
                    reasons = ?reasons.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "golden candle rejected"
                );
                PatternVerdict::Rejected(reasons)
            }
        }
    }

    /// Change the lower size bound live. Leaves the settings untouched on error.
    pub fn adjust_min_size(&mut self, value: f64) -> Result<SizeRule, CommandError> {
        if !(value.is_finite() && value > 0.0) {
            return Err(CommandError::InvalidCandleSize {
                value,
                reason: "must be a finite value > 0".into(),
            });
        }
        self.settings.size = match self.settings.size {
            SizeRule::Minimum { .. } => SizeRule::Minimum { base_size: value },
            SizeRule::Band { max_size, .. } => {
                if value > max_size {
                    return Err(CommandError::InvalidCandleSize {
                        value,
                        reason: format!("exceeds the maximum size {max_size}"),
                    });
                }
                SizeRule::Band {
                    min_size: value,
                    max_size,
                }
            }
        };
        Ok(self.settings.size)
    }
}
