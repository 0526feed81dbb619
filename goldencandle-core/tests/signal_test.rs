//! Integration tests for the detectors feeding the signal composer.
//!
//! Tests:
//! 1. Crossover: a series crossing fast<slow to fast>slow yields exactly one
//!    bullish cross, with both SMA and EMA pairs.
//! 2. Pattern: a body below the minimum is rejected even when wicks and trend
//!    qualify; a candle meeting all four conditions is accepted.
//! 3. Composition: no signal is produced while history is insufficient.

use chrono::{Duration, TimeZone, Utc};
use goldencandle_core::config::{
    CrossoverSettings, MaMethod, MaSettings, PatternSettings, PricingSettings, SignalSettings,
    SizeRule,
};
use goldencandle_core::domain::{Candle, TradeDirection};
use goldencandle_core::indicators::{CrossDirection, CrossoverDetector, TrendDirection};
use goldencandle_core::pattern::{PatternValidator, PatternVerdict, Rejection};
use goldencandle_core::signals::{SignalComposer, SignalInputs, Sizing};
use goldencandle_core::InsufficientHistory;

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle {
        timestamp: Utc.with_ymd_and_hms(2024, 5, 6, 12, 0, 0).unwrap() + Duration::minutes(15),
        open,
        high,
        low,
        close,
        tick_volume: 250,
        spread: 12,
    }
}

/// Falls for a while, jumps once, then keeps rising.
fn crossing_series() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64 * 0.5).collect();
    closes.extend((0..10).map(|i| 105.0 + i as f64));
    closes
}

fn crosses(settings: CrossoverSettings, closes: &[f64]) -> Vec<(usize, CrossDirection)> {
    let mut detector = CrossoverDetector::new(settings, 100);
    closes
        .iter()
        .enumerate()
        .filter_map(|(i, &close)| detector.update(close).cross.map(|c| (i, c)))
        .collect()
}

// ──────────────────────────────────────────────
// 1. Crossover
// ──────────────────────────────────────────────

#[test]
fn sma_pair_crosses_once() {
    let settings = CrossoverSettings {
        fast: MaSettings::new(2, 0, MaMethod::Simple),
        slow: MaSettings::new(5, 0, MaMethod::Simple),
    };
    assert_eq!(
        crosses(settings, &crossing_series()),
        vec![(20, CrossDirection::Bullish)]
    );
}

#[test]
fn ema_pair_crosses_once() {
    // the default pair: fast EMA(1), slow EMA(3) shifted one bar
    assert_eq!(
        crosses(CrossoverSettings::default(), &crossing_series()),
        vec![(20, CrossDirection::Bullish)]
    );
}

#[test]
fn flat_series_never_crosses() {
    let closes = vec![50.0; 40];
    assert!(crosses(CrossoverSettings::default(), &closes).is_empty());
}

// ──────────────────────────────────────────────
// 2. Pattern
// ──────────────────────────────────────────────

#[test]
fn body_below_minimum_is_rejected_even_if_otherwise_golden() {
    let validator = PatternValidator::new(PatternSettings {
        size: SizeRule::Minimum { base_size: 3.0 },
        ..PatternSettings::default()
    })
    .unwrap();
    // body 2.0, wicks 0.5 each, bullish in an Up trend
    let small = candle(100.0, 102.5, 99.5, 102.0);
    assert_eq!(
        validator.validate(&small, None, TrendDirection::Up),
        PatternVerdict::Rejected(vec![Rejection::BodyTooSmall {
            body: 2.0,
            min: 3.0
        }])
    );
}

#[test]
fn candle_meeting_all_four_conditions_is_golden() {
    let validator = PatternValidator::new(PatternSettings {
        size: SizeRule::Band {
            min_size: 1.0,
            max_size: 5.0,
        },
        ..PatternSettings::default()
    })
    .unwrap();
    let bearish = candle(104.0, 104.5, 99.2, 100.0);
    let verdict = validator.validate(&bearish, None, TrendDirection::Down);
    assert_eq!(
        verdict.golden().map(|g| g.direction),
        Some(TradeDirection::Sell)
    );

    // same candle against the opposite trend
    assert!(!validator
        .validate(&bearish, None, TrendDirection::Up)
        .is_valid());
}

// ──────────────────────────────────────────────
// 3. Composition
// ──────────────────────────────────────────────

#[test]
fn no_signal_without_history() {
    let composer = SignalComposer::new(SignalSettings::default(), PricingSettings::default());
    let c = candle(100.0, 104.5, 99.8, 104.0);
    let verdict = PatternVerdict::Rejected(vec![]);
    let missing = InsufficientHistory {
        needed: 2,
        available: 1,
    };
    let result = composer.compose(
        SignalInputs {
            candle: &c,
            trend: Err(missing),
            crossover: Ok(Some(CrossDirection::Bullish)),
            pattern: &verdict,
        },
        Sizing {
            lots: 0.01,
            risk_reward: 2.0,
            point: 0.01,
        },
    );
    assert_eq!(result, Err(missing));
}
