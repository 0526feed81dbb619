//! Progression ladder boundary tests.
//!
//! Tests:
//! 1. Skip boundaries: 0 and size + 1 rejected, 1 and size accepted.
//! 2. Pause zeroes every level's lot size; resume restores the table.
//! 3. Outcome policy on the three-level table: loss advances, win resets.

use goldencandle_core::config::MoneySettings;
use goldencandle_core::error::CommandError;
use goldencandle_core::money::{LevelTransition, ProgressionLadder, TradeOutcome};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

const LOTS: [f64; 3] = [0.01, 0.02, 0.04];
const RR: [f64; 3] = [2.0, 3.0, 4.0];

fn ladder() -> ProgressionLadder {
    ProgressionLadder::new(&MoneySettings {
        lot_table: LOTS.to_vec(),
        rr_table: RR.to_vec(),
    })
    .unwrap()
}

// ──────────────────────────────────────────────
// 1. Skip boundaries
// ──────────────────────────────────────────────

#[test]
fn skip_to_zero_is_rejected() {
    let mut ladder = ladder();
    let before = ladder.state().clone();
    assert_eq!(
        ladder.skip_to_level(0),
        Err(CommandError::LevelOutOfRange {
            requested: 0,
            max: 3
        })
    );
    assert_eq!(ladder.state(), &before);
}

#[test]
fn skip_past_the_table_is_rejected() {
    let mut ladder = ladder();
    ladder.skip_to_level(2).unwrap();
    let before = ladder.state().clone();
    assert!(ladder.skip_to_level(LOTS.len() + 1).is_err());
    assert_eq!(ladder.state(), &before);
}

#[test]
fn skip_to_one_selects_level_zero() {
    let mut ladder = ladder();
    ladder.apply_outcome(TradeOutcome::Loss);
    assert_eq!(ladder.skip_to_level(1), Ok(0));
    assert_eq!(ladder.level(), 0);
}

#[test]
fn skip_to_size_selects_top_level() {
    let mut ladder = ladder();
    assert_eq!(ladder.skip_to_level(LOTS.len()), Ok(LOTS.len() - 1));
    assert_eq!(ladder.lot_size(), 0.04);
    assert_eq!(ladder.risk_reward(), 4.0);
}

// ──────────────────────────────────────────────
// 2. Pause / resume
// ──────────────────────────────────────────────

#[test]
fn pause_zeroes_all_levels_and_resume_restores() {
    let mut ladder = ladder();
    ladder.pause();
    for level in 0..10 {
        assert_eq!(ladder.current_lot_size(level), 0.0, "level {level}");
    }
    // R:R stays readable for reporting
    assert_eq!(ladder.current_risk_reward(2), 4.0);

    ladder.resume();
    for (level, &lots) in LOTS.iter().enumerate() {
        assert_eq!(ladder.current_lot_size(level), lots);
    }
}

// ──────────────────────────────────────────────
// 3. Outcome policy
// ──────────────────────────────────────────────

#[test]
fn loss_at_zero_then_win_at_one() {
    let mut ladder = ladder();
    assert_eq!(
        ladder.apply_outcome(TradeOutcome::Loss),
        LevelTransition { from: 0, to: 1 }
    );
    assert_eq!(ladder.lot_size(), 0.02);
    assert_eq!(ladder.risk_reward(), 3.0);

    assert_eq!(
        ladder.apply_outcome(TradeOutcome::Win),
        LevelTransition { from: 1, to: 0 }
    );
    assert_eq!(ladder.lot_size(), 0.01);
    assert_eq!(ladder.risk_reward(), 2.0);
}

#[test]
fn losing_streak_stops_at_top() {
    let mut ladder = ladder();
    for _ in 0..10 {
        ladder.apply_outcome(TradeOutcome::Loss);
    }
    assert_eq!(ladder.level(), LOTS.len() - 1);
}
