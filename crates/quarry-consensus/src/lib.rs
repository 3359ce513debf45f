//! # quarry-consensus
//!
//! Consensus-side rules for the quarry settlement engine.
//!
//! This crate provides:
//! - Bounded Bitcoin-style difficulty retargeting on a fixed block cadence
//! - The persisted difficulty state
//!
//! ## Difficulty retargeting
//!
//! Difficulty is retargeted every 2016 blocks against a 500 ms target
//! block time. A single retarget is bounded to a 4x increase or 0.25x
//! decrease before the configured absolute bounds are applied, so one
//! bad window can never swing difficulty arbitrarily.

mod difficulty;

pub use difficulty::{DifficultyController, DifficultyState, Retarget};

/// Consensus constants.
pub mod params {
    /// Blocks between difficulty retargets.
    pub const RETARGET_INTERVAL: i64 = 2016;

    /// Target block time in milliseconds.
    pub const TARGET_BLOCK_TIME_MS: u64 = 500;

    /// Target duration of one retarget window in milliseconds.
    pub const TARGET_WINDOW_MS: u64 = RETARGET_INTERVAL as u64 * TARGET_BLOCK_TIME_MS;

    /// Difficulty assumed before any retarget has run.
    pub const DEFAULT_DIFFICULTY: u64 = 1_000_000;

    /// Maximum single-retarget increase factor.
    pub const MAX_RETARGET_FACTOR: u64 = 4;
}
