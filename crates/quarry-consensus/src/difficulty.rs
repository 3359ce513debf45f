//! Difficulty retargeting.

use crate::params::{DEFAULT_DIFFICULTY, MAX_RETARGET_FACTOR, RETARGET_INTERVAL, TARGET_WINDOW_MS};
use quarry_types::Params;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Persisted difficulty state.
///
/// Updated only at retarget boundaries; `value` always lies within the
/// configured absolute bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyState {
    /// Current scalar difficulty.
    pub value: u64,
    /// Height of the last retarget, 0 before the first one.
    pub last_retarget_height: i64,
}

impl Default for DifficultyState {
    fn default() -> Self {
        Self {
            value: DEFAULT_DIFFICULTY,
            last_retarget_height: 0,
        }
    }
}

/// Outcome of a retarget boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retarget {
    /// Difficulty before the adjustment.
    pub old_difficulty: u64,
    /// Difficulty after clamping.
    pub new_difficulty: u64,
    /// Height of the adjustment.
    pub height: i64,
}

/// Bounded Bitcoin-style difficulty retarget calculator.
#[derive(Debug, Clone)]
pub struct DifficultyController {
    retarget_interval: i64,
    target_window_ms: u64,
    min_difficulty: u64,
    max_difficulty: u64,
}

impl DifficultyController {
    /// Create a controller from validated module parameters.
    pub fn from_params(params: &Params) -> Self {
        Self {
            retarget_interval: RETARGET_INTERVAL,
            target_window_ms: TARGET_WINDOW_MS,
            min_difficulty: params.min_difficulty,
            max_difficulty: params.max_difficulty,
        }
    }

    /// Create with custom parameters (for testing).
    pub fn with_params(
        retarget_interval: i64,
        target_window_ms: u64,
        min_difficulty: u64,
        max_difficulty: u64,
    ) -> Self {
        Self {
            retarget_interval,
            target_window_ms,
            min_difficulty,
            max_difficulty,
        }
    }

    /// Whether `height` is a retarget boundary.
    pub fn is_retarget_height(&self, height: i64) -> bool {
        height > 0 && height % self.retarget_interval == 0
    }

    /// Run a retarget at `height`.
    ///
    /// `observed_window_ms` is the wall time the last retarget window
    /// actually took. Zero (no history yet) means "assume on target":
    /// the value is kept and only the boundary bookkeeping advances.
    ///
    /// Returns `None` when `height` is not a retarget boundary.
    pub fn retarget(
        &self,
        height: i64,
        state: &DifficultyState,
        observed_window_ms: u64,
    ) -> Option<(DifficultyState, Retarget)> {
        if !self.is_retarget_height(height) {
            return None;
        }

        let current = state.value;
        let raw = if observed_window_ms == 0 {
            current
        } else {
            // u128 so a large difficulty times the window cannot overflow.
            let scaled = current as u128 * self.target_window_ms as u128
                / observed_window_ms as u128;
            u64::try_from(scaled).unwrap_or(u64::MAX)
        };

        // Relative 4x / 0.25x caps first, then the absolute bounds.
        let new_value = raw
            .min(current.saturating_mul(MAX_RETARGET_FACTOR))
            .max(current / MAX_RETARGET_FACTOR)
            .clamp(self.min_difficulty, self.max_difficulty);

        debug!(
            height,
            old_difficulty = current,
            new_difficulty = new_value,
            observed_window_ms,
            "Difficulty retarget"
        );

        let new_state = DifficultyState {
            value: new_value,
            last_retarget_height: height,
        };
        let retarget = Retarget {
            old_difficulty: current,
            new_difficulty: new_value,
            height,
        };
        Some((new_state, retarget))
    }
}
