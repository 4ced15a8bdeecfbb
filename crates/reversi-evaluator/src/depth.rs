//! Search depth selection.
//!
//! Depths are measured in half-moves (plies). A policy is consulted once per
//! top-level search, so it can adapt the horizon to the phase of the game.

use std::fmt;

use reversi_engine::{CELL_COUNT, GameState, Player};

/// Chooses the search horizon for a position.
pub trait DepthPolicy: fmt::Debug + Send + Sync {
    fn max_depth(&self, state: &GameState, perspective: Player) -> u32;
}

/// Always searches the same number of plies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDepth(pub u32);

impl DepthPolicy for FixedDepth {
    fn max_depth(&self, _state: &GameState, _perspective: Player) -> u32 {
        self.0
    }
}

/// Number of empty cells above which the opening depth is used.
pub const OPENING_EMPTY_THRESHOLD: usize = CELL_COUNT - 10;

/// Picks the depth from the number of empty cells.
///
/// More than [`OPENING_EMPTY_THRESHOLD`] empty cells selects `opening`; fewer than a
/// fifth of the board selects `end`; everything in between selects `middle`.
///
/// ```
/// use reversi_engine::{GameState, Player};
/// use reversi_evaluator::depth::{DepthPolicy, PhaseDepth};
///
/// let policy = PhaseDepth::new(3, 8);
/// assert_eq!(policy.max_depth(&GameState::new_initial(), Player::Black), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDepth {
    pub opening: u32,
    pub middle: u32,
    pub end: u32,
}

impl PhaseDepth {
    pub const DEFAULT_OPENING: u32 = 2;

    #[must_use]
    pub const fn new(middle: u32, end: u32) -> Self {
        Self {
            opening: Self::DEFAULT_OPENING,
            middle,
            end,
        }
    }

    #[must_use]
    pub fn for_empty_count(&self, empty_count: usize) -> u32 {
        if empty_count > OPENING_EMPTY_THRESHOLD {
            self.opening
        } else if empty_count * 5 < CELL_COUNT {
            self.end
        } else {
            self.middle
        }
    }
}

impl DepthPolicy for PhaseDepth {
    fn max_depth(&self, state: &GameState, _perspective: Player) -> u32 {
        self.for_empty_count(state.board().empty_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_boundaries() {
        let policy = PhaseDepth::new(4, 9);
        assert_eq!(policy.for_empty_count(CELL_COUNT - 4), 2);
        assert_eq!(policy.for_empty_count(CELL_COUNT - 9), 2);
        assert_eq!(policy.for_empty_count(CELL_COUNT - 10), 4);
        assert_eq!(policy.for_empty_count(13), 4);
        // 12 < 64 / 5 = 12.8
        assert_eq!(policy.for_empty_count(12), 9);
        assert_eq!(policy.for_empty_count(0), 9);
    }

    #[test]
    fn test_fixed_depth_ignores_state() {
        let state = GameState::new_initial();
        assert_eq!(FixedDepth(5).max_depth(&state, Player::White), 5);
    }
}
