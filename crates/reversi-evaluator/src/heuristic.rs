//! Static evaluation of game states.
//!
//! Every evaluator scores a state from the point of view of a `perspective` player;
//! larger values are better for that player.
//!
//! - [`terminal_utility`] - Exact value of a finished game: `1`, `0` or `-1`
//! - [`MaterialAdvantage`] - Disc count and mobility balance, in `[-w, w]`-ish range
//! - [`PositionalAdvantage`] - Position-weighted disc balance with an exposure term
//!
//! Both estimators are pure functions of the board; they are used by
//! [`AlphaBeta`](crate::search::AlphaBeta) at the search horizon.
//!
//! # Example
//!
//! ```
//! use reversi_engine::{GameState, Player};
//! use reversi_evaluator::heuristic::{MaterialAdvantage, StateEvaluator};
//!
//! let state = GameState::new_initial();
//! let material = MaterialAdvantage::new(2.0);
//! // Equal discs and equal mobility.
//! assert_eq!(material.estimate(&state, Player::Black), 0.0);
//! ```

use std::fmt;

use reversi_engine::{CELL_COUNT, GameResult, GameState, Player};

/// Scores a non-terminal state for `perspective`.
pub trait StateEvaluator: fmt::Debug + Send + Sync {
    fn estimate(&self, state: &GameState, perspective: Player) -> f64;
}

/// Exact utility of a finished game: `1.0` for a win, `-1.0` for a loss, `0.0` for
/// a draw or an unfinished game.
#[must_use]
pub fn terminal_utility(state: &GameState, perspective: Player) -> f64 {
    match state.result() {
        Some(GameResult::Winner(winner)) if winner == perspective => 1.0,
        Some(GameResult::Winner(_)) => -1.0,
        Some(GameResult::Draw) | None => 0.0,
    }
}

/// Returns `2 * own / (own + other) - 1`, or `0.0` when both are zero.
#[expect(clippy::cast_precision_loss)]
fn balance(own: usize, other: usize) -> f64 {
    let total = own + other;
    if total == 0 {
        return 0.0;
    }
    2.0 * own as f64 / total as f64 - 1.0
}

/// Material heuristic: balance of discs plus balance of available moves.
///
/// ```text
/// by_count = 2 * own_discs / (own_discs + other_discs) - 1
/// by_moves = 2 * own_moves / (own_moves + other_moves) - 1
/// value    = weight_ratio * by_count + (weight_ratio - 1) * by_moves
/// ```
///
/// A `weight_ratio` below 1 rewards mobility over discs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialAdvantage {
    weight_ratio: f64,
}

impl MaterialAdvantage {
    #[must_use]
    pub const fn new(weight_ratio: f64) -> Self {
        Self { weight_ratio }
    }

    #[must_use]
    pub fn weight_ratio(&self) -> f64 {
        self.weight_ratio
    }
}

impl StateEvaluator for MaterialAdvantage {
    fn estimate(&self, state: &GameState, perspective: Player) -> f64 {
        let board = state.board();
        let opponent = perspective.opposite();
        let by_count = balance(board.count(perspective), board.count(opponent));
        let by_moves = balance(
            board.legal_move_count_for(perspective),
            board.legal_move_count_for(opponent),
        );
        self.weight_ratio * by_count + (self.weight_ratio - 1.0) * by_moves
    }
}

/// Positional heuristic: discs weighted by location, penalized for exposure.
///
/// Corner and edge weights fade towards `1` as the board fills up; they apply fully
/// on an empty board and vanish once a quarter of the cells is left:
///
/// ```text
/// significance = max(0, 4/3 * empty / CELLS - 1/3)
/// weight       = 1 + significance * (raw_weight - 1)
/// ```
///
/// Each occupied cell contributes `weight + insider_ratio * different / occupied`
/// over its occupied neighbours (the second term is dropped when it has none),
/// positive for the perspective's discs and negative otherwise. The sum is divided
/// by `Σ weight + insider_ratio * occupied_cells`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionalAdvantage {
    corner_weight: f64,
    side_weight: f64,
    insider_ratio: f64,
}

impl PositionalAdvantage {
    #[must_use]
    pub const fn new(corner_weight: f64, side_weight: f64, insider_ratio: f64) -> Self {
        Self {
            corner_weight,
            side_weight,
            insider_ratio,
        }
    }

    #[must_use]
    pub fn corner_weight(&self) -> f64 {
        self.corner_weight
    }

    #[must_use]
    pub fn side_weight(&self) -> f64 {
        self.side_weight
    }

    #[must_use]
    pub fn insider_ratio(&self) -> f64 {
        self.insider_ratio
    }
}

/// How much location weights still matter given the number of empty cells.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn position_significance(empty_count: usize) -> f64 {
    let empty_ratio = empty_count as f64 / CELL_COUNT as f64;
    (4.0 / 3.0 * empty_ratio - 1.0 / 3.0).max(0.0)
}

impl StateEvaluator for PositionalAdvantage {
    #[expect(clippy::cast_precision_loss)]
    fn estimate(&self, state: &GameState, perspective: Player) -> f64 {
        let board = state.board();
        let significance = position_significance(board.empty_count());

        let mut value = 0.0;
        let mut weight_sum = 0.0;
        let mut occupied = 0_usize;
        for (pos, cell) in board.cells() {
            let Some(owner) = cell else {
                continue;
            };
            occupied += 1;

            let raw_weight = if pos.is_corner() {
                self.corner_weight
            } else if pos.is_edge() {
                self.side_weight
            } else {
                1.0
            };
            let weight = 1.0 + significance * (raw_weight - 1.0);
            weight_sum += weight;

            let mut around = 0_usize;
            let mut different = 0_usize;
            for neighbor in pos.neighbors().filter_map(|n| board.get(n)) {
                around += 1;
                if neighbor != owner {
                    different += 1;
                }
            }

            let mut contribution = weight;
            if around > 0 {
                contribution += self.insider_ratio * different as f64 / around as f64;
            }
            if owner == perspective {
                value += contribution;
            } else {
                value -= contribution;
            }
        }

        let denominator = weight_sum + self.insider_ratio * occupied as f64;
        if denominator.abs() <= f64::EPSILON {
            return 0.0;
        }
        value / denominator
    }
}

#[cfg(test)]
mod tests {
    use reversi_engine::{Board, Position};

    use super::*;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_terminal_utility() {
        let mut board = Board::EMPTY;
        board.set(pos(0, 0), Some(Player::Black));
        board.set(pos(0, 1), Some(Player::Black));
        board.set(pos(7, 7), Some(Player::White));
        let state = GameState::from_board(board, Player::White);
        assert!(state.is_terminal());
        assert_eq!(terminal_utility(&state, Player::Black), 1.0);
        assert_eq!(terminal_utility(&state, Player::White), -1.0);
        assert_eq!(terminal_utility(&GameState::new_initial(), Player::Black), 0.0);
    }

    #[test]
    fn test_material_after_first_move() {
        let mut state = GameState::new_initial();
        state.apply_move(pos(2, 4)).unwrap();
        // Black now has 4 discs against 1.
        let by_count = 2.0 * 4.0 / 5.0 - 1.0;
        let black_moves = state.board().legal_move_count_for(Player::Black) as f64;
        let white_moves = state.board().legal_move_count_for(Player::White) as f64;
        let by_moves = 2.0 * black_moves / (black_moves + white_moves) - 1.0;

        let material = MaterialAdvantage::new(1.5);
        assert_close(
            material.estimate(&state, Player::Black),
            1.5 * by_count + 0.5 * by_moves,
        );
        assert_close(
            material.estimate(&state, Player::White),
            -material.estimate(&state, Player::Black),
        );
    }

    #[test]
    fn test_material_zero_denominator() {
        let state = GameState::from_board(Board::EMPTY, Player::Black);
        assert_eq!(MaterialAdvantage::new(2.0).estimate(&state, Player::Black), 0.0);
    }

    #[test]
    fn test_significance_bounds() {
        assert_close(position_significance(CELL_COUNT), 1.0);
        assert_close(position_significance(CELL_COUNT / 4), 0.0);
        assert_close(position_significance(0), 0.0);
    }

    #[test]
    fn test_positional_initial_is_balanced() {
        let state = GameState::new_initial();
        let positional = PositionalAdvantage::new(4.0, 2.0, 0.5);
        assert_close(positional.estimate(&state, Player::Black), 0.0);
    }

    #[test]
    fn test_positional_lone_corner() {
        let mut board = Board::EMPTY;
        board.set(pos(0, 0), Some(Player::Black));
        let state = GameState::from_board(board, Player::Black);
        let positional = PositionalAdvantage::new(4.0, 2.0, 1.0);
        // A lone disc has no neighbours, so only its weight counts on both sides.
        let weight = 1.0 + position_significance(CELL_COUNT - 1) * 3.0;
        let expected = weight / (weight + 1.0);
        assert_close(positional.estimate(&state, Player::Black), expected);
        assert_close(positional.estimate(&state, Player::White), -expected);
    }

    #[test]
    fn test_positional_empty_board() {
        let state = GameState::from_board(Board::EMPTY, Player::Black);
        let positional = PositionalAdvantage::new(4.0, 2.0, 0.0);
        assert_eq!(positional.estimate(&state, Player::Black), 0.0);
    }
}
