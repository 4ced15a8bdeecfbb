//! Depth-limited alpha-beta search.
//!
//! The search explores the game tree from the current position, alternating MAX
//! nodes (the perspective player to move) and MIN nodes (the opponent to move).
//! When a move makes the opponent pass, the child keeps the same role, since the
//! same player moves again.
//!
//! # Leaves
//!
//! A branch ends at a finished game, scored exactly with
//! [`terminal_utility`](crate::heuristic::terminal_utility), or at the depth horizon,
//! scored with the configured [`StateEvaluator`]. Termination is checked first.
//!
//! # Best line
//!
//! Every node returns the line that produced its value, so the top-level result is
//! the whole predicted continuation ([`SearchResult::plan`]), not only the first
//! move. The plan is never longer than the search depth and is shorter when the game
//! ends along the line.
//!
//! # Example
//!
//! ```
//! use reversi_engine::{GameState, Player};
//! use reversi_evaluator::{heuristic::MaterialAdvantage, search::AlphaBeta};
//!
//! let state = GameState::new_initial();
//! let search = AlphaBeta::new(Box::new(MaterialAdvantage::new(1.0)));
//! let result = search.search(&state, Player::Black, 3).unwrap();
//!
//! assert_eq!(result.plan.len(), 3);
//! assert!(state.is_legal(result.plan[0]));
//! ```

use std::fmt;

use reversi_engine::{GameState, Player, Position};

use crate::{
    SearchError,
    heuristic::{StateEvaluator, terminal_utility},
};

/// Reorders the moves of a node before they are explored.
///
/// Good orderings visit strong moves first and let the search prune more.
pub trait MoveOrdering: fmt::Debug + Send + Sync {
    fn order(&self, state: &GameState, perspective: Player, moves: &mut [Position]);
}

/// Explores corners first, then edges, then interior cells, keeping row-major order
/// within each group.
#[derive(Debug, Clone, Copy, Default)]
pub struct CornersFirst;

impl MoveOrdering for CornersFirst {
    fn order(&self, _state: &GameState, _perspective: Player, moves: &mut [Position]) {
        moves.sort_by_key(|pos| {
            if pos.is_corner() {
                0
            } else if pos.is_edge() {
                1
            } else {
                2
            }
        });
    }
}

/// Outcome of a top-level search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Predicted best line, starting with the move to play.
    pub plan: Vec<Position>,
    /// Value of the line for the perspective player. `None` when the only legal move
    /// was returned without being scored.
    pub value: Option<f64>,
    /// Number of nodes visited.
    pub nodes: u64,
}

impl SearchResult {
    #[must_use]
    pub fn best_move(&self) -> Option<Position> {
        self.plan.first().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Max,
    Min,
}

impl Role {
    fn other(self) -> Self {
        match self {
            Self::Max => Self::Min,
            Self::Min => Self::Max,
        }
    }
}

/// Alpha-beta searcher with a horizon evaluator and an optional move ordering.
#[derive(Debug)]
pub struct AlphaBeta {
    evaluator: Box<dyn StateEvaluator>,
    ordering: Option<Box<dyn MoveOrdering>>,
}

impl AlphaBeta {
    #[must_use]
    pub fn new(evaluator: Box<dyn StateEvaluator>) -> Self {
        Self {
            evaluator,
            ordering: None,
        }
    }

    /// Applies `ordering` to the moves of every node, MAX and MIN alike.
    #[must_use]
    pub fn with_ordering(mut self, ordering: Box<dyn MoveOrdering>) -> Self {
        self.ordering = Some(ordering);
        self
    }

    #[must_use]
    pub fn evaluator(&self) -> &dyn StateEvaluator {
        self.evaluator.as_ref()
    }

    /// Searches `max_depth` plies ahead from `state` for `perspective`.
    ///
    /// The root is a MAX node. When the root has exactly one legal move it is
    /// returned immediately, unscored.
    pub fn search(
        &self,
        state: &GameState,
        perspective: Player,
        max_depth: u32,
    ) -> Result<SearchResult, SearchError> {
        if max_depth == 0 {
            return Err(SearchError::NonPositiveDepth);
        }

        if state.legal_move_count() == 1
            && let Some(only) = state.legal_moves().next()
        {
            return Ok(SearchResult {
                plan: vec![only],
                value: None,
                nodes: 1,
            });
        }

        let mut ctx = SearchContext {
            evaluator: self.evaluator.as_ref(),
            ordering: self.ordering.as_deref(),
            perspective,
            max_depth,
            nodes: 0,
        };
        let (value, plan) =
            ctx.node_value(state, Role::Max, 0, f64::NEG_INFINITY, f64::INFINITY)?;
        Ok(SearchResult {
            plan,
            value: Some(value),
            nodes: ctx.nodes,
        })
    }
}

struct SearchContext<'a> {
    evaluator: &'a dyn StateEvaluator,
    ordering: Option<&'a dyn MoveOrdering>,
    perspective: Player,
    max_depth: u32,
    nodes: u64,
}

impl SearchContext<'_> {
    fn node_value(
        &mut self,
        state: &GameState,
        role: Role,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
    ) -> Result<(f64, Vec<Position>), SearchError> {
        self.nodes += 1;
        if state.is_terminal() {
            return Ok((terminal_utility(state, self.perspective), Vec::new()));
        }
        if depth >= self.max_depth {
            return Ok((self.evaluator.estimate(state, self.perspective), Vec::new()));
        }

        let mut moves = state.legal_moves().collect::<Vec<_>>();
        if let Some(ordering) = self.ordering {
            ordering.order(state, self.perspective, &mut moves);
        }

        let mut best_value = match role {
            Role::Max => f64::NEG_INFINITY,
            Role::Min => f64::INFINITY,
        };
        let mut best_line = Vec::new();

        for mv in moves {
            let (child, _) = state.with_move(mv)?;
            let child_role = if child.current_player() == state.current_player() {
                role
            } else {
                role.other()
            };
            let (value, child_line) = self.node_value(&child, child_role, depth + 1, alpha, beta)?;

            let improved = match role {
                Role::Max => value > best_value,
                Role::Min => value < best_value,
            };
            if improved {
                best_value = value;
                best_line.clear();
                best_line.push(mv);
                best_line.extend(child_line);
            }

            match role {
                Role::Max => {
                    if best_value >= beta {
                        break;
                    }
                    alpha = alpha.max(best_value);
                }
                Role::Min => {
                    if best_value <= alpha {
                        break;
                    }
                    beta = beta.min(best_value);
                }
            }
        }

        Ok((best_value, best_line))
    }
}
