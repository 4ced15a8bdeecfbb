//! Game-tree search and heuristic players for Reversi.
//!
//! The crate is layered the same way a decision is made:
//!
//! ```text
//! Agent (pick a move for the player to move)
//!     ↓ uses
//! AlphaBeta search (explore plies up to the policy's horizon)
//!     ↓ uses
//! StateEvaluator (score positions at the horizon)
//! ```
//!
//! - [`heuristic`] - Terminal utility, material and positional estimators
//! - [`depth`] - Fixed and phase-dependent search horizons
//! - [`search`] - Alpha-beta with best-line reconstruction and move ordering
//! - [`agent`] - The [`Agent`](agent::Agent) trait, alpha-beta and random agents
//!
//! Search is single-threaded and deterministic for a given position, depth and move
//! order.

pub mod agent;
pub mod depth;
pub mod heuristic;
pub mod search;

use reversi_engine::InvalidMove;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SearchError {
    #[display("search depth must be at least one ply")]
    NonPositiveDepth,
    #[display("no legal moves: the game is over")]
    NoLegalMoves,
    #[display("search tried an illegal move")]
    IllegalMove(InvalidMove),
}

impl From<InvalidMove> for SearchError {
    fn from(err: InvalidMove) -> Self {
        Self::IllegalMove(err)
    }
}
