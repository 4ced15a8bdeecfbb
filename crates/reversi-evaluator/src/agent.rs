//! Players that pick moves.
//!
//! An [`Agent`] receives the current [`GameState`] by shared reference and answers
//! with a legal move; it never mutates the game it is shown.
//!
//! - [`AlphaBetaAgent`] - Searches with a [`DepthPolicy`] and a heuristic
//! - [`RandomAgent`] - Picks uniformly among legal moves
//!
//! [`material_agent`] and [`positional_agent`] build alpha-beta agents for the two
//! heuristic families.

use std::fmt;

use rand::{Rng, seq::IteratorRandom};
use reversi_engine::{GameState, Player, Position};

use crate::{
    SearchError,
    depth::DepthPolicy,
    heuristic::{MaterialAdvantage, PositionalAdvantage, StateEvaluator},
    search::{AlphaBeta, SearchResult},
};

pub trait Agent: fmt::Debug {
    /// Chooses a move for the player to move in `state`.
    fn select_move(&mut self, state: &GameState) -> Result<Position, SearchError>;
}

impl<A> Agent for Box<A>
where
    A: Agent + ?Sized,
{
    fn select_move(&mut self, state: &GameState) -> Result<Position, SearchError> {
        (**self).select_move(state)
    }
}

/// Agent that plays the first move of an alpha-beta best line.
///
/// The depth policy is consulted on every decision, always from the point of view
/// of the player the agent was built for.
///
/// # Example
///
/// ```
/// use reversi_engine::{GameState, Player};
/// use reversi_evaluator::{
///     agent::{Agent, material_agent},
///     depth::FixedDepth,
/// };
///
/// let state = GameState::new_initial();
/// let mut agent = material_agent(Player::Black, Box::new(FixedDepth(2)), 1.5);
/// let mv = agent.select_move(&state).unwrap();
/// assert!(state.is_legal(mv));
/// ```
#[derive(Debug)]
pub struct AlphaBetaAgent {
    player: Player,
    depth: Box<dyn DepthPolicy>,
    search: AlphaBeta,
}

impl AlphaBetaAgent {
    #[must_use]
    pub fn new(player: Player, depth: Box<dyn DepthPolicy>, search: AlphaBeta) -> Self {
        Self {
            player,
            depth,
            search,
        }
    }

    #[must_use]
    pub fn player(&self) -> Player {
        self.player
    }

    /// Runs the full search and returns the predicted line.
    pub fn plan(&self, state: &GameState) -> Result<SearchResult, SearchError> {
        if state.is_terminal() {
            return Err(SearchError::NoLegalMoves);
        }
        let max_depth = self.depth.max_depth(state, self.player);
        self.search.search(state, self.player, max_depth)
    }
}

impl Agent for AlphaBetaAgent {
    fn select_move(&mut self, state: &GameState) -> Result<Position, SearchError> {
        let result = self.plan(state)?;
        let best = result.best_move().ok_or(SearchError::NoLegalMoves)?;
        tracing::trace!(
            player = %self.player,
            best = %best,
            nodes = result.nodes,
            "alpha-beta decision"
        );
        Ok(best)
    }
}

fn alpha_beta_agent(
    player: Player,
    depth: Box<dyn DepthPolicy>,
    evaluator: Box<dyn StateEvaluator>,
) -> AlphaBetaAgent {
    AlphaBetaAgent::new(player, depth, AlphaBeta::new(evaluator))
}

/// Builds an alpha-beta agent driven by [`MaterialAdvantage`].
#[must_use]
pub fn material_agent(
    player: Player,
    depth: Box<dyn DepthPolicy>,
    weight_ratio: f64,
) -> AlphaBetaAgent {
    alpha_beta_agent(player, depth, Box::new(MaterialAdvantage::new(weight_ratio)))
}

/// Builds an alpha-beta agent driven by [`PositionalAdvantage`].
#[must_use]
pub fn positional_agent(
    player: Player,
    depth: Box<dyn DepthPolicy>,
    corner_weight: f64,
    side_weight: f64,
    insider_ratio: f64,
) -> AlphaBetaAgent {
    alpha_beta_agent(
        player,
        depth,
        Box::new(PositionalAdvantage::new(
            corner_weight,
            side_weight,
            insider_ratio,
        )),
    )
}

/// Agent that picks uniformly among the legal moves.
#[derive(Debug, Clone)]
pub struct RandomAgent<R> {
    rng: R,
}

impl<R> RandomAgent<R>
where
    R: Rng,
{
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R> Agent for RandomAgent<R>
where
    R: Rng + fmt::Debug,
{
    fn select_move(&mut self, state: &GameState) -> Result<Position, SearchError> {
        state
            .legal_moves()
            .choose(&mut self.rng)
            .ok_or(SearchError::NoLegalMoves)
    }
}
