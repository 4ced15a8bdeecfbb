//! Turning genomes into playing agents.
//!
//! The tuner never interprets genome attributes itself. It looks up an
//! [`AgentFactory`] by the genome's [type name](crate::genome::Genome::type_name) in
//! an [`AgentFactories`] registry and asks it for an agent.

use std::{collections::BTreeMap, fmt, sync::Arc};

use reversi_engine::Player;
use reversi_evaluator::{
    agent::{Agent, material_agent, positional_agent},
    depth::{DepthPolicy, FixedDepth, PhaseDepth},
};

use crate::{
    GenomeError, TuningError,
    genome::{
        CORNER_WEIGHT, END_MAX_DEPTH, Genome, INSIDER_RATIO, MAX_DEPTH_ATTR, MID_MAX_DEPTH,
        SIDE_WEIGHT, WEIGHT_RATIO,
    },
};

/// Builds an agent playing `player` from a genome.
pub trait AgentFactory: fmt::Debug + Send + Sync {
    fn build(&self, player: Player, genome: &Genome) -> Result<Box<dyn Agent>, GenomeError>;
}

/// Default factory for heuristic/depth genomes.
///
/// - A genome with `weight_ratio` gets a material agent; otherwise a positional
///   agent built from `corner_weight`, `side_weight` and `insider_ratio`.
/// - A genome with `max_depth` (in full moves) searches a fixed
///   `ceil(2 * max_depth)` plies; otherwise a [`PhaseDepth`] uses
///   `ceil(mid_max_depth)` and `ceil(end_max_depth)` plies.
///
/// # Example
///
/// ```
/// use reversi_engine::{GameState, Player};
/// use reversi_training::{
///     factory::{AgentFactory, AlphaBetaAgentFactory},
///     genome::Genome,
/// };
///
/// let genome = Genome::combined(Genome::material(2.0), Genome::const_depth(0.5));
/// let mut agent = AlphaBetaAgentFactory.build(Player::Black, &genome).unwrap();
/// let state = GameState::new_initial();
/// assert!(state.is_legal(agent.select_move(&state).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphaBetaAgentFactory;

impl AlphaBetaAgentFactory {
    /// Resolves the depth policy encoded in `genome`.
    pub fn depth_policy(genome: &Genome) -> Result<Box<dyn DepthPolicy>, GenomeError> {
        if let Some(max_depth) = genome.get(MAX_DEPTH_ATTR) {
            return Ok(Box::new(FixedDepth(ceil_plies(2.0 * max_depth))));
        }
        let middle = ceil_plies(genome.require(MID_MAX_DEPTH)?);
        let end = ceil_plies(genome.require(END_MAX_DEPTH)?);
        Ok(Box::new(PhaseDepth::new(middle, end)))
    }
}

impl AgentFactory for AlphaBetaAgentFactory {
    fn build(&self, player: Player, genome: &Genome) -> Result<Box<dyn Agent>, GenomeError> {
        let depth = Self::depth_policy(genome)?;
        if let Some(weight_ratio) = genome.get(WEIGHT_RATIO) {
            return Ok(Box::new(material_agent(player, depth, weight_ratio)));
        }
        Ok(Box::new(positional_agent(
            player,
            depth,
            genome.require(CORNER_WEIGHT)?,
            genome.require(SIDE_WEIGHT)?,
            genome.require(INSIDER_RATIO)?,
        )))
    }
}

/// Rounds a depth up to whole plies; negative and NaN values become 0.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ceil_plies(depth: f64) -> u32 {
    depth.ceil().max(0.0) as u32
}

/// Agent factories keyed by genome type name.
#[derive(Debug, Clone, Default)]
pub struct AgentFactories {
    factories: BTreeMap<String, Arc<dyn AgentFactory>>,
}

impl AgentFactories {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` for every type name that occurs in `population`.
    #[must_use]
    pub fn for_population(population: &[Genome], factory: Arc<dyn AgentFactory>) -> Self {
        let mut factories = Self::new();
        for genome in population {
            factories.insert(genome.type_name(), Arc::clone(&factory));
        }
        factories
    }

    pub fn insert(&mut self, type_name: impl Into<String>, factory: Arc<dyn AgentFactory>) {
        self.factories.insert(type_name.into(), factory);
    }

    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&dyn AgentFactory> {
        self.factories.get(type_name).map(AsRef::as_ref)
    }

    /// Fails if any genome in `population` has no registered factory.
    pub fn check(&self, population: &[Genome]) -> Result<(), TuningError> {
        for genome in population {
            let type_name = genome.type_name();
            if !self.factories.contains_key(&type_name) {
                return Err(TuningError::MissingFactory { type_name });
            }
        }
        Ok(())
    }

    /// Builds an agent for `genome`.
    pub fn build(&self, player: Player, genome: &Genome) -> Result<Box<dyn Agent>, TuningError> {
        let type_name = genome.type_name();
        let factory = self
            .get(&type_name)
            .ok_or(TuningError::MissingFactory { type_name })?;
        Ok(factory.build(player, genome)?)
    }
}

#[cfg(test)]
mod tests {
    use reversi_engine::{Board, CELL_COUNT, GameState, Position};

    use super::*;

    #[test]
    fn test_const_depth_is_doubled() {
        let state = GameState::new_initial();
        for (max_depth, plies) in [(0.5, 1), (1.0, 2), (1.2, 3), (2.0, 4)] {
            let policy = AlphaBetaAgentFactory::depth_policy(&Genome::const_depth(max_depth))
                .unwrap();
            assert_eq!(policy.max_depth(&state, Player::Black), plies);
        }
    }

    fn state_with_empty_cells(empty: usize) -> GameState {
        let mut board = Board::EMPTY;
        for pos in Position::all().take(CELL_COUNT - empty) {
            board.set(pos, Some(Player::Black));
        }
        GameState::from_board(board, Player::White)
    }

    #[test]
    fn test_variable_depth_is_rounded_up() {
        let policy =
            AlphaBetaAgentFactory::depth_policy(&Genome::variable_depth(2.2, 9.5)).unwrap();
        assert_eq!(policy.max_depth(&state_with_empty_cells(60), Player::Black), 2);
        assert_eq!(policy.max_depth(&state_with_empty_cells(30), Player::Black), 3);
        assert_eq!(policy.max_depth(&state_with_empty_cells(5), Player::Black), 10);
    }

    #[test]
    fn test_missing_attributes() {
        assert!(matches!(
            AlphaBetaAgentFactory.build(Player::Black, &Genome::material(1.0)),
            Err(GenomeError::MissingAttribute { .. })
        ));
        assert!(matches!(
            AlphaBetaAgentFactory.build(Player::Black, &Genome::const_depth(1.0)),
            Err(GenomeError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_registry_lookup() {
        let population = vec![
            Genome::combined(Genome::material(1.0), Genome::const_depth(0.5)),
            Genome::combined(Genome::positional(4.0, 2.0, 0.0), Genome::const_depth(0.5)),
        ];
        let factories =
            AgentFactories::for_population(&population[..1], Arc::new(AlphaBetaAgentFactory));
        assert!(factories.build(Player::White, &population[0]).is_ok());
        assert!(matches!(
            factories.check(&population),
            Err(TuningError::MissingFactory { type_name })
                if type_name == "Position adv. with const depth"
        ));
    }
}
