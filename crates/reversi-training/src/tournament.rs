//! Round-robin tournaments between genomes.
//!
//! Every ordered pair of distinct genomes plays one game, the first as Black and the
//! second as White, on a fresh [`GameState`]. Each decision is timed with the wall
//! clock; the time limit is checked after the decision returns, never
//! preemptively.
//!
//! # Disqualification
//!
//! A genome is disqualified for the rest of the tournament when its agent
//!
//! - takes longer than [`TournamentConfig::move_time_limit`] for one decision,
//! - cannot be built by its factory,
//! - returns an error instead of a move, or
//! - returns an illegal move.
//!
//! The game in progress is abandoned without a result; decision times recorded
//! before the offending decision are kept. Games involving an already disqualified
//! genome are skipped.
//!
//! # Parallelism
//!
//! Games are distributed over [`TournamentConfig::workers`] scoped threads in a fixed
//! schedule order. With one worker the schedule is strictly sequential and the run
//! is deterministic apart from timings. With more workers a game that was already in
//! flight when one of its genomes got disqualified still finishes and its samples
//! are kept.

use std::{
    collections::BTreeMap,
    fmt,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use reversi_engine::{GameResult, GameState, Player, Position};
use reversi_evaluator::agent::Agent;
use reversi_stats::accumulator::Accumulator;
use serde::{Deserialize, Serialize};

use crate::{TuningError, factory::AgentFactories, fitness::Score, genome::Genome};

/// Default per-decision time budget.
pub const DEFAULT_MOVE_TIME_LIMIT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub move_time_limit: Duration,
    /// Number of worker threads; `0` is treated as `1`.
    pub workers: usize,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            move_time_limit: DEFAULT_MOVE_TIME_LIMIT,
            workers: 1,
        }
    }
}

/// Why a genome was removed from a tournament.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum DisqualificationReason {
    #[display("decision took {:.3}s, over the limit of {:.3}s", elapsed.as_secs_f64(), limit.as_secs_f64())]
    TooSlow { elapsed: Duration, limit: Duration },
    #[display("agent could not be built: {message}")]
    FactoryFailed { message: String },
    #[display("agent failed to move: {message}")]
    AgentError { message: String },
    #[display("agent played illegal move {position}")]
    IllegalMove { position: Position },
}

/// How a single game ended.
#[derive(Debug, Clone, PartialEq)]
pub enum GameOutcome {
    Finished(GameResult),
    Disqualified {
        player: Player,
        reason: DisqualificationReason,
    },
}

/// Result of one game together with the decision times of each side.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub outcome: GameOutcome,
    /// Decision times in seconds, indexed by [`Player::index`].
    pub decision_times: [Accumulator; 2],
    pub plies: usize,
}

/// Plays one game from the initial position.
///
/// `agents` is indexed by [`Player::index`] (Black first).
pub fn play_game(agents: [&mut dyn Agent; 2], move_time_limit: Duration) -> GameRecord {
    let [black, white] = agents;
    let mut state = GameState::new_initial();
    let mut decision_times = [Accumulator::new(), Accumulator::new()];
    let mut plies = 0;

    let disqualify = |player, reason, decision_times, plies| GameRecord {
        outcome: GameOutcome::Disqualified { player, reason },
        decision_times,
        plies,
    };

    while !state.is_terminal() {
        let player = state.current_player();
        let agent: &mut dyn Agent = match player {
            Player::Black => &mut *black,
            Player::White => &mut *white,
        };

        let start = Instant::now();
        let decision = agent.select_move(&state);
        let elapsed = start.elapsed();

        let position = match decision {
            Ok(position) => position,
            Err(err) => {
                let reason = DisqualificationReason::AgentError {
                    message: err.to_string(),
                };
                return disqualify(player, reason, decision_times, plies);
            }
        };
        if elapsed > move_time_limit {
            let reason = DisqualificationReason::TooSlow {
                elapsed,
                limit: move_time_limit,
            };
            return disqualify(player, reason, decision_times, plies);
        }
        decision_times[player.index()].add(elapsed.as_secs_f64());

        if state.apply_move(position).is_err() {
            let reason = DisqualificationReason::IllegalMove { position };
            return disqualify(player, reason, decision_times, plies);
        }
        plies += 1;
    }

    let outcome = match state.result() {
        Some(result) => GameOutcome::Finished(result),
        None => GameOutcome::Finished(GameResult::Draw),
    };
    GameRecord {
        outcome,
        decision_times,
        plies,
    }
}

/// Aggregated results of a tournament.
#[derive(Debug, Clone)]
pub struct TournamentOutcome {
    /// One score per genome, in population order.
    pub scores: Vec<Score>,
    /// Disqualified genomes by population index.
    pub disqualified: BTreeMap<usize, DisqualificationReason>,
    /// Decision times of every genome in every game.
    pub total_time: Accumulator,
    pub games_played: usize,
    pub games_skipped: usize,
}

impl TournamentOutcome {
    #[must_use]
    pub fn is_disqualified(&self, index: usize) -> bool {
        self.disqualified.contains_key(&index)
    }
}

#[derive(Debug)]
struct Tally {
    wins: Vec<Accumulator>,
    times: Vec<Accumulator>,
    disqualified: BTreeMap<usize, DisqualificationReason>,
    total_time: Accumulator,
    games_played: usize,
    games_skipped: usize,
}

impl Tally {
    fn new(size: usize) -> Self {
        Self {
            wins: vec![Accumulator::new(); size],
            times: vec![Accumulator::new(); size],
            disqualified: BTreeMap::new(),
            total_time: Accumulator::new(),
            games_played: 0,
            games_skipped: 0,
        }
    }

    fn disqualify(&mut self, index: usize, genome: &Genome, reason: DisqualificationReason) {
        tracing::warn!(
            genome = %genome,
            type_name = %genome.type_name(),
            %reason,
            "genome disqualified"
        );
        self.disqualified.entry(index).or_insert(reason);
    }

    fn record(&mut self, pairing: [usize; 2], population: &[Genome], record: GameRecord) {
        self.games_played += 1;
        for (player, index) in Player::ALL.into_iter().zip(pairing) {
            let times = &record.decision_times[player.index()];
            self.times[index].merge(times);
            self.total_time.merge(times);
        }
        match record.outcome {
            GameOutcome::Finished(result) => {
                for (player, index) in Player::ALL.into_iter().zip(pairing) {
                    let won = result == GameResult::Winner(player);
                    self.wins[index].add(if won { 1.0 } else { 0.0 });
                }
                tracing::debug!(
                    black = pairing[0],
                    white = pairing[1],
                    ?result,
                    plies = record.plies,
                    "game finished"
                );
            }
            GameOutcome::Disqualified { player, reason } => {
                let index = pairing[player.index()];
                self.disqualify(index, &population[index], reason);
            }
        }
    }

    fn into_outcome(self) -> TournamentOutcome {
        let scores = self
            .wins
            .iter()
            .zip(&self.times)
            .map(|(wins, times)| Score::from_accumulators(wins, times))
            .collect();
        TournamentOutcome {
            scores,
            disqualified: self.disqualified,
            total_time: self.total_time,
            games_played: self.games_played,
            games_skipped: self.games_skipped,
        }
    }
}

/// Runs a full round robin over `population`.
///
/// Fails only if a genome has no registered factory; every per-game problem is
/// recorded as a disqualification instead.
pub fn run_tournament(
    population: &[Genome],
    factories: &AgentFactories,
    config: &TournamentConfig,
) -> Result<TournamentOutcome, TuningError> {
    factories.check(population)?;

    let schedule = (0..population.len())
        .flat_map(|black| {
            (0..population.len())
                .filter(move |white| *white != black)
                .map(move |white| [black, white])
        })
        .collect::<Vec<_>>();
    let next = AtomicUsize::new(0);
    let tally = Mutex::new(Tally::new(population.len()));

    let worker = || {
        loop {
            let Some(&pairing) = schedule.get(next.fetch_add(1, Ordering::Relaxed)) else {
                break;
            };
            play_pairing(pairing, population, factories, config, &tally);
        }
    };

    let workers = config.workers.max(1);
    if workers == 1 {
        worker();
    } else {
        thread::scope(|s| {
            for _ in 0..workers {
                s.spawn(worker);
            }
        });
    }

    let tally = tally.into_inner().unwrap_or_else(PoisonError::into_inner);
    Ok(tally.into_outcome())
}

fn play_pairing(
    pairing: [usize; 2],
    population: &[Genome],
    factories: &AgentFactories,
    config: &TournamentConfig,
    tally: &Mutex<Tally>,
) {
    let lock = || tally.lock().unwrap_or_else(PoisonError::into_inner);

    {
        let mut tally = lock();
        if pairing.iter().any(|index| tally.disqualified.contains_key(index)) {
            tally.games_skipped += 1;
            return;
        }
    }

    let (mut black, mut white) = match build_agents(pairing, population, factories) {
        Ok(agents) => agents,
        Err((index, err)) => {
            let reason = DisqualificationReason::FactoryFailed {
                message: err.to_string(),
            };
            let mut tally = lock();
            tally.disqualify(index, &population[index], reason);
            tally.games_skipped += 1;
            return;
        }
    };

    let record = play_game([black.as_mut(), white.as_mut()], config.move_time_limit);
    lock().record(pairing, population, record);
}

type AgentPair = (Box<dyn Agent>, Box<dyn Agent>);

/// Builds the Black and White agents of a pairing; the error names the genome whose
/// factory failed.
fn build_agents(
    pairing: [usize; 2],
    population: &[Genome],
    factories: &AgentFactories,
) -> Result<AgentPair, (usize, TuningError)> {
    let build = |player: Player| {
        let index = pairing[player.index()];
        factories
            .build(player, &population[index])
            .map_err(|err| (index, err))
    };
    Ok((build(Player::Black)?, build(Player::White)?))
}

impl fmt::Display for TournamentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games played, {} skipped, {} disqualified",
            self.games_played,
            self.games_skipped,
            self.disqualified.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reversi_evaluator::SearchError;

    use super::*;
    use crate::{
        GenomeError,
        factory::{AgentFactory, AlphaBetaAgentFactory},
    };

    fn quick_population() -> Vec<Genome> {
        vec![
            Genome::combined(Genome::material(0.5), Genome::const_depth(0.5)),
            Genome::combined(Genome::material(2.0), Genome::const_depth(0.5)),
            Genome::combined(Genome::positional(4.0, 2.0, 0.0), Genome::const_depth(0.5)),
        ]
    }

    fn default_factories(population: &[Genome]) -> AgentFactories {
        AgentFactories::for_population(population, Arc::new(AlphaBetaAgentFactory))
    }

    /// Always answers with the same cell, legal or not.
    #[derive(Debug)]
    struct Stubborn(Position);

    impl Agent for Stubborn {
        fn select_move(&mut self, _state: &GameState) -> Result<Position, SearchError> {
            Ok(self.0)
        }
    }

    /// Builds [`Stubborn`] agents for material genomes and defers otherwise.
    #[derive(Debug)]
    struct StubbornMaterial;

    impl AgentFactory for StubbornMaterial {
        fn build(&self, player: Player, genome: &Genome) -> Result<Box<dyn Agent>, GenomeError> {
            if genome.get("weight_ratio").is_some() {
                return Ok(Box::new(Stubborn(Position::new(0, 0).unwrap())));
            }
            AlphaBetaAgentFactory.build(player, genome)
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl AgentFactory for Broken {
        fn build(&self, _player: Player, genome: &Genome) -> Result<Box<dyn Agent>, GenomeError> {
            Err(GenomeError::MissingAttribute {
                name: "weight_ratio".to_owned(),
                type_name: genome.type_name(),
            })
        }
    }

    #[test]
    fn test_round_robin_counts() {
        let population = quick_population();
        let outcome = run_tournament(
            &population,
            &default_factories(&population),
            &TournamentConfig::default(),
        )
        .unwrap();

        assert_eq!(outcome.games_played, 6);
        assert_eq!(outcome.games_skipped, 0);
        assert!(outcome.disqualified.is_empty());
        assert_eq!(outcome.scores.len(), 3);
        for score in &outcome.scores {
            assert!((0.0..=1.0).contains(&score.win_ratio));
            assert!(score.avg_time >= 0.0);
        }
        assert!(outcome.total_time.count() > 0);
    }

    #[test]
    fn test_parallel_workers_play_every_game() {
        let population = quick_population();
        let config = TournamentConfig {
            workers: 3,
            ..TournamentConfig::default()
        };
        let outcome =
            run_tournament(&population, &default_factories(&population), &config).unwrap();
        assert_eq!(outcome.games_played, 6);
    }

    #[test]
    fn test_illegal_move_disqualifies() {
        let population = quick_population();
        let mut factories = default_factories(&population);
        factories.insert(population[0].type_name(), Arc::new(StubbornMaterial));

        let outcome =
            run_tournament(&population, &factories, &TournamentConfig::default()).unwrap();
        assert!(matches!(
            outcome.disqualified.get(&0),
            Some(DisqualificationReason::IllegalMove { .. })
        ));
        assert!(outcome.is_disqualified(1));
        assert!(!outcome.is_disqualified(2));
        // 0 vs 1 ends genome 0; 0 vs 2 and 1 vs 0 are skipped; 1 vs 2 ends genome 1;
        // 2 vs 0 and 2 vs 1 are skipped.
        assert_eq!(outcome.games_played, 2);
        assert_eq!(outcome.games_skipped, 4);
    }

    #[test]
    fn test_factory_failure_disqualifies() {
        let population = quick_population();
        let mut factories = default_factories(&population);
        factories.insert(population[2].type_name(), Arc::new(Broken));

        let outcome =
            run_tournament(&population, &factories, &TournamentConfig::default()).unwrap();
        assert!(matches!(
            outcome.disqualified.get(&2),
            Some(DisqualificationReason::FactoryFailed { .. })
        ));
        assert_eq!(outcome.disqualified.len(), 1);
        // 0 vs 1 and 1 vs 0 are the only games played.
        assert_eq!(outcome.games_played, 2);
    }

    #[test]
    fn test_zero_time_limit_disqualifies_first_mover() {
        let population = quick_population();
        let config = TournamentConfig {
            move_time_limit: Duration::ZERO,
            ..TournamentConfig::default()
        };
        let outcome =
            run_tournament(&population, &default_factories(&population), &config).unwrap();
        assert!(matches!(
            outcome.disqualified.get(&0),
            Some(DisqualificationReason::TooSlow { .. })
        ));
        assert_eq!(outcome.scores[0].win_ratio, 0.0);
    }

    #[test]
    fn test_missing_factory_is_an_error() {
        let population = quick_population();
        let factories = default_factories(&population[..2]);
        assert!(matches!(
            run_tournament(&population, &factories, &TournamentConfig::default()),
            Err(TuningError::MissingFactory { .. })
        ));
    }

    #[test]
    fn test_play_game_between_agents() {
        let population = quick_population();
        let mut black = AlphaBetaAgentFactory.build(Player::Black, &population[0]).unwrap();
        let mut white = AlphaBetaAgentFactory.build(Player::White, &population[2]).unwrap();
        let record = play_game([black.as_mut(), white.as_mut()], DEFAULT_MOVE_TIME_LIMIT);

        assert!(matches!(record.outcome, GameOutcome::Finished(_)));
        assert!(record.plies <= 60);
        let decisions = record.decision_times[0].count() + record.decision_times[1].count();
        assert_eq!(decisions, record.plies);
    }
}
