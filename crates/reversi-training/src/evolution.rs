//! The generational loop of the tuner.
//!
//! Each generation:
//!
//! 1. **Breed** - [`next_generation`] groups genomes by type name and, for every
//!    ordered pair within a group, keeps self-pairs as they are and otherwise emits
//!    the crossover child plus two independent mutations of it
//! 2. **Sample** - If the pool exceeds `selection_capacity`, a uniform random sample
//!    of that size is kept
//! 3. **Tournament** - A round robin ([`run_tournament`]) scores every candidate
//! 4. **Select** - Disqualified candidates are dropped, the rest are sorted by
//!    fitness (descending, stable) and truncated to the population size
//!
//! The loop ends when the population becomes empty or after `max_generations`
//! completed generations.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use rand::SeedableRng;
//! use rand_pcg::Pcg64;
//! use reversi_training::{
//!     evolution::{EvolutionConfig, default_population, run_evolution},
//!     factory::{AgentFactories, AlphaBetaAgentFactory},
//! };
//!
//! let population = default_population();
//! let factories = AgentFactories::for_population(&population, Arc::new(AlphaBetaAgentFactory));
//! let config = EvolutionConfig {
//!     max_generations: Some(3),
//!     ..EvolutionConfig::default()
//! };
//! let mut rng = Pcg64::seed_from_u64(0);
//! let survivors = run_evolution(population, &factories, &config, &mut rng, |report| {
//!     eprintln!("{report}");
//! })
//! .unwrap();
//! ```

use std::fmt;

use rand::{Rng, seq::IndexedRandom};
use reversi_stats::descriptive::DescriptiveStats;
use serde::{Deserialize, Serialize};

use crate::{
    GenomeError, TuningError,
    factory::AgentFactories,
    fitness::Score,
    genome::{Genome, MutationSigmas},
    tournament::{DisqualificationReason, TournamentConfig, run_tournament},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Maximum number of candidates entering each tournament.
    pub selection_capacity: Option<usize>,
    /// Number of survivors per generation; defaults to the initial population length.
    pub population_size: Option<usize>,
    /// Number of generations to run; unbounded when `None`.
    pub max_generations: Option<usize>,
    pub sigmas: MutationSigmas,
    pub tournament: TournamentConfig,
}

/// The initial population used when none is supplied.
///
/// Every combination of the heuristics {material 0.5, material 2, positional
/// (4, 2, 0)} with the depths {const 0.5, variable (0.5 | 2, 0.5 | 9.5)}.
#[must_use]
pub fn default_population() -> Vec<Genome> {
    let heuristics = [
        Genome::material(0.5),
        Genome::material(2.0),
        Genome::positional(4.0, 2.0, 0.0),
    ];
    let mut depths = vec![Genome::const_depth(0.5)];
    for mid in [0.5, 2.0] {
        for end in [0.5, 9.5] {
            depths.push(Genome::variable_depth(mid, end));
        }
    }

    heuristics
        .iter()
        .flat_map(|heuristic| {
            depths
                .iter()
                .map(move |depth| Genome::combined(heuristic.clone(), depth.clone()))
        })
        .collect()
}

/// Breeds the candidate pool of the next generation.
///
/// Type-name groups are visited in order of first appearance.
pub fn next_generation<R>(
    population: &[Genome],
    sigmas: &MutationSigmas,
    rng: &mut R,
) -> Result<Vec<Genome>, GenomeError>
where
    R: Rng + ?Sized,
{
    let mut groups: Vec<(String, Vec<&Genome>)> = Vec::new();
    for genome in population {
        let type_name = genome.type_name();
        match groups.iter_mut().find(|(name, _)| *name == type_name) {
            Some((_, members)) => members.push(genome),
            None => groups.push((type_name, vec![genome])),
        }
    }

    let mut result = Vec::new();
    for (_, members) in &groups {
        for (i, first) in members.iter().enumerate() {
            for (j, second) in members.iter().enumerate() {
                if i == j {
                    result.push((*first).clone());
                    continue;
                }
                let child = first.crossover(second, rng)?;
                let mutant1 = child.mutate(sigmas, rng);
                let mutant2 = child.mutate(sigmas, rng);
                result.extend([child, mutant1, mutant2]);
            }
        }
    }
    Ok(result)
}

/// A surviving genome with its tournament score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedGenome {
    pub genome: Genome,
    pub score: Score,
    pub fitness: f64,
}

/// Summary of one completed generation.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub generation: usize,
    /// Number of candidates that entered the tournament.
    pub candidates: usize,
    pub games_played: usize,
    pub total_avg_time: f64,
    pub disqualified: Vec<(Genome, DisqualificationReason)>,
    /// Survivors, best first.
    pub survivors: Vec<RankedGenome>,
}

impl GenerationReport {
    /// Fitness distribution of the survivors.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.survivors.iter().map(|ranked| ranked.fitness))
    }

    #[must_use]
    pub fn best(&self) -> Option<&RankedGenome> {
        self.survivors.first()
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Generation #{}", self.generation)?;
        for ranked in &self.survivors {
            writeln!(
                f,
                ">>> {}, {}: {}",
                ranked.genome.type_name(),
                ranked.genome,
                ranked.score
            )?;
        }
        Ok(())
    }
}

/// Runs the tuner and returns the last ranked population.
///
/// `on_generation` is called after every completed generation. Factories are checked
/// against the initial population before anything runs.
pub fn run_evolution<R, F>(
    initial: Vec<Genome>,
    factories: &AgentFactories,
    config: &EvolutionConfig,
    rng: &mut R,
    mut on_generation: F,
) -> Result<Vec<RankedGenome>, TuningError>
where
    R: Rng + ?Sized,
    F: FnMut(&GenerationReport),
{
    factories.check(&initial)?;
    let population_size = config.population_size.unwrap_or(initial.len());

    let mut population = initial;
    let mut ranked = Vec::new();
    let mut generation = 0;
    while !population.is_empty() {
        if config
            .max_generations
            .is_some_and(|max_generations| generation >= max_generations)
        {
            break;
        }
        generation += 1;

        let mut candidates = next_generation(&population, &config.sigmas, rng)?;
        if let Some(capacity) = config.selection_capacity
            && candidates.len() > capacity
        {
            candidates = candidates.choose_multiple(rng, capacity).cloned().collect();
        }
        tracing::debug!(
            generation,
            candidates = candidates.len(),
            games = candidates.len() * candidates.len().saturating_sub(1),
            "starting tournament"
        );

        let candidate_count = candidates.len();
        let outcome = run_tournament(&candidates, factories, &config.tournament)?;
        let total_avg_time = outcome.total_time.avg();

        let mut disqualified = Vec::new();
        let mut survivors = Vec::new();
        for (index, (genome, score)) in candidates.into_iter().zip(outcome.scores).enumerate() {
            if let Some(reason) = outcome.disqualified.get(&index) {
                disqualified.push((genome, reason.clone()));
            } else {
                let fitness = score.fitness(total_avg_time);
                survivors.push(RankedGenome {
                    genome,
                    score,
                    fitness,
                });
            }
        }
        survivors.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        survivors.truncate(population_size);

        let report = GenerationReport {
            generation,
            candidates: candidate_count,
            games_played: outcome.games_played,
            total_avg_time,
            disqualified,
            survivors,
        };
        match report.best() {
            Some(best) => tracing::info!(
                generation,
                survivors = report.survivors.len(),
                disqualified = report.disqualified.len(),
                best_fitness = best.fitness,
                best = %best.genome,
                "generation complete"
            ),
            None => tracing::warn!(generation, "no genome survived the tournament"),
        }
        on_generation(&report);

        population = report
            .survivors
            .iter()
            .map(|ranked| ranked.genome.clone())
            .collect();
        ranked = report.survivors;
    }

    Ok(ranked)
}
