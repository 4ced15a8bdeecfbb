use std::{path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context as _;
use chrono::Utc;
use rand::SeedableRng as _;
use rand_pcg::Pcg64;
use reversi_training::{
    evolution::{self, EvolutionConfig, GenerationReport},
    factory::{AgentFactories, AlphaBetaAgentFactory},
    genome::{DEFAULT_SIGMA, MutationSigmas},
    tournament::TournamentConfig,
};

use crate::{
    model::tuning_report::TuningReport,
    util::{self, Output},
};

/// Mutation σ for one attribute, written as `name=sigma`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SigmaOverride {
    name: String,
    sigma: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub(crate) enum ParseSigmaOverrideError {
    #[display("expected `name=sigma`, got {input:?}")]
    MissingSeparator { input: String },
    #[display("invalid sigma value {value:?}")]
    InvalidValue { value: String },
}

impl FromStr for SigmaOverride {
    type Err = ParseSigmaOverrideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) =
            s.split_once('=')
                .ok_or_else(|| ParseSigmaOverrideError::MissingSeparator {
                    input: s.to_owned(),
                })?;
        let sigma = value
            .trim()
            .parse()
            .map_err(|_| ParseSigmaOverrideError::InvalidValue {
                value: value.to_owned(),
            })?;
        Ok(Self {
            name: name.trim().to_owned(),
            sigma,
        })
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Initial population JSON file (genome array or previous tuning report)
    #[arg(long)]
    population: Option<PathBuf>,
    /// Number of survivors kept per generation
    #[arg(long, default_value_t = 10)]
    population_size: usize,
    /// Number of generations to run
    #[arg(long, default_value_t = 10)]
    max_generations: usize,
    /// Maximum number of candidates entering each tournament
    #[arg(long)]
    selection_capacity: Option<usize>,
    /// Per-decision time limit in seconds
    #[arg(long, default_value_t = 10.0)]
    move_time_limit: f64,
    /// Number of tournament worker threads
    #[arg(long, default_value_t = 1)]
    workers: usize,
    /// Seed for the random generator
    #[arg(long)]
    seed: Option<u64>,
    /// Default mutation sigma
    #[arg(long, default_value_t = DEFAULT_SIGMA)]
    sigma: f64,
    /// Mutation sigma for a single attribute, as `name=sigma` (repeatable)
    #[arg(long = "sigma-for", value_name = "NAME=SIGMA")]
    sigma_overrides: Vec<SigmaOverride>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl TrainArg {
    fn evolution_config(&self) -> anyhow::Result<EvolutionConfig> {
        let mut sigmas = MutationSigmas::default().with_default(self.sigma)?;
        for SigmaOverride { name, sigma } in &self.sigma_overrides {
            sigmas = sigmas.with_override(name, *sigma)?;
        }
        let move_time_limit = Duration::try_from_secs_f64(self.move_time_limit)
            .with_context(|| format!("Invalid move time limit: {}", self.move_time_limit))?;

        Ok(EvolutionConfig {
            selection_capacity: self.selection_capacity,
            population_size: Some(self.population_size),
            max_generations: Some(self.max_generations),
            sigmas,
            tournament: TournamentConfig {
                move_time_limit,
                workers: self.workers,
            },
        })
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.evolution_config()?;
    let initial = match &arg.population {
        Some(path) => util::read_population_file(path)?,
        None => evolution::default_population(),
    };
    let factories = AgentFactories::for_population(&initial, Arc::new(AlphaBetaAgentFactory));

    let seed = arg.seed.unwrap_or_else(rand::random);
    let mut rng = Pcg64::seed_from_u64(seed);

    eprintln!(
        "Training {} genomes for {} generations (seed {seed})",
        initial.len(),
        arg.max_generations
    );
    let mut generations = 0;
    let population = evolution::run_evolution(
        initial,
        &factories,
        &config,
        &mut rng,
        |report: &GenerationReport| {
            generations = report.generation;
            print_generation(report);
        },
    )
    .context("Tuning failed")?;

    eprintln!("Tuning completed after {generations} generations.");

    let report = TuningReport {
        trained_at: Utc::now(),
        seed,
        generations,
        population,
    };
    Output::save_json(&report, arg.output.clone())?;

    eprintln!();
    eprintln!("Tuning report saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Trained at: {}", report.trained_at);
    eprintln!("  Genomes: {}", report.population.len());
    if let Some(best) = report.population.first() {
        eprintln!("  Best: {}, {} => {:.3}", best.genome.type_name(), best.genome, best.fitness);
    }

    Ok(())
}

fn print_generation(report: &GenerationReport) {
    eprint!("{report}");
    eprintln!(
        "  Candidates: {}, games: {}, average decision time: {:.3}s",
        report.candidates, report.games_played, report.total_avg_time
    );
    for (genome, reason) in &report.disqualified {
        eprintln!("  Disqualified: {}, {genome}: {reason}", genome.type_name());
    }
    if let Some(stats) = report.fitness_stats() {
        eprintln!("  Fitness Stats:");
        eprintln!("    Min:    {:.3}", stats.min);
        eprintln!("    Max:    {:.3}", stats.max);
        eprintln!("    Mean:   {:.3}", stats.mean);
        eprintln!("    Median: {:.3}", stats.median);
        eprintln!("    StdDev: {:.3}", stats.std_dev);
    }
}
