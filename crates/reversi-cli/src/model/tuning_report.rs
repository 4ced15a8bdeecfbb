use chrono::{DateTime, Utc};
use reversi_training::{evolution::RankedGenome, genome::Genome};
use serde::{Deserialize, Serialize};

/// Result of a `train` run, saved as JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TuningReport {
    pub trained_at: DateTime<Utc>,
    /// Seed of the random generator, given or drawn at startup.
    pub seed: u64,
    pub generations: usize,
    /// Final population, best first.
    pub population: Vec<RankedGenome>,
}

impl TuningReport {
    /// Genomes of the final population, usable as the `--population` of another run.
    pub fn genomes(&self) -> Vec<Genome> {
        self.population
            .iter()
            .map(|ranked| ranked.genome.clone())
            .collect()
    }
}
