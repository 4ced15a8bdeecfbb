//! Evolutionary tuning of heuristic Reversi agents.
//!
//! This crate breeds populations of heuristic parameter sets ([`genome`]) and ranks
//! them by letting the resulting agents play each other.
//!
//! # How Tuning Works
//!
//! 1. **Population** - Start from an initial set of genomes
//!    ([`evolution::default_population`] or a JSON file)
//! 2. **Breeding** - Cross and mutate genomes of the same kind
//! 3. **Tournament** - Every candidate plays every other candidate twice, once per
//!    colour, with a per-move time limit
//! 4. **Fitness** - Win ratio, with a small bonus for fast and steady decisions
//! 5. **Selection** - Keep the best `population_size` candidates
//! 6. **Repeat** - Until `max_generations` or until nobody survives
//!
//! # Architecture
//!
//! ```text
//! Evolution loop (evolution)
//!     ↓ breeds
//! Genomes (genome)
//!     ↓ turned into agents by
//! AgentFactories (factory) → reversi-evaluator agents
//!     ↓ played in
//! Round robin (tournament)
//!     ↓ scored by
//! Score / fitness (fitness)
//! ```
//!
//! # Modules
//!
//! - [`genome`] - Tagged parameter sets with mutation and crossover
//! - [`factory`] - Registry mapping genome type names to agent builders
//! - [`tournament`] - Timed round robin with disqualification and worker threads
//! - [`fitness`] - The composite score used for ranking
//! - [`evolution`] - Generation step and the full tuning loop
//!
//! All randomness is drawn from an explicit `Rng` argument, so runs can be seeded.
//!
//! # Current Limitations
//!
//! - **Post-hoc time limit**: A slow decision is only detected after it returns; an
//!   agent that never returns blocks its worker
//! - **Kind-local breeding**: Genomes are only crossed with genomes of the same type
//!   name, so the mix of kinds can shrink but never grow

pub mod evolution;
pub mod factory;
pub mod fitness;
pub mod genome;
pub mod tournament;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum GenomeError {
    #[display("cannot cross {left:?} with {right:?}")]
    KindMismatch { left: String, right: String },
    #[display("invalid mutation sigma {sigma} for {attribute:?}")]
    InvalidSigma { attribute: String, sigma: f64 },
    #[display("{type_name:?} genome has no attribute {name:?}")]
    MissingAttribute { name: String, type_name: String },
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum TuningError {
    #[display("no agent factory registered for {type_name:?}")]
    MissingFactory { type_name: String },
    #[display("{_0}")]
    Genome(GenomeError),
}

impl From<GenomeError> for TuningError {
    fn from(err: GenomeError) -> Self {
        Self::Genome(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuning_error_shows_genome_cause() {
        let err = TuningError::from(GenomeError::KindMismatch {
            left: "Material adv.".to_owned(),
            right: "Const depth".to_owned(),
        });
        assert_eq!(
            err.to_string(),
            r#"cannot cross "Material adv." with "Const depth""#
        );
    }
}
