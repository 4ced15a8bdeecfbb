//! Tunable parameter sets for heuristic agents.
//!
//! A [`Genome`] is an immutable, named vector of real attributes. Leaf variants
//! describe either a heuristic family or a depth policy; [`Genome::Combined`] pairs
//! one of each, and its attribute set is the union of both (heuristic first).
//!
//! | Variant         | Type name         | Attributes                                    |
//! |-----------------|-------------------|-----------------------------------------------|
//! | `Material`      | `Material adv.`   | `weight_ratio`                                |
//! | `Positional`    | `Position adv.`   | `corner_weight`, `side_weight`, `insider_ratio` |
//! | `ConstDepth`    | `const depth`     | `max_depth`                                   |
//! | `VariableDepth` | `variable depth`  | `mid_max_depth`, `end_max_depth`              |
//! | `Combined`      | `<a> with <b>`    | union                                         |
//!
//! # Genetic Operators
//!
//! ## Gaussian Mutation
//!
//! Every attribute receives independent `N(0, σ)` noise. σ defaults to
//! [`DEFAULT_SIGMA`] and can be overridden per attribute name with
//! [`MutationSigmas`]. Depth attributes are clamped to
//! [`MIN_DEPTH`]..=[`MAX_DEPTH`] afterwards.
//!
//! ## Blend Crossover
//!
//! For each attribute an independent `r ∈ [0, 1)` is drawn and the child takes
//! `r * a + (1 - r) * b`, so children always lie between their parents. Crossing
//! genomes of different kinds is an error.
//!
//! Combined genomes apply both operators to each constituent independently.
//!
//! # Serialization
//!
//! Genomes serialize as internally tagged JSON objects:
//!
//! ```
//! use reversi_training::genome::Genome;
//!
//! let genome = Genome::combined(Genome::material(2.0), Genome::const_depth(1.5));
//! let json = serde_json::to_string(&genome).unwrap();
//! assert_eq!(
//!     json,
//!     r#"{"kind":"combined","heuristic":{"kind":"material","weight_ratio":2.0},"depth":{"kind":"const_depth","max_depth":1.5}}"#
//! );
//! ```

use std::{collections::BTreeMap, fmt};

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::GenomeError;

pub const WEIGHT_RATIO: &str = "weight_ratio";
pub const CORNER_WEIGHT: &str = "corner_weight";
pub const SIDE_WEIGHT: &str = "side_weight";
pub const INSIDER_RATIO: &str = "insider_ratio";
pub const MAX_DEPTH_ATTR: &str = "max_depth";
pub const MID_MAX_DEPTH: &str = "mid_max_depth";
pub const END_MAX_DEPTH: &str = "end_max_depth";

/// Lower bound of depth attributes after mutation, in full moves.
pub const MIN_DEPTH: f64 = 0.5;
/// Upper bound of depth attributes after mutation, in full moves.
pub const MAX_DEPTH: f64 = 11.0;

/// Mutation σ used for attributes without an override.
pub const DEFAULT_SIGMA: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Genome {
    Material {
        weight_ratio: f64,
    },
    Positional {
        corner_weight: f64,
        side_weight: f64,
        insider_ratio: f64,
    },
    ConstDepth {
        max_depth: f64,
    },
    VariableDepth {
        mid_max_depth: f64,
        end_max_depth: f64,
    },
    Combined {
        heuristic: Box<Genome>,
        depth: Box<Genome>,
    },
}

/// Returns `true` for attributes measured in search depth.
#[must_use]
pub fn is_depth_attribute(name: &str) -> bool {
    matches!(name, MAX_DEPTH_ATTR | MID_MAX_DEPTH | END_MAX_DEPTH)
}

impl Genome {
    #[must_use]
    pub const fn material(weight_ratio: f64) -> Self {
        Self::Material { weight_ratio }
    }

    #[must_use]
    pub const fn positional(corner_weight: f64, side_weight: f64, insider_ratio: f64) -> Self {
        Self::Positional {
            corner_weight,
            side_weight,
            insider_ratio,
        }
    }

    #[must_use]
    pub const fn const_depth(max_depth: f64) -> Self {
        Self::ConstDepth { max_depth }
    }

    #[must_use]
    pub const fn variable_depth(mid_max_depth: f64, end_max_depth: f64) -> Self {
        Self::VariableDepth {
            mid_max_depth,
            end_max_depth,
        }
    }

    #[must_use]
    pub fn combined(heuristic: Genome, depth: Genome) -> Self {
        Self::Combined {
            heuristic: Box::new(heuristic),
            depth: Box::new(depth),
        }
    }

    /// Human-readable kind name, used to group genomes that can be crossed.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Material { .. } => "Material adv.".to_owned(),
            Self::Positional { .. } => "Position adv.".to_owned(),
            Self::ConstDepth { .. } => "const depth".to_owned(),
            Self::VariableDepth { .. } => "variable depth".to_owned(),
            Self::Combined { heuristic, depth } => {
                format!("{} with {}", heuristic.type_name(), depth.type_name())
            }
        }
    }

    /// All attributes in declaration order.
    #[must_use]
    pub fn attributes(&self) -> Vec<(&'static str, f64)> {
        let mut attrs = Vec::new();
        self.collect_attributes(&mut attrs);
        attrs
    }

    fn collect_attributes(&self, attrs: &mut Vec<(&'static str, f64)>) {
        match self {
            Self::Material { weight_ratio } => attrs.push((WEIGHT_RATIO, *weight_ratio)),
            Self::Positional {
                corner_weight,
                side_weight,
                insider_ratio,
            } => attrs.extend([
                (CORNER_WEIGHT, *corner_weight),
                (SIDE_WEIGHT, *side_weight),
                (INSIDER_RATIO, *insider_ratio),
            ]),
            Self::ConstDepth { max_depth } => attrs.push((MAX_DEPTH_ATTR, *max_depth)),
            Self::VariableDepth {
                mid_max_depth,
                end_max_depth,
            } => attrs.extend([
                (MID_MAX_DEPTH, *mid_max_depth),
                (END_MAX_DEPTH, *end_max_depth),
            ]),
            Self::Combined { heuristic, depth } => {
                heuristic.collect_attributes(attrs);
                depth.collect_attributes(attrs);
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.attributes()
            .into_iter()
            .find_map(|(attr, value)| (attr == name).then_some(value))
    }

    /// Like [`get`](Self::get), failing with [`GenomeError::MissingAttribute`].
    pub fn require(&self, name: &str) -> Result<f64, GenomeError> {
        self.get(name).ok_or_else(|| GenomeError::MissingAttribute {
            name: name.to_owned(),
            type_name: self.type_name(),
        })
    }

    /// Returns a copy with Gaussian noise added to every attribute.
    #[must_use]
    pub fn mutate<R>(&self, sigmas: &MutationSigmas, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        self.map_values(&mut |name, value| {
            let noise: f64 = rng.sample(StandardNormal);
            let mutated = value + sigmas.sigma_for(name) * noise;
            if is_depth_attribute(name) {
                mutated.clamp(MIN_DEPTH, MAX_DEPTH)
            } else {
                mutated
            }
        })
    }

    /// Blends `self` with `other` attribute by attribute.
    pub fn crossover<R>(&self, other: &Self, rng: &mut R) -> Result<Self, GenomeError>
    where
        R: Rng + ?Sized,
    {
        self.zip_values(other, &mut |_name, a, b| {
            let ratio = rng.random::<f64>();
            ratio * a + (1.0 - ratio) * b
        })
    }

    fn map_values<F>(&self, f: &mut F) -> Self
    where
        F: FnMut(&'static str, f64) -> f64,
    {
        match self {
            Self::Material { weight_ratio } => Self::Material {
                weight_ratio: f(WEIGHT_RATIO, *weight_ratio),
            },
            Self::Positional {
                corner_weight,
                side_weight,
                insider_ratio,
            } => Self::Positional {
                corner_weight: f(CORNER_WEIGHT, *corner_weight),
                side_weight: f(SIDE_WEIGHT, *side_weight),
                insider_ratio: f(INSIDER_RATIO, *insider_ratio),
            },
            Self::ConstDepth { max_depth } => Self::ConstDepth {
                max_depth: f(MAX_DEPTH_ATTR, *max_depth),
            },
            Self::VariableDepth {
                mid_max_depth,
                end_max_depth,
            } => Self::VariableDepth {
                mid_max_depth: f(MID_MAX_DEPTH, *mid_max_depth),
                end_max_depth: f(END_MAX_DEPTH, *end_max_depth),
            },
            Self::Combined { heuristic, depth } => Self::Combined {
                heuristic: Box::new(heuristic.map_values(f)),
                depth: Box::new(depth.map_values(f)),
            },
        }
    }

    fn zip_values<F>(&self, other: &Self, f: &mut F) -> Result<Self, GenomeError>
    where
        F: FnMut(&'static str, f64, f64) -> f64,
    {
        let genome = match (self, other) {
            (Self::Material { weight_ratio: a }, Self::Material { weight_ratio: b }) => {
                Self::Material {
                    weight_ratio: f(WEIGHT_RATIO, *a, *b),
                }
            }
            (
                Self::Positional {
                    corner_weight: c1,
                    side_weight: s1,
                    insider_ratio: i1,
                },
                Self::Positional {
                    corner_weight: c2,
                    side_weight: s2,
                    insider_ratio: i2,
                },
            ) => Self::Positional {
                corner_weight: f(CORNER_WEIGHT, *c1, *c2),
                side_weight: f(SIDE_WEIGHT, *s1, *s2),
                insider_ratio: f(INSIDER_RATIO, *i1, *i2),
            },
            (Self::ConstDepth { max_depth: a }, Self::ConstDepth { max_depth: b }) => {
                Self::ConstDepth {
                    max_depth: f(MAX_DEPTH_ATTR, *a, *b),
                }
            }
            (
                Self::VariableDepth {
                    mid_max_depth: m1,
                    end_max_depth: e1,
                },
                Self::VariableDepth {
                    mid_max_depth: m2,
                    end_max_depth: e2,
                },
            ) => Self::VariableDepth {
                mid_max_depth: f(MID_MAX_DEPTH, *m1, *m2),
                end_max_depth: f(END_MAX_DEPTH, *e1, *e2),
            },
            (
                Self::Combined {
                    heuristic: h1,
                    depth: d1,
                },
                Self::Combined {
                    heuristic: h2,
                    depth: d2,
                },
            ) => Self::Combined {
                heuristic: Box::new(h1.zip_values(h2, f)?),
                depth: Box::new(d1.zip_values(d2, f)?),
            },
            _ => {
                return Err(GenomeError::KindMismatch {
                    left: self.type_name(),
                    right: other.type_name(),
                });
            }
        };
        Ok(genome)
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        for (name, value) in self.attributes() {
            write!(f, "{sep}{name}={value:.2}")?;
            sep = ", ";
        }
        Ok(())
    }
}

/// Per-attribute standard deviations for [`Genome::mutate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationSigmas {
    default: f64,
    #[serde(default)]
    overrides: BTreeMap<String, f64>,
}

impl Default for MutationSigmas {
    fn default() -> Self {
        Self {
            default: DEFAULT_SIGMA,
            overrides: BTreeMap::new(),
        }
    }
}

impl MutationSigmas {
    /// Uses `sigma` for every attribute without an override.
    pub fn with_default(mut self, sigma: f64) -> Result<Self, GenomeError> {
        validate_sigma("*", sigma)?;
        self.default = sigma;
        Ok(self)
    }

    /// Uses `sigma` for the attribute called `name`.
    pub fn with_override(mut self, name: &str, sigma: f64) -> Result<Self, GenomeError> {
        validate_sigma(name, sigma)?;
        self.overrides.insert(name.to_owned(), sigma);
        Ok(self)
    }

    #[must_use]
    pub fn sigma_for(&self, name: &str) -> f64 {
        self.overrides.get(name).copied().unwrap_or(self.default)
    }
}

fn validate_sigma(attribute: &str, sigma: f64) -> Result<(), GenomeError> {
    if sigma.is_finite() && sigma >= 0.0 {
        Ok(())
    } else {
        Err(GenomeError::InvalidSigma {
            attribute: attribute.to_owned(),
            sigma,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;

    fn combined() -> Genome {
        Genome::combined(
            Genome::positional(4.0, 2.0, 0.0),
            Genome::variable_depth(2.0, 9.5),
        )
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Genome::material(1.0).type_name(), "Material adv.");
        assert_eq!(Genome::positional(1.0, 1.0, 1.0).type_name(), "Position adv.");
        assert_eq!(Genome::const_depth(1.0).type_name(), "const depth");
        assert_eq!(Genome::variable_depth(1.0, 1.0).type_name(), "variable depth");
        assert_eq!(combined().type_name(), "Position adv. with variable depth");
    }

    #[test]
    fn test_combined_attributes_are_union() {
        let genome = combined();
        let names = genome
            .attributes()
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                CORNER_WEIGHT,
                SIDE_WEIGHT,
                INSIDER_RATIO,
                MID_MAX_DEPTH,
                END_MAX_DEPTH
            ]
        );
        assert_eq!(genome.get(END_MAX_DEPTH), Some(9.5));
        assert_eq!(genome.get(WEIGHT_RATIO), None);
        assert!(matches!(
            genome.require(WEIGHT_RATIO),
            Err(GenomeError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_display() {
        let genome = Genome::combined(Genome::material(0.5), Genome::const_depth(2.0));
        assert_eq!(genome.to_string(), "weight_ratio=0.50, max_depth=2.00");
    }

    #[test]
    fn test_mutated_depth_stays_in_range() {
        let mut rng = Pcg64::seed_from_u64(5);
        let sigmas = MutationSigmas::default()
            .with_override(MAX_DEPTH_ATTR, 20.0)
            .unwrap();
        for start in [MIN_DEPTH, 3.0, MAX_DEPTH] {
            let genome = Genome::const_depth(start);
            for _ in 0..200 {
                let depth = genome.mutate(&sigmas, &mut rng).get(MAX_DEPTH_ATTR).unwrap();
                assert!((MIN_DEPTH..=MAX_DEPTH).contains(&depth), "{depth}");
            }
        }
    }

    #[test]
    fn test_zero_sigma_keeps_values() {
        let mut rng = Pcg64::seed_from_u64(1);
        let sigmas = MutationSigmas::default().with_default(0.0).unwrap();
        let genome = combined();
        assert_eq!(genome.mutate(&sigmas, &mut rng), genome);
    }

    #[test]
    fn test_crossover_stays_between_parents() {
        let mut rng = Pcg64::seed_from_u64(9);
        let a = Genome::combined(Genome::material(0.5), Genome::variable_depth(0.5, 11.0));
        let b = Genome::combined(Genome::material(2.0), Genome::variable_depth(4.0, 0.5));
        for _ in 0..100 {
            let child = a.crossover(&b, &mut rng).unwrap();
            assert_eq!(child.type_name(), a.type_name());
            for ((name, x), ((_, lo), (_, hi))) in child
                .attributes()
                .into_iter()
                .zip(a.attributes().into_iter().zip(b.attributes()))
            {
                let (lo, hi) = (lo.min(hi), lo.max(hi));
                assert!((lo..=hi).contains(&x), "{name}={x} outside {lo}..={hi}");
                if is_depth_attribute(name) {
                    assert!((MIN_DEPTH..=MAX_DEPTH).contains(&x));
                }
            }
        }
    }

    #[test]
    fn test_crossover_kind_mismatch() {
        let mut rng = Pcg64::seed_from_u64(0);
        let err = Genome::material(1.0)
            .crossover(&Genome::const_depth(1.0), &mut rng)
            .unwrap_err();
        assert!(matches!(err, GenomeError::KindMismatch { .. }));

        let a = Genome::combined(Genome::material(1.0), Genome::const_depth(1.0));
        let b = Genome::combined(Genome::material(1.0), Genome::variable_depth(1.0, 1.0));
        assert!(a.crossover(&b, &mut rng).is_err());
    }

    #[test]
    fn test_invalid_sigma() {
        assert!(matches!(
            MutationSigmas::default().with_override(SIDE_WEIGHT, -1.0),
            Err(GenomeError::InvalidSigma { .. })
        ));
        assert!(MutationSigmas::default().with_default(f64::NAN).is_err());
    }

    #[test]
    fn test_serde_round_trip_of_population_file() {
        let json = r#"[
            {"kind": "combined",
             "heuristic": {"kind": "positional", "corner_weight": 4, "side_weight": 2, "insider_ratio": 0},
             "depth": {"kind": "variable_depth", "mid_max_depth": 2, "end_max_depth": 9.5}}
        ]"#;
        let population: Vec<Genome> = serde_json::from_str(json).unwrap();
        assert_eq!(population, vec![combined()]);
    }
}
