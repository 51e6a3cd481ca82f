//! Individuals: candidate solutions and their content-derived identity.
//!
//! An individual is an ordered integer feature set plus a fingerprint, a
//! fitness score, and the generation that produced it. Mutation and
//! crossover never modify an existing individual; they construct a new one
//! and hand it to the population for admission.

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;
use sha2::{Digest, Sha224};

use crate::compute::population::Population;
use crate::schema::FeatureConfig;

/// Content-derived identity of a canonical feature set.
///
/// The SHA-224 digest of the feature set's JSON serialization. Two
/// individuals with identical feature sets share a fingerprint regardless of
/// their history; this is the dedup key, not an instance identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; 28]);

impl Fingerprint {
    /// Digest a feature set exactly as given.
    ///
    /// The digest is defined over the canonical (sorted) form only; callers
    /// are expected to canonicalize first. `Individual::new` does so.
    pub fn of(features: &[i64]) -> Self {
        let json = serde_json::to_vec(features).expect("integer arrays always serialize");
        let digest = Sha224::digest(&json);
        let mut bytes = [0u8; 28];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 28] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

/// One candidate solution.
#[derive(Debug, Clone)]
pub struct Individual {
    generation: u32,
    features: Vec<i64>,
    fingerprint: Fingerprint,
    fitness: f64,
}

impl Individual {
    /// Bind a generation and feature set, deriving the fingerprint.
    ///
    /// The feature set is canonicalized (sorted ascending) first, so two
    /// individuals built from the same multiset of values always collide on
    /// fingerprint. Features never change after this point.
    pub fn new(generation: u32, mut features: Vec<i64>) -> Self {
        features.sort_unstable();
        let fingerprint = Fingerprint::of(&features);
        Self {
            generation,
            features,
            fingerprint,
            fitness: 0.0,
        }
    }

    /// Factory for initial seeding: `length` uniform draws in `[min, max]`.
    pub fn random(generation: u32, config: &FeatureConfig, rng: &mut StdRng) -> Self {
        let features = (0..config.length)
            .map(|_| rng.gen_range(config.min..=config.max))
            .collect();
        Self::new(generation, features)
    }

    /// Generation that produced this individual.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Canonical (sorted) feature set.
    pub fn features(&self) -> &[i64] {
        &self.features
    }

    /// Dedup key for this individual.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Fitness score; meaningful once the individual has been admitted to a
    /// population (fitness is deferred until then).
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Feature set as a canonical JSON array; the hashing input and the
    /// reporting output.
    pub fn json_features(&self) -> String {
        serde_json::to_string(&self.features).expect("integer arrays always serialize")
    }

    /// Set fitness to `1 - |sum - target| / target`.
    ///
    /// Bounded above by 1.0 (exact match), unbounded below; no clamping.
    /// Pure in the feature set and target, and idempotent.
    pub(crate) fn compute_fitness(&mut self, target: f64) {
        let sum: i64 = self.features.iter().sum();
        self.fitness = 1.0 - (sum as f64 - target).abs() / target;
    }

    /// Attempt to mutate into the population.
    ///
    /// Replaces one uniformly chosen feature with a fresh uniform value,
    /// re-sorts, and offers the result to the population at `generation`.
    /// Only if the mutant is admitted is the original evicted, so a
    /// duplicate mutation never costs the population a member.
    pub fn mutate(&self, population: &mut Population, generation: u32) {
        let (min, max) = {
            let config = population.feature_config();
            (config.min, config.max)
        };
        let position = population.rng().gen_range(0..self.features.len());
        let value = population.rng().gen_range(min..=max);

        let mut features = self.features.clone();
        features[position] = value;

        let mutant = Individual::new(generation, features);
        if population.reify(mutant) {
            population.evict(self);
        }
    }

    /// Breed with a mate, offering the child to the population.
    ///
    /// Single-point crossover: the tail half of this feature set (from the
    /// midpoint, keeping any odd remainder) concatenated with the head half
    /// of the mate's, re-sorted. Neither parent is evicted. Feature-set
    /// lengths are equal for every individual in a run (enforced by config).
    pub fn breed(&self, population: &mut Population, generation: u32, mate: &Individual) {
        let half = self.features.len() / 2;
        let mut features = self.features[half..].to_vec();
        features.extend_from_slice(&mate.features[..half]);

        let child = Individual::new(generation, features);
        population.reify(child);
    }
}
