//! Population lifecycle: admission, eviction, selection, and statistics.
//!
//! The population owns the exact fingerprint-keyed store and the approximate
//! filter in front of it, and drives one generation's selection/reproduction
//! cycle. All reads and writes are single-threaded; an external driver calls
//! `populate` once and then cycles cutoff/advance/termination.

use std::collections::BTreeMap;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::compute::filter::DedupFilter;
use crate::compute::individual::{Fingerprint, Individual};
use crate::schema::{ConfigError, EvolutionConfig, FeatureConfig};

/// Runtime precondition failures on population queries.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    #[error("population is empty")]
    Empty,
    #[error("cannot breed from {have} parent(s); at least 2 required")]
    TooFewParents { have: usize },
}

/// A bounded collection of unique individuals.
///
/// Uniqueness is enforced by a two-tier scheme: the approximate filter is a
/// cheap pre-check that may false-positive, and the fingerprint-keyed map is
/// the exact, authoritative store behind it.
#[derive(Debug)]
pub struct Population {
    config: EvolutionConfig,
    // Ordered by fingerprint so a seeded run consumes randomness in a
    // reproducible order.
    members: BTreeMap<Fingerprint, Individual>,
    seen: DedupFilter,
    rng: StdRng,
}

impl Population {
    /// Create an empty population; fails on malformed configuration.
    pub fn new(config: EvolutionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let seen = DedupFilter::new(config.filter.num_bytes, config.filter.num_probes);
        Ok(Self {
            members: BTreeMap::new(),
            seen,
            rng,
            config,
        })
    }

    /// Number of live members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the population has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Look up a member by fingerprint.
    pub fn get(&self, key: &Fingerprint) -> Option<&Individual> {
        self.members.get(key)
    }

    /// Iterate over live members in fingerprint order.
    pub fn members(&self) -> impl Iterator<Item = &Individual> {
        self.members.values()
    }

    /// Highest-fitness member, if any.
    pub fn best(&self) -> Option<&Individual> {
        self.members
            .values()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
    }

    pub(crate) fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub(crate) fn feature_config(&self) -> &FeatureConfig {
        &self.config.features
    }

    /// Seed the population with `n_pop` random individuals.
    ///
    /// Duplicates (and the filter's occasional false positives) are silently
    /// rejected, so the resulting size may fall short of `n_pop`; no retry
    /// is attempted.
    pub fn populate(&mut self, generation: u32) {
        for _ in 0..self.config.n_pop {
            let indiv = Individual::random(generation, &self.config.features, &mut self.rng);
            self.reify(indiv);
        }
    }

    /// Admission gate: add a newly constructed individual (birth).
    ///
    /// Returns true iff the individual was admitted. Fitness computation is
    /// deferred to this point so rejected duplicates never pay for it. A
    /// filter false positive rejects a genuinely new individual; that is the
    /// accepted space/accuracy trade-off, and the candidate is discarded
    /// with no side effects.
    pub fn reify(&mut self, mut indiv: Individual) -> bool {
        let key = indiv.fingerprint();
        if self.seen.contains(&key) {
            debug!("rejecting {key}: already seen");
            return false;
        }
        self.seen.insert(&key);
        indiv.compute_fitness(self.config.features.target);
        self.members.insert(key, indiv);
        true
    }

    /// Remove an individual from the live population (death).
    ///
    /// A no-op when the fingerprint is already absent. The durable-storage
    /// path is computed here as the write-behind target for an eventual
    /// persistence layer; nothing is written in this scope.
    pub fn evict(&mut self, indiv: &Individual) {
        let key = indiv.fingerprint();
        if self.members.remove(&key).is_some() {
            let path = self.storage_path(&key);
            debug!("evicted {key}, write-behind target {path}");
        }
    }

    /// Deterministic per-individual object key for durable storage.
    pub fn storage_path(&self, key: &Fingerprint) -> String {
        format!("{}/{}", self.config.prefix, key)
    }

    /// Fitness distribution, binned to `hist_granularity` decimal places and
    /// sorted by descending bin value.
    pub fn partial_histogram(&self) -> Vec<(f64, usize)> {
        let scale = 10f64.powi(self.config.hist_granularity as i32);
        let mut bins: BTreeMap<i64, usize> = BTreeMap::new();
        for indiv in self.members.values() {
            let bin = (indiv.fitness() * scale).round() as i64;
            *bins.entry(bin).or_default() += 1;
        }
        bins.into_iter()
            .rev()
            .map(|(bin, count)| (bin as f64 / scale, count))
            .collect()
    }

    /// Fitness cutoff for parent selection.
    ///
    /// Walks the descending histogram accumulating counts until the
    /// cumulative fraction of `n_pop` reaches `selection_rate`, then returns
    /// the next lower bin (or the last bin when the walk exhausts the
    /// histogram). Members with fitness strictly above the cutoff are the
    /// fit parents, so roughly `selection_rate` of the population qualifies.
    pub fn fitness_cutoff(&self, selection_rate: f64) -> Result<f64, PopulationError> {
        if self.members.is_empty() {
            return Err(PopulationError::Empty);
        }

        let mut cumulative = 0usize;
        let mut reached = false;
        let mut cutoff = 0.0;
        for (bin, count) in self.partial_histogram() {
            cutoff = bin;
            if reached {
                break;
            }
            cumulative += count;
            reached = cumulative as f64 / self.config.n_pop as f64 >= selection_rate;
        }
        Ok(cutoff)
    }

    /// Run one generation's selection and reproduction.
    ///
    /// Members at or below the cutoff are each given a diversity chance:
    /// with probability `mutation_rate` they attempt a mutation, otherwise
    /// they are evicted. Every survivor (fit and surviving unfit alike) is
    /// then an eligible parent, and distinct parent pairs are sampled
    /// uniformly to breed the population back toward `n_pop`.
    pub fn advance_generation(
        &mut self,
        generation: u32,
        cutoff: f64,
        mutation_rate: f64,
    ) -> Result<(), PopulationError> {
        let unfit: Vec<Individual> = self
            .members
            .values()
            .filter(|indiv| indiv.fitness() <= cutoff)
            .cloned()
            .collect();

        for indiv in unfit {
            if self.rng.r#gen::<f64>() < mutation_rate {
                indiv.mutate(self, generation);
            } else {
                self.evict(&indiv);
            }
        }

        let parents: Vec<Individual> = self.members.values().cloned().collect();
        let deficit = self.config.n_pop.saturating_sub(parents.len());
        if deficit > 0 && parents.len() < 2 {
            return Err(PopulationError::TooFewParents {
                have: parents.len(),
            });
        }

        for _ in 0..deficit {
            let pair: Vec<Individual> = parents
                .choose_multiple(&mut self.rng, 2)
                .cloned()
                .collect();
            pair[0].breed(self, generation, &pair[1]);
        }
        Ok(())
    }

    /// Evaluate the termination condition and report progress.
    ///
    /// The convergence metric is the population's mean-squared fitness
    /// error, `Σ count·(1 − bin)² / n_pop` over the histogram. One progress
    /// line per generation goes to stdout: generation index, MSE in
    /// scientific notation, and the nonzero histogram entries in descending
    /// bin order. Returns true iff MSE ≤ `term_limit`.
    pub fn test_termination(&self, generation: u32) -> Result<bool, PopulationError> {
        if self.members.is_empty() {
            return Err(PopulationError::Empty);
        }

        let hist = self.partial_histogram();
        let mse = hist
            .iter()
            .map(|&(bin, count)| count as f64 * (1.0 - bin).powi(2))
            .sum::<f64>()
            / self.config.n_pop as f64;

        let entries: Vec<String> = hist
            .iter()
            .map(|(bin, count)| format!("({bin}, {count})"))
            .collect();
        println!("{generation} {mse:.2e} [{}]", entries.join(", "));

        Ok(mse <= self.config.term_limit)
    }

    /// Report every member, best fitness first: the storage path, then a
    /// tab-separated line of fitness, generation, and the JSON feature set.
    pub fn report_summary(&self) {
        let mut members: Vec<&Individual> = self.members.values().collect();
        members.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));

        for indiv in members {
            println!("{}", self.storage_path(&indiv.fingerprint()));
            println!(
                "{:.4}\t{}\t{}",
                indiv.fitness(),
                indiv.generation(),
                indiv.json_features()
            );
        }
    }
}
