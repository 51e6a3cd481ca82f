//! Generational driver for an evolution run.
//!
//! Seeds the population once, then cycles cutoff → advance → termination
//! until convergence or the generation budget is exhausted, and finishes
//! with the member summary.

use log::info;

use crate::compute::population::{Population, PopulationError};
use crate::schema::{ConfigError, EvolutionConfig};

/// Reason an evolution run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The mean-squared fitness error fell to the termination limit.
    Converged,
    /// The generation budget ran out first.
    GenerationBudget,
}

/// Final result of an evolution run.
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    /// Generations actually run.
    pub generations: u32,
    /// Best fitness in the final population.
    pub best_fitness: f64,
    /// Final population size.
    pub population_size: usize,
    /// Why the run stopped.
    pub stop_reason: StopReason,
}

/// Drives a population through repeated generations.
pub struct EvolutionEngine {
    config: EvolutionConfig,
    population: Population,
}

impl EvolutionEngine {
    /// Create an engine; fails on malformed configuration.
    pub fn new(config: EvolutionConfig) -> Result<Self, ConfigError> {
        let population = Population::new(config.clone())?;
        Ok(Self { config, population })
    }

    /// The population being evolved.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Run to convergence or generation budget, then report the summary.
    pub fn run(&mut self) -> Result<EvolutionResult, PopulationError> {
        info!("seeding population toward {} individuals", self.config.n_pop);
        self.population.populate(0);
        info!("seeded {} unique individuals", self.population.len());

        let mut generations = 0;
        let mut stop_reason = StopReason::GenerationBudget;
        for generation in 1..=self.config.max_generations {
            generations = generation;
            let cutoff = self.population.fitness_cutoff(self.config.selection_rate)?;
            self.population
                .advance_generation(generation, cutoff, self.config.mutation_rate)?;
            if self.population.test_termination(generation)? {
                stop_reason = StopReason::Converged;
                break;
            }
        }

        self.population.report_summary();

        let best_fitness = self
            .population
            .best()
            .map(|indiv| indiv.fitness())
            .unwrap_or(f64::NEG_INFINITY);

        info!(
            "run stopped after {generations} generation(s): {stop_reason:?}, best fitness {best_fitness:.4}"
        );

        Ok(EvolutionResult {
            generations,
            best_fitness,
            population_size: self.population.len(),
            stop_reason,
        })
    }
}
