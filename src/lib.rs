//! Genepool - Generational evolutionary-algorithm engine.
//!
//! This crate evolves a bounded population of candidate solutions
//! ("individuals") toward a target fitness by iterated selection, mutation,
//! and crossover. Individuals are deduplicated with a two-tier scheme: a
//! space-bounded approximate membership filter in front of an exact
//! fingerprint-keyed store.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration types for a run (population sizing, feature
//!   bounds, termination criteria)
//! - `compute`: Engine logic (individuals, the population lifecycle, the
//!   generational driver, and the shard-routing placeholder for a future
//!   distributed deployment)
//!
//! # Example
//!
//! ```rust,no_run
//! use genepool::{EvolutionConfig, EvolutionEngine};
//!
//! // Default configuration: 11 individuals, 5 features in [0, 100],
//! // fitness target 231.
//! let config = EvolutionConfig::default();
//!
//! let mut engine = EvolutionEngine::new(config).expect("default config is valid");
//! let result = engine.run().expect("run completes");
//!
//! println!(
//!     "best fitness {:.4} after {} generations",
//!     result.best_fitness, result.generations
//! );
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::{EvolutionEngine, EvolutionResult, Individual, Population, StopReason};
pub use schema::{EvolutionConfig, FeatureConfig};
