//! Genepool CLI - Run an evolution from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use genepool::{EvolutionConfig, EvolutionEngine, StopReason};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json>", args[0]);
        eprintln!();
        eprintln!("Run a generational evolution from a JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to run configuration file");
        eprintln!();
        eprintln!("Use --example to print a default configuration.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: EvolutionConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    println!("Genepool Evolution");
    println!("==================");
    println!("Population: {}", config.n_pop);
    println!(
        "Features: {} in [{}, {}], target sum {}",
        config.features.length, config.features.min, config.features.max, config.features.target
    );
    println!(
        "Selection rate: {}, mutation rate: {}",
        config.selection_rate, config.mutation_rate
    );
    println!(
        "Termination: MSE <= {:e}, budget {} generations",
        config.term_limit, config.max_generations
    );
    println!();

    let mut engine = EvolutionEngine::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    let start = Instant::now();
    let result = engine.run().unwrap_or_else(|e| {
        eprintln!("Run failed: {}", e);
        std::process::exit(1);
    });

    println!();
    match result.stop_reason {
        StopReason::Converged => println!("Converged after {} generation(s)", result.generations),
        StopReason::GenerationBudget => {
            println!("Generation budget exhausted ({})", result.generations)
        }
    }
    println!(
        "Best fitness: {:.4} across {} member(s)",
        result.best_fitness, result.population_size
    );
    println!("Elapsed: {:.2}s", start.elapsed().as_secs_f64());
}

fn print_example_config() {
    let config = EvolutionConfig::default();
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error generating example config: {}", e);
            std::process::exit(1);
        }
    }
}
