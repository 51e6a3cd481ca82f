//! Benchmarks for one generation of selection and reproduction.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use genepool::Population;
use genepool::schema::{EvolutionConfig, FilterConfig};

fn bench_advance_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("advance_generation");

    for n_pop in [16, 64, 256] {
        let config = EvolutionConfig {
            n_pop,
            random_seed: Some(42),
            filter: FilterConfig {
                num_bytes: 1 << 16,
                num_probes: 7,
            },
            ..EvolutionConfig::default()
        };

        group.bench_with_input(BenchmarkId::from_parameter(n_pop), &config, |b, config| {
            b.iter(|| {
                let mut population = Population::new(config.clone()).unwrap();
                population.populate(0);
                let cutoff = population.fitness_cutoff(0.5).unwrap();
                population.advance_generation(1, cutoff, 0.3).unwrap();
                population.len()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_advance_generation);
criterion_main!(benches);
