//! Criterion benchmarks for the evolutionary engine.
//!
//! Uses a synthetic most-ones problem to measure pure loop overhead
//! independent of any domain.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use evostrand::chromosome::Chromosome;
use evostrand::engine::{Engine, EngineConfig, FitnessSource, RunOptions};
use evostrand::gene::Alphabet;
use evostrand::random::create_rng;

struct MostOnes;

impl FitnessSource for MostOnes {
    fn fitness(&self, chromosome: &Chromosome) -> f64 {
        chromosome.dna().bytes().filter(|&b| b == b'1').count() as f64
    }
}

fn bench_engine_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_run");
    for &bits in &[32usize, 128] {
        group.bench_with_input(BenchmarkId::new("most_ones", bits), &bits, |b, &bits| {
            b.iter(|| {
                let mut rng = create_rng(42);
                let population = Chromosome::create_random(Alphabet::Binary, &[bits], 50, &mut rng);
                let config = EngineConfig::default().with_seed(42);
                let mut engine = Engine::new(MostOnes, population, config).unwrap();
                black_box(engine.run(&RunOptions::new(50, 0.05, 0.5)))
            });
        });
    }
    group.finish();
}

fn bench_mutation(c: &mut Criterion) {
    c.bench_function("chromosome_mutate_1k", |b| {
        let mut rng = create_rng(42);
        let mut chromosome = Chromosome::create_random(Alphabet::Binary, &[1024], 1, &mut rng)
            .remove(0);
        b.iter(|| {
            chromosome.mutate(0.05, &mut rng);
            black_box(chromosome.length())
        });
    });
}

criterion_group!(benches, bench_engine_run, bench_mutation);
criterion_main!(benches);
