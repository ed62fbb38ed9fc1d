//! The generational evolutionary loop.
//!
//! [`Engine`] owns the population and drives one `run` at a time:
//! competition → reproduction → mutation → scoring, followed by elitism,
//! stagnation handling, and the termination check. Execution is
//! single-threaded and synchronous; the optional parallel mode only spreads
//! fitness evaluation across rayon workers and keeps results deterministic
//! for a fixed seed because every score lands in the per-run cache before
//! any selection draws on it.

use crate::chromosome::Chromosome;
use crate::engine::config::{EngineConfig, RunOptions};
use crate::engine::stats::{GenerationRecord, RunStats};
use crate::engine::types::FitnessSource;
use crate::error::Error;
use crate::random::create_rng;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// Mutation rate applied by a stagnation-triggered refresh pass.
const REFRESH_MUTATION_RATE: f64 = 0.5;

/// Evolutionary engine over a homogeneous chromosome population.
///
/// # Usage
///
/// ```
/// use evostrand::chromosome::Chromosome;
/// use evostrand::engine::{Engine, EngineConfig, FitnessSource, RunOptions};
/// use evostrand::gene::Alphabet;
///
/// struct MostOnes;
///
/// impl FitnessSource for MostOnes {
///     fn fitness(&self, chromosome: &Chromosome) -> f64 {
///         chromosome.dna().bytes().filter(|&b| b == b'1').count() as f64
///     }
/// }
///
/// let mut rng = evostrand::random::create_rng(42);
/// let population = Chromosome::create_random(Alphabet::Binary, &[16], 20, &mut rng);
/// let config = EngineConfig::default().with_seed(42);
/// let mut engine = Engine::new(MostOnes, population, config).unwrap();
///
/// let best = engine.run(&RunOptions::new(50, 0.1, 0.5));
/// assert!(engine.stats().run_duration.is_some());
/// # let _ = best;
/// ```
pub struct Engine<P: FitnessSource> {
    problem: P,
    config: EngineConfig,
    population: Vec<Chromosome>,
    orig_pop_size: usize,
    min_fit_ever: f64,
    max_fit_ever: f64,
    // Fitness is pure per DNA string within a run, so scores are cached by
    // the full DNA string, never by object identity.
    cache: HashMap<String, f64>,
    rng: StdRng,
    stats: RunStats,
}

impl<P: FitnessSource> Engine<P> {
    /// Creates an engine over an initial population.
    ///
    /// The population must be non-empty and homogeneous: every chromosome
    /// shares one variant and one total length, so any two can crossover.
    pub fn new(
        problem: P,
        population: Vec<Chromosome>,
        config: EngineConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        let first = population.first().ok_or(Error::EmptyPopulation)?;
        if !population
            .iter()
            .all(|c| c.same_variant(first) && c.length() == first.length())
        {
            return Err(Error::HeterogeneousPopulation);
        }

        let rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => create_rng(rand::random()),
        };
        let orig_pop_size = population.len();
        Ok(Self {
            problem,
            config,
            population,
            orig_pop_size,
            min_fit_ever: f64::INFINITY,
            max_fit_ever: f64::NEG_INFINITY,
            cache: HashMap::new(),
            rng,
            stats: RunStats::default(),
        })
    }

    /// Returns the current population.
    pub fn population(&self) -> &[Chromosome] {
        &self.population
    }

    /// Returns statistics of the most recent run.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Returns the chromosome with the highest fitness score.
    pub fn fittest(&mut self) -> &Chromosome {
        let idx = self.fittest_index();
        &self.population[idx]
    }

    /// Returns the chromosome with the lowest fitness score.
    pub fn weakest(&mut self) -> &Chromosome {
        let mut weakest_idx = 0;
        let mut weakest_fit = f64::INFINITY;
        for idx in 0..self.population.len() {
            let fit = self.fitness_by_index(idx);
            if fit < weakest_fit {
                weakest_fit = fit;
                weakest_idx = idx;
            }
        }
        &self.population[weakest_idx]
    }

    /// Runs the evolutionary loop and returns an independent copy of the
    /// all-time fittest chromosome found.
    ///
    /// Historical fitness bounds, statistics, and the fitness cache reset
    /// at entry, so each call is one complete Idle → Finished traversal.
    /// Only a `quit_after` stagnation limit or the problem's termination
    /// predicate stops a run early; both are normal outcomes.
    ///
    /// # Panics
    /// Panics if `opts` fails validation.
    pub fn run(&mut self, opts: &RunOptions) -> Chromosome {
        opts.validate().expect("invalid RunOptions");
        let start = Instant::now();

        // Sentinels guaranteed to be replaced in the first generation.
        self.min_fit_ever = f64::INFINITY;
        self.max_fit_ever = f64::NEG_INFINITY;
        self.stats.reset();
        self.cache.clear();
        self.score_population();

        let mut overall_fittest = {
            let idx = self.fittest_index();
            self.population[idx].clone()
        };
        let mut overall_fittest_fit = self.fitness_of(&overall_fittest);
        let mut gens_since_upset = 0usize;

        for gen in 1..=opts.generations {
            let population = std::mem::take(&mut self.population);
            let survivors = self.compete(population);
            self.population = self.reproduce(survivors, opts.p_crossover, None);
            self.mutate_in_place(opts.p_mutate);
            self.score_population();

            let gen_fittest = {
                let idx = self.fittest_index();
                self.population[idx].clone()
            };
            let gen_fittest_fit = self.fitness_of(&gen_fittest);
            debug!(
                "generation {gen}: fittest {gen_fittest_fit}, best so far {overall_fittest_fit}"
            );

            if gen_fittest_fit > overall_fittest_fit {
                overall_fittest = gen_fittest.clone();
                overall_fittest_fit = gen_fittest_fit;
                self.stats.new_fittest_generations.push(gen);
                gens_since_upset = 0;
            } else {
                gens_since_upset += 1;

                if opts.elitist {
                    // No new fittest found: inject the best genotype into
                    // the weakest individual without inserting a duplicate
                    // object.
                    let mut population = std::mem::take(&mut self.population);
                    self.sort_by_fitness(&mut population);
                    population[0].write_dna(&overall_fittest.dna());
                    self.population = population;
                }
            }

            if let Some(quit_after) = opts.quit_after {
                if gens_since_upset >= quit_after {
                    info!(
                        "quitting on generation {gen} after {quit_after} generations with no upset"
                    );
                    break;
                }
            }

            if let Some(refresh_after) = opts.refresh_after {
                if gens_since_upset >= refresh_after {
                    // A very long time since a new best solution: mix
                    // things up without stopping the run.
                    info!("refreshing population on generation {gen}");
                    self.mutate_in_place(REFRESH_MUTATION_RATE);
                    self.score_population();
                    gens_since_upset = 0;
                }
            }

            self.stats.record(
                gen,
                GenerationRecord {
                    fittest: gen_fittest,
                    fittest_fitness: gen_fittest_fit,
                    best_fitness_so_far: overall_fittest_fit,
                },
            );

            if self.problem.should_terminate(&overall_fittest) {
                break;
            }
        }

        self.stats.run_duration = Some(start.elapsed());
        overall_fittest
    }

    /// Simulates competition: every chromosome survives with a probability
    /// blended from its position in the run's all-time fitness range and in
    /// the current generation's range.
    ///
    /// Returns the survivors in ascending fitness order. When the draw
    /// leaves no survivors, the entire input population survives; a
    /// complete wipeout is disallowed by policy.
    fn compete(&mut self, mut chromosomes: Vec<Chromosome>) -> Vec<Chromosome> {
        self.sort_by_fitness(&mut chromosomes);
        let mut fits = Vec::with_capacity(chromosomes.len());
        for chromosome in &chromosomes {
            fits.push(self.fitness_of(chromosome));
        }
        let min_fit = fits[0];
        let max_fit = *fits.last().expect("population is never empty");

        if min_fit < self.min_fit_ever {
            self.min_fit_ever = min_fit;
        }
        if max_fit > self.max_fit_ever {
            self.max_fit_ever = max_fit;
        }

        let overall_range = self.max_fit_ever - self.min_fit_ever;
        let current_range = max_fit - min_fit;

        let keep: Vec<bool> = fits
            .iter()
            .map(|&fit| {
                // Zero range means every individual sits at the top of it.
                let p_absolute = if overall_range != 0.0 {
                    (fit - self.min_fit_ever) / overall_range
                } else {
                    1.0
                };
                let p_relative = if current_range != 0.0 {
                    (fit - min_fit) / current_range
                } else {
                    1.0
                };
                let p_survival =
                    self.config.abs_weight * p_absolute + self.config.rel_weight * p_relative;
                self.rng.random_range(0.0..1.0) < p_survival
            })
            .collect();

        if keep.iter().any(|&kept| kept) {
            chromosomes
                .into_iter()
                .zip(keep)
                .filter_map(|(chromosome, kept)| kept.then_some(chromosome))
                .collect()
        } else {
            chromosomes
        }
    }

    /// Regrows the population from a survivor pool until the target size is
    /// met (the original population size unless overridden).
    ///
    /// Each offspring copies one survivor sampled by the fitness-weighted
    /// cumulative distribution; with probability `p_crossover` it is
    /// crossed over with a uniformly chosen mate copy at a uniform point.
    /// Survivors are never mutated in place.
    fn reproduce(
        &mut self,
        mut survivors: Vec<Chromosome>,
        p_crossover: f64,
        target_size: Option<usize>,
    ) -> Vec<Chromosome> {
        let target = target_size.unwrap_or(self.orig_pop_size);
        let cdf = self.fitness_cdf(&mut survivors);
        let num_survivors = survivors.len();

        let mut offspring = Vec::with_capacity(target.saturating_sub(num_survivors));
        while num_survivors + offspring.len() < target {
            let mut child = weighted_choice(&survivors, &cdf, &mut self.rng).clone();

            if self.rng.random_range(0.0..1.0) < p_crossover {
                // The mate is drawn uniformly and may be the same survivor
                // the child was copied from.
                let mate_idx = self.rng.random_range(0..num_survivors);
                let mut mate = survivors[mate_idx].clone();
                let point = self.rng.random_range(0..child.length());
                child.crossover(&mut mate, point);
            }

            offspring.push(child);
        }

        survivors.extend(offspring);
        survivors
    }

    /// Computes fitness-weighted cumulative reproduction probabilities for
    /// a survivor pool, sorting it ascending in place.
    ///
    /// The weakest member gets cumulative probability 0 (it can still be
    /// crossed over with as a mate) scaling linearly to 1 for the fittest.
    /// When every survivor has equal fitness the probabilities fall back to
    /// uniform ranks.
    fn fitness_cdf(&mut self, survivors: &mut Vec<Chromosome>) -> Vec<f64> {
        self.sort_by_fitness(survivors);
        let mut fits = Vec::with_capacity(survivors.len());
        for chromosome in survivors.iter() {
            fits.push(self.fitness_of(chromosome));
        }
        let min_fit = fits[0];
        let range = fits.last().expect("survivor pool is never empty") - min_fit;

        if range == 0.0 {
            let n = survivors.len() as f64;
            (1..=survivors.len()).map(|i| i as f64 / n).collect()
        } else {
            fits.iter().map(|fit| (fit - min_fit) / range).collect()
        }
    }

    /// Checks every chromosome for mutation at rate `p_mutate`.
    fn mutate_in_place(&mut self, p_mutate: f64) {
        let rng = &mut self.rng;
        for chromosome in &mut self.population {
            chromosome.mutate(p_mutate, rng);
        }
    }

    /// Sorts chromosomes into ascending fitness order. The sort is stable,
    /// so equal-fitness individuals keep their relative order.
    fn sort_by_fitness(&mut self, chromosomes: &mut Vec<Chromosome>) {
        let mut keyed: Vec<(f64, Chromosome)> = chromosomes
            .drain(..)
            .map(|chromosome| {
                let fit = self.fitness_of(&chromosome);
                (fit, chromosome)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        chromosomes.extend(keyed.into_iter().map(|(_, chromosome)| chromosome));
    }

    /// Returns the index of the first chromosome with the highest fitness.
    fn fittest_index(&mut self) -> usize {
        let mut best_idx = 0;
        let mut best_fit = f64::NEG_INFINITY;
        for idx in 0..self.population.len() {
            let fit = self.fitness_by_index(idx);
            if fit > best_fit {
                best_fit = fit;
                best_idx = idx;
            }
        }
        best_idx
    }

    /// Cached fitness lookup for a chromosome outside the population.
    fn fitness_of(&mut self, chromosome: &Chromosome) -> f64 {
        let dna = chromosome.dna();
        if let Some(&fit) = self.cache.get(&dna) {
            return fit;
        }
        let fit = self.problem.fitness(chromosome);
        self.cache.insert(dna, fit);
        fit
    }

    /// Cached fitness lookup for a population member.
    fn fitness_by_index(&mut self, idx: usize) -> f64 {
        let dna = self.population[idx].dna();
        if let Some(&fit) = self.cache.get(&dna) {
            return fit;
        }
        let fit = self.problem.fitness(&self.population[idx]);
        self.cache.insert(dna, fit);
        fit
    }

    /// Pre-fills the fitness cache for every uncached DNA string in the
    /// population, in parallel when configured. Sequential engines fill the
    /// cache lazily instead.
    fn score_population(&mut self) {
        if !self.config.parallel {
            return;
        }
        let mut seen = HashSet::new();
        let mut pending: Vec<(String, usize)> = Vec::new();
        for (idx, chromosome) in self.population.iter().enumerate() {
            let dna = chromosome.dna();
            if !self.cache.contains_key(&dna) && seen.insert(dna.clone()) {
                pending.push((dna, idx));
            }
        }
        if pending.is_empty() {
            return;
        }

        let problem = &self.problem;
        let population = &self.population;
        let scored: Vec<(String, f64)> = pending
            .into_par_iter()
            .map(|(dna, idx)| {
                let fit = problem.fitness(&population[idx]);
                (dna, fit)
            })
            .collect();
        self.cache.extend(scored);
    }
}

/// Selects a survivor by cumulative probability: the first whose cumulative
/// value exceeds a uniform draw. The fittest carries cumulative probability
/// 1, so the scan always lands.
fn weighted_choice<'a, R: Rng>(
    survivors: &'a [Chromosome],
    cdf: &[f64],
    rng: &mut R,
) -> &'a Chromosome {
    debug_assert_eq!(survivors.len(), cdf.len());
    let draw = rng.random_range(0.0..1.0);
    for (chromosome, &cumulative) in survivors.iter().zip(cdf) {
        if draw < cumulative {
            return chromosome;
        }
    }
    survivors.last().expect("survivor pool is never empty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::{Alphabet, Gene};
    use crate::translate::Translator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ---- Most-ones: maximize the count of '1' characters ----

    struct MostOnes;

    impl FitnessSource for MostOnes {
        fn fitness(&self, chromosome: &Chromosome) -> f64 {
            chromosome.dna().bytes().filter(|&b| b == b'1').count() as f64
        }
    }

    struct ConstantFitness;

    impl FitnessSource for ConstantFitness {
        fn fitness(&self, _chromosome: &Chromosome) -> f64 {
            5.0
        }
    }

    fn binary(dna: &str) -> Gene {
        Gene::new(Alphabet::Binary, dna).unwrap()
    }

    fn binary_population(bits: usize, count: usize, seed: u64) -> Vec<Chromosome> {
        let mut rng = create_rng(seed);
        Chromosome::create_random(Alphabet::Binary, &[bits], count, &mut rng)
    }

    fn seeded_config(seed: u64) -> EngineConfig {
        EngineConfig::default().with_seed(seed)
    }

    // ---- Construction ----

    #[test]
    fn test_new_rejects_empty_population() {
        let result = Engine::new(MostOnes, vec![], seeded_config(42));
        assert!(matches!(result, Err(Error::EmptyPopulation)));
    }

    #[test]
    fn test_new_rejects_mixed_lengths() {
        let mut rng = create_rng(42);
        let mut population = binary_population(8, 3, 1);
        population.push(Chromosome::create_random(Alphabet::Binary, &[9], 1, &mut rng).remove(0));
        let result = Engine::new(MostOnes, population, seeded_config(42));
        assert!(matches!(result, Err(Error::HeterogeneousPopulation)));
    }

    #[test]
    fn test_new_rejects_mixed_variants() {
        let mut population = binary_population(4, 3, 1);
        let genes = vec![
            Gene::new(Alphabet::Binary, "00").unwrap(),
            Gene::new(Alphabet::Binary, "01").unwrap(),
        ];
        let reordering =
            Chromosome::reordering_set(genes, vec!["00".to_string(), "01".to_string()]).unwrap();
        population.push(reordering);
        let result = Engine::new(MostOnes, population, seeded_config(42));
        assert!(matches!(result, Err(Error::HeterogeneousPopulation)));
    }

    #[test]
    fn test_new_rejects_bad_weights() {
        let config = EngineConfig::default().with_weights(0.8, 0.8);
        let result = Engine::new(MostOnes, binary_population(8, 4, 1), config);
        assert!(matches!(result, Err(Error::InvalidWeights { .. })));
    }

    #[test]
    fn test_fittest_and_weakest_accessors() {
        let population = vec![
            Chromosome::new(vec![binary("1100")]),
            Chromosome::new(vec![binary("1111")]),
            Chromosome::new(vec![binary("0000")]),
        ];
        let mut engine = Engine::new(MostOnes, population, seeded_config(42)).unwrap();
        assert_eq!(engine.fittest().dna(), "1111");
        assert_eq!(engine.weakest().dna(), "0000");
    }

    // ---- Competition ----

    #[test]
    fn test_compete_zero_range_everyone_survives() {
        // With all fitness equal, both ranges degenerate to zero and every
        // survival probability is 1, whatever the weights.
        let config = seeded_config(42).with_weights(1.0, 0.0);
        let mut engine = Engine::new(ConstantFitness, binary_population(8, 12, 1), config).unwrap();
        let population = engine.population.clone();
        let survivors = engine.compete(population);
        assert_eq!(survivors.len(), 12);
    }

    #[test]
    fn test_compete_fittest_always_survives() {
        let mut engine =
            Engine::new(MostOnes, binary_population(16, 20, 3), seeded_config(7)).unwrap();
        for _ in 0..10 {
            let population = engine.population.clone();
            let best_before = {
                let idx = engine.fittest_index();
                engine.fitness_of(&engine.population[idx].clone())
            };
            let survivors = engine.compete(population);
            assert!(!survivors.is_empty());
            let best_after = survivors
                .iter()
                .map(|c| c.dna().bytes().filter(|&b| b == b'1').count() as f64)
                .fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(best_after, best_before);
        }
    }

    // ---- Reproduction ----

    #[test]
    fn test_reproduce_reaches_target_size() {
        let mut engine =
            Engine::new(MostOnes, binary_population(8, 10, 1), seeded_config(42)).unwrap();
        let survivors = engine.population[..3].to_vec();
        let next = engine.reproduce(survivors, 0.5, None);
        assert_eq!(next.len(), 10);
    }

    #[test]
    fn test_reproduce_without_crossover_copies_survivors() {
        let mut engine =
            Engine::new(MostOnes, binary_population(8, 10, 1), seeded_config(42)).unwrap();
        let survivors = engine.population[..3].to_vec();
        let survivor_dna: HashSet<String> = survivors.iter().map(|c| c.dna()).collect();
        let next = engine.reproduce(survivors, 0.0, None);
        assert_eq!(next.len(), 10);
        for chromosome in &next {
            assert!(
                survivor_dna.contains(&chromosome.dna()),
                "offspring must be bit-identical to some survivor when p_crossover is 0"
            );
        }
    }

    #[test]
    fn test_reproduce_respects_explicit_target() {
        let mut engine =
            Engine::new(MostOnes, binary_population(8, 10, 1), seeded_config(42)).unwrap();
        let survivors = engine.population[..2].to_vec();
        let next = engine.reproduce(survivors, 0.25, Some(25));
        assert_eq!(next.len(), 25);
    }

    // ---- Runs ----

    #[test]
    fn test_run_population_returns_to_target_size() {
        let mut engine =
            Engine::new(MostOnes, binary_population(12, 15, 1), seeded_config(42)).unwrap();
        engine.run(&RunOptions::new(20, 0.05, 0.5));
        assert_eq!(engine.population().len(), 15);
    }

    #[test]
    fn test_run_best_so_far_series_is_non_decreasing() {
        let mut engine =
            Engine::new(MostOnes, binary_population(16, 20, 1), seeded_config(42)).unwrap();
        engine.run(&RunOptions::new(60, 0.1, 0.5));
        let series = engine.stats().best_fitness_series();
        assert!(!series.is_empty());
        for window in series.windows(2) {
            assert!(window[1] >= window[0]);
        }
    }

    #[test]
    fn test_run_converges_on_most_ones() {
        let mut engine =
            Engine::new(MostOnes, binary_population(8, 30, 1), seeded_config(42)).unwrap();
        let best = engine.run(&RunOptions::new(200, 0.1, 0.5));
        let fit = best.dna().bytes().filter(|&b| b == b'1').count();
        assert!(fit >= 7, "expected at least 7 of 8 ones, got {fit}");
    }

    #[test]
    fn test_elitism_preserves_best_genotype_without_mutation() {
        let mut engine =
            Engine::new(MostOnes, binary_population(10, 12, 9), seeded_config(42)).unwrap();
        let initial_best = {
            let idx = engine.fittest_index();
            let c = engine.population[idx].clone();
            engine.fitness_of(&c)
        };
        let best = engine.run(&RunOptions::new(15, 0.0, 0.0));
        let best_fit = best.dna().bytes().filter(|&b| b == b'1').count() as f64;
        // Nothing mutates, so fitness can never improve or degrade past the
        // initial best; elitism keeps that genotype present every generation.
        assert_eq!(best_fit, initial_best);
        assert!(engine.stats().new_fittest_generations.is_empty());
        assert!(engine
            .population()
            .iter()
            .any(|c| c.dna() == best.dna()));
        for record in engine.stats().records.values() {
            assert_eq!(record.best_fitness_so_far, initial_best);
        }
    }

    #[test]
    fn test_without_elitism_best_genotype_can_vanish_from_population() {
        // One uniquely fit chromosome among weaker peers. With p_mutate 1
        // every bit flips each generation, so whatever survives, no live
        // chromosome can still carry the best DNA after one generation;
        // only elitism can put it back.
        let population = |seed_best: &str| -> Vec<Chromosome> {
            let mut population = vec![Chromosome::new(vec![binary(seed_best)])];
            for _ in 0..9 {
                population.push(Chromosome::new(vec![binary("1100")]));
            }
            population
        };
        let opts = |elitist: bool| {
            RunOptions::new(1, 1.0, 0.0).with_elitist(elitist)
        };

        let mut engine =
            Engine::new(MostOnes, population("1111"), seeded_config(42)).unwrap();
        let best = engine.run(&opts(false));
        assert_eq!(best.dna(), "1111");
        assert_eq!(engine.stats().best_fitness_series(), vec![4.0]);
        assert!(
            engine.population().iter().all(|c| c.dna() != "1111"),
            "the all-time best genotype must be gone from the live population"
        );

        // Same setup with elitism: the best DNA is written back over the
        // weakest individual.
        let mut engine =
            Engine::new(MostOnes, population("1111"), seeded_config(42)).unwrap();
        engine.run(&opts(true));
        assert!(engine.population().iter().any(|c| c.dna() == "1111"));
    }

    #[test]
    fn test_quit_after_stops_before_recording_the_quitting_generation() {
        let mut engine =
            Engine::new(ConstantFitness, binary_population(8, 10, 1), seeded_config(42)).unwrap();
        engine.run(&RunOptions::new(100, 0.1, 0.5).with_quit_after(5));
        // Constant fitness never improves: the counter hits 5 on generation
        // 5, which quits before that generation is recorded.
        assert_eq!(engine.stats().records.len(), 4);
        assert!(engine.stats().new_fittest_generations.is_empty());
    }

    #[test]
    fn test_refresh_after_resets_stagnation_instead_of_quitting() {
        let mut engine =
            Engine::new(ConstantFitness, binary_population(8, 10, 1), seeded_config(42)).unwrap();
        engine.run(&RunOptions::new(12, 0.05, 0.25).with_refresh_after(3));
        // Refresh keeps resetting the counter, so the run completes.
        assert_eq!(engine.stats().records.len(), 12);
        assert!(engine.stats().run_duration.is_some());
    }

    #[test]
    fn test_termination_predicate_stops_the_run() {
        struct UntilAllOnes;

        impl FitnessSource for UntilAllOnes {
            fn fitness(&self, chromosome: &Chromosome) -> f64 {
                chromosome.dna().bytes().filter(|&b| b == b'1').count() as f64
            }

            fn should_terminate(&self, overall_fittest: &Chromosome) -> bool {
                overall_fittest.dna().bytes().all(|b| b == b'1')
            }
        }

        let mut engine =
            Engine::new(UntilAllOnes, binary_population(3, 20, 1), seeded_config(42)).unwrap();
        let best = engine.run(&RunOptions::new(500, 0.25, 0.5));
        assert_eq!(best.dna(), "111");
        assert!(engine.stats().records.len() < 500);
    }

    #[test]
    fn test_seeded_runs_are_deterministic() {
        let opts = RunOptions::new(40, 0.1, 0.5);
        let run = |seed: u64| {
            let mut engine =
                Engine::new(MostOnes, binary_population(12, 15, 7), seeded_config(seed)).unwrap();
            let best = engine.run(&opts);
            (best.dna(), engine.stats().best_fitness_series())
        };
        let (best_a, series_a) = run(42);
        let (best_b, series_b) = run(42);
        assert_eq!(best_a, best_b);
        assert_eq!(series_a, series_b);
    }

    #[test]
    fn test_fitness_is_cached_per_dna_string() {
        struct CountingOnes {
            evals: AtomicUsize,
        }

        impl FitnessSource for CountingOnes {
            fn fitness(&self, chromosome: &Chromosome) -> f64 {
                self.evals.fetch_add(1, Ordering::Relaxed);
                chromosome.dna().bytes().filter(|&b| b == b'1').count() as f64
            }
        }

        let problem = CountingOnes {
            evals: AtomicUsize::new(0),
        };
        let population = binary_population(8, 4, 1);
        let probe = population[0].clone();
        let mut engine = Engine::new(problem, population, seeded_config(42)).unwrap();

        engine.fitness_of(&probe);
        engine.fitness_of(&probe);
        assert_eq!(engine.problem.evals.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_parallel_scoring_matches_sequential() {
        let opts = RunOptions::new(30, 0.1, 0.5);
        let run = |parallel: bool| {
            let config = seeded_config(42).with_parallel(parallel);
            let mut engine =
                Engine::new(MostOnes, binary_population(12, 15, 7), config).unwrap();
            let best = engine.run(&opts);
            (best.dna(), engine.stats().best_fitness_series())
        };
        // Scores land in the cache before any selection draw, so the random
        // stream and therefore the whole run are identical.
        assert_eq!(run(false), run(true));
    }

    // ---- End-to-end: biggest multiple ----

    struct BiggestMultiple {
        factors: Vec<u64>,
        max_encoded: f64,
    }

    impl BiggestMultiple {
        fn decode(chromosome: &Chromosome) -> u64 {
            Translator::BinaryInt.decode_gene(&chromosome.genes()[0]) as u64
        }
    }

    impl FitnessSource for BiggestMultiple {
        fn fitness(&self, chromosome: &Chromosome) -> f64 {
            let number = Self::decode(chromosome);
            let mut score = 0i64;
            for &factor in &self.factors {
                if number % factor == 0 {
                    score += 1;
                } else {
                    score -= 1;
                }
            }
            // Scale factors achieved by the solution's share of the largest
            // encodable integer, so bigger multiples win.
            score as f64 * number as f64 / self.max_encoded
        }

        fn should_terminate(&self, overall_fittest: &Chromosome) -> bool {
            let number = Self::decode(overall_fittest);
            number > 0 && self.factors.iter().all(|&factor| number % factor == 0)
        }
    }

    #[test]
    fn test_biggest_multiple_converges_to_a_common_multiple() {
        let factors = vec![2, 3, 7, 11];
        let problem = BiggestMultiple {
            factors: factors.clone(),
            max_encoded: f64::from(u16::MAX),
        };
        let mut engine =
            Engine::new(problem, binary_population(16, 40, 5), seeded_config(42)).unwrap();
        let best = engine.run(&RunOptions::new(20_000, 0.2, 0.25));
        let number = BiggestMultiple::decode(&best);
        for factor in factors {
            assert_eq!(number % factor, 0, "{number} is not divisible by {factor}");
        }
    }

    // ---- End-to-end: reordering set ----

    #[test]
    fn test_reordering_population_always_decodes_to_the_full_set() {
        const CHOICES: [&str; 5] = ["000", "001", "010", "011", "100"];

        struct PreferAscending;

        impl FitnessSource for PreferAscending {
            fn fitness(&self, chromosome: &Chromosome) -> f64 {
                let values = Translator::BinaryInt.decode_chromosome(chromosome);
                let ordered = values.windows(2).filter(|pair| pair[0] <= pair[1]).count();
                ordered as f64
            }
        }

        let mut rng = create_rng(11);
        let choices: Vec<String> = CHOICES.iter().map(|s| s.to_string()).collect();
        let population: Vec<Chromosome> = (0..15)
            .map(|_| {
                let mut order: Vec<&str> = CHOICES.to_vec();
                // Seeded shuffle by repeated swaps.
                for i in 0..order.len() {
                    let j = rng.random_range(0..order.len());
                    order.swap(i, j);
                }
                let genes = order
                    .iter()
                    .map(|dna| Gene::new(Alphabet::Binary, *dna).unwrap())
                    .collect();
                Chromosome::reordering_set(genes, choices.clone()).unwrap()
            })
            .collect();

        let mut engine = Engine::new(PreferAscending, population, seeded_config(42)).unwrap();
        let best = engine.run(&RunOptions::new(200, 0.2, 0.5));

        for chromosome in engine.population().iter().chain(std::iter::once(&best)) {
            let seen: HashSet<&str> = chromosome.genes().iter().map(|g| g.dna()).collect();
            assert_eq!(seen.len(), CHOICES.len());
            for choice in CHOICES {
                assert!(seen.contains(choice), "missing {choice}");
            }
        }
    }
}
