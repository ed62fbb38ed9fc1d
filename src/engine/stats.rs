//! Per-run statistics.

use crate::chromosome::Chromosome;
use std::collections::BTreeMap;
use std::time::Duration;

/// Snapshot of one generation's outcome.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationRecord {
    /// Independent copy of the generation's fittest chromosome.
    pub fittest: Chromosome,

    /// Its fitness.
    pub fittest_fitness: f64,

    /// The all-time-best fitness as of this generation.
    pub best_fitness_so_far: f64,
}

/// Statistics gathered across one `run` call.
///
/// Reset at the start of every run and readable afterwards. Generations
/// are indexed from 1; a generation cut short by a stagnation quit is not
/// recorded.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStats {
    /// Append-only record per completed generation.
    pub records: BTreeMap<usize, GenerationRecord>,

    /// Generations in which a new all-time best was found, in order.
    pub new_fittest_generations: Vec<usize>,

    /// Wall-clock duration of the run, set when it finishes.
    pub run_duration: Option<Duration>,
}

impl RunStats {
    pub(crate) fn reset(&mut self) {
        self.records.clear();
        self.new_fittest_generations.clear();
        self.run_duration = None;
    }

    pub(crate) fn record(&mut self, generation: usize, record: GenerationRecord) {
        self.records.insert(generation, record);
    }

    /// Returns the all-time-best fitness series in generation order.
    pub fn best_fitness_series(&self) -> Vec<f64> {
        self.records
            .values()
            .map(|record| record.best_fitness_so_far)
            .collect()
    }

    /// Returns the per-generation fittest fitness series in generation
    /// order.
    pub fn generation_fitness_series(&self) -> Vec<f64> {
        self.records
            .values()
            .map(|record| record.fittest_fitness)
            .collect()
    }
}
