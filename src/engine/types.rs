//! The contract between the engine and domain-specific problems.

use crate::chromosome::Chromosome;

/// Supplies fitness for candidate solutions.
///
/// This is the one trait a caller must implement to plug a problem into
/// the engine. Fitness is a caller-defined scalar where **higher is
/// better**; the mapping from DNA string to fitness must be pure and
/// deterministic within a run, because the engine caches scores per unique
/// DNA string.
///
/// # Thread safety
///
/// `FitnessSource` must be `Send + Sync` because the engine may score the
/// population in parallel with rayon.
///
/// # Implementing
///
/// ```
/// use evostrand::chromosome::Chromosome;
/// use evostrand::engine::FitnessSource;
/// use evostrand::translate::Translator;
///
/// struct LargestValue;
///
/// impl FitnessSource for LargestValue {
///     fn fitness(&self, chromosome: &Chromosome) -> f64 {
///         Translator::BinaryInt.decode_gene(&chromosome.genes()[0])
///     }
/// }
/// ```
pub trait FitnessSource: Send + Sync {
    /// Returns a fitness score for a chromosome. Higher is better.
    fn fitness(&self, chromosome: &Chromosome) -> f64;

    /// Returns whether the current run should stop, called once per
    /// generation after statistics are recorded with the all-time fittest
    /// chromosome so far.
    ///
    /// The default never terminates early; the run ends when its generation
    /// budget (or a stagnation limit) is exhausted. A caller wanting hard
    /// wall-clock cancellation checks it here.
    fn should_terminate(&self, _overall_fittest: &Chromosome) -> bool {
        false
    }
}
