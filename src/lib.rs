//! String-encoded evolutionary optimization.
//!
//! A domain-agnostic genetic algorithm engine over fixed-alphabet string
//! encodings. Candidate solutions are [`chromosome::Chromosome`]s — ordered
//! strands of [`gene::Gene`]s — and the caller supplies only a fitness
//! function via [`engine::FitnessSource`]; everything else (selection,
//! recombination, mutation, elitism, stagnation handling) is handled
//! generically by [`engine::Engine`].
//!
//! # Layers
//!
//! - [`gene`]: atomic encoded units with fixed alphabets, random generation,
//!   and independent-site mutation.
//! - [`chromosome`]: ordered gene strands with whole-string crossover, plus
//!   a reordering-set variant that preserves a permutation invariant.
//! - [`translate`]: stateless, pure decoders from encoded bits to domain
//!   values (binary integers, signed fixed-point reals, decimal integers).
//! - [`engine`]: the generational loop, survival-probability blending, and
//!   run statistics.
//!
//! The crate contains no problem definitions, plotting, or CLI wiring —
//! those are clients that supply a fitness function and an initial
//! population, and read the per-generation results back.

pub mod chromosome;
pub mod engine;
pub mod error;
pub mod gene;
pub mod random;
pub mod translate;
