//! Crate error type.
//!
//! Every variant is a precondition violation: it surfaces synchronously at
//! the call that introduced it and is not retried. Degenerate-but-valid
//! numeric states (zero fitness range, zero survivors) are handled by
//! fallback policies inside the engine and never appear here.

use crate::gene::Alphabet;

/// Errors raised by encoding construction and engine configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A DNA character is not a member of the gene's declared alphabet.
    #[error("invalid encoding: character {character:?} is not in the {alphabet:?} alphabet")]
    InvalidEncoding {
        /// The offending character.
        character: char,
        /// The alphabet it was checked against.
        alphabet: Alphabet,
    },

    /// A DNA string does not match the required length exactly.
    #[error("DNA length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length required by the receiving gene or chromosome.
        expected: usize,
        /// Length of the string that was supplied.
        actual: usize,
    },

    /// Survival-probability weights are outside `[0, 1]` or do not sum to 1.
    #[error("fitness weights must each lie in [0, 1] and sum to 1, got abs={abs} rel={rel}")]
    InvalidWeights {
        /// All-time (environmental) fitness weight.
        abs: f64,
        /// Current-generation (competitive) fitness weight.
        rel: f64,
    },

    /// A probability parameter lies outside `[0, 1]`.
    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidProbability {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A run was requested with zero generations.
    #[error("generations must be at least 1")]
    ZeroGenerations,

    /// A stagnation threshold was set to zero; use `None` to disable.
    #[error("{0} must be at least 1 when set")]
    ZeroThreshold(&'static str),

    /// The initial population was empty.
    #[error("population must not be empty")]
    EmptyPopulation,

    /// The initial population mixes chromosome variants or total lengths.
    #[error("population is not homogeneous: all chromosomes must share one variant and total length")]
    HeterogeneousPopulation,

    /// A reordering-set choice list contains a duplicate entry.
    #[error("choice set contains duplicate entry {0:?}")]
    DuplicateChoice(String),

    /// Reordering-set genes do not cover the declared choice set exactly.
    #[error("genes do not cover the declared choice set exactly once each")]
    IncompleteChoiceSet,
}
