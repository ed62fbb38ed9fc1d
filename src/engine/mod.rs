//! Evolutionary engine.
//!
//! The engine owns a homogeneous population of [`crate::chromosome::Chromosome`]s
//! and drives the generational loop: competition (survival-probability
//! blending of all-time and current-generation fitness ranges), weighted
//! reproduction with optional crossover, mutation, elitism, stagnation
//! handling (refresh and early quit), and an overridable termination
//! predicate.
//!
//! # Core trait
//!
//! - [`FitnessSource`]: the one capability a problem must implement —
//!   a pure fitness function, plus an optional termination predicate
//!
//! # Key types
//!
//! - [`EngineConfig`]: construction parameters (survival weights, seed,
//!   parallel scoring)
//! - [`RunOptions`]: per-run parameters (generations, rates, elitism,
//!   stagnation thresholds)
//! - [`Engine`]: owns the population and executes runs
//! - [`RunStats`]: per-generation records readable after a run

mod config;
mod runner;
mod stats;
mod types;

pub use config::{EngineConfig, RunOptions};
pub use runner::Engine;
pub use stats::{GenerationRecord, RunStats};
pub use types::FitnessSource;
