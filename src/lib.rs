//! Multi-level image thresholding by fuzzy-entropy maximization.
//!
//! A 256-bin gray-level histogram is scored by [`fitness::FuzzyEntropyObjective`] and a
//! threshold vector is searched with one of the population optimizers in [`engine`]
//! (GA, PSO, WOA or the multifactorial MFWOA that solves several K in one run).
//! [`otsu::multi_otsu`] provides the classical baseline and [`engine::solve`] dispatches
//! by [`engine::Algorithm`].

pub mod engine;
pub mod error;
pub mod fitness;
pub mod otsu;
pub mod settings;
pub mod thresholds;

pub use engine::{solve, Algorithm, OptimizationResult, Task, TaskOutcome};
pub use error::{Result, ThresholdError};
pub use fitness::{FuzzyEntropyObjective, Histogram, Objective};
pub use settings::RunSettings;
pub use thresholds::{canonicalize, ThresholdVector};
