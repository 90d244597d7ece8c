// Fitness module organization
// Each submodule handles a specific aspect of fitness computation

pub mod fuzzy_entropy;
pub mod histogram;
pub mod membership;

// Re-export commonly used types and functions
pub use fuzzy_entropy::{FuzzyEntropyObjective, DEFAULT_STEEPNESS};
pub use histogram::{Histogram, NUM_BINS};
pub use membership::{entropy_profile, logistic, LOGISTIC_ARG_LIMIT};

/// scalar fitness of a raw position vector (higher is better).
/// must be pure: GA and PSO evaluate whole generations on the rayon pool.
pub trait Objective: Sync {
    fn evaluate(&self, position: &[f64]) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&[f64]) -> f64 + Sync,
{
    #[inline]
    fn evaluate(&self, position: &[f64]) -> f64 {
        self(position)
    }
}
