use serde::{Deserialize, Serialize};

use crate::error::{Result, ThresholdError};

/// number of intensity levels in the 8-bit domain
pub const NUM_BINS: usize = 256;

/// additive guard in the normalization denominator (keeps all-zero histograms finite)
pub const NORMALIZATION_EPS: f64 = 1e-12;

/// intensity distribution of one 8-bit grayscale image.
/// stores raw non-negative weights; `probabilities()` gives the normalized view the objective uses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    bins: Vec<f64>,
}

impl Histogram {
    /// build from 256 non-negative finite weights (counts or probabilities, any scale)
    pub fn new(values: &[f64]) -> Result<Self> {
        if values.len() != NUM_BINS {
            return Err(ThresholdError::InvalidHistogram(format!(
                "expected {NUM_BINS} bins, got {}",
                values.len()
            )));
        }
        if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite() || **v < 0.0) {
            return Err(ThresholdError::InvalidHistogram(format!(
                "bin {i} holds {v}; entries must be finite and non-negative"
            )));
        }
        Ok(Self { bins: values.to_vec() })
    }

    /// build from raw pixel counts
    pub fn from_counts(counts: &[u64]) -> Result<Self> {
        let values: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
        Self::new(&values)
    }

    #[inline]
    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    pub fn total(&self) -> f64 {
        self.bins.iter().sum()
    }

    /// `h / (Σh + eps)`; an all-zero histogram maps to all zeros
    pub fn probabilities(&self) -> Vec<f64> {
        profiling::scope!("Histogram::probabilities");
        let denom = self.total() + NORMALIZATION_EPS;
        self.bins.iter().map(|&h| h / denom).collect()
    }
}
