use serde::Serialize;

use crate::error::{Result, ThresholdError};
use crate::thresholds::{canonicalize, validate_threshold_count, ThresholdVector};

use super::histogram::{Histogram, NUM_BINS};
use super::membership::{column_entropy, memberships_at};
use super::Objective;

/// default logistic steepness (scale of the fuzzy boundary, in gray levels)
pub const DEFAULT_STEEPNESS: f64 = 2.0;

/// fuzzy-entropy fitness of a threshold vector over one image histogram (higher is better).
/// serialize-only: every instance goes through `new`, which rejects non-positive steepness.
#[derive(Clone, Debug, Serialize)]
pub struct FuzzyEntropyObjective {
    probabilities: Vec<f64>,
    k: usize,
    steepness: f64,
}

impl FuzzyEntropyObjective {
    pub fn new(histogram: &Histogram, k: usize, steepness: f64) -> Result<Self> {
        validate_threshold_count(k)?;
        if !steepness.is_finite() || steepness <= 0.0 {
            return Err(ThresholdError::InvalidConfiguration(format!(
                "steepness must be finite and positive, got {steepness}"
            )));
        }
        Ok(Self {
            probabilities: histogram.probabilities(),
            k,
            steepness,
        })
    }

    /// objective with the default steepness of 2.0
    pub fn with_default_steepness(histogram: &Histogram, k: usize) -> Result<Self> {
        Self::new(histogram, k, DEFAULT_STEEPNESS)
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn steepness(&self) -> f64 {
        self.steepness
    }

    /// score an already canonical threshold vector
    pub fn score_thresholds(&self, t: &ThresholdVector) -> f64 {
        profiling::scope!("FuzzyEntropyObjective::score_thresholds");
        let t = t.as_slice();
        if t.is_empty() {
            return 0.0;
        }
        let mut mu = vec![0.0; t.len() + 1];
        let mut score = 0.0;
        for b in 0..NUM_BINS {
            let p = self.probabilities[b];
            if p == 0.0 {
                continue;
            }
            memberships_at(t, b, self.steepness, &mut mu);
            score += p * column_entropy(&mu);
        }
        score
    }
}

impl Objective for FuzzyEntropyObjective {
    fn evaluate(&self, position: &[f64]) -> f64 {
        self.score_thresholds(&canonicalize(position, self.k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::two_blocks;

    #[test]
    fn test_rejects_bad_configuration() {
        let h = two_blocks();
        assert!(FuzzyEntropyObjective::new(&h, 0, 2.0).is_err());
        assert!(FuzzyEntropyObjective::new(&h, 2, 0.0).is_err());
        assert!(FuzzyEntropyObjective::new(&h, 2, f64::NAN).is_err());
    }

    #[test]
    fn test_all_zero_histogram_scores_zero() {
        let h = Histogram::new(&[0.0; NUM_BINS]).unwrap();
        let obj = FuzzyEntropyObjective::with_default_steepness(&h, 2).unwrap();
        let s = obj.evaluate(&[60.0, 190.0]);
        assert!(s.is_finite());
        assert_eq!(s, 0.0);
    }

    #[test]
    fn test_score_is_finite_for_extreme_positions() {
        let h = two_blocks();
        let obj = FuzzyEntropyObjective::new(&h, 3, 1e-9).unwrap();
        for raw in [[-1e300, 0.0, 1e300], [254.0, 254.0, 254.0], [1.0, 1.0, 1.0]] {
            assert!(obj.evaluate(&raw).is_finite());
        }
    }

    #[test]
    fn test_threshold_in_populated_block_beats_empty_valley() {
        let obj = FuzzyEntropyObjective::with_default_steepness(&two_blocks(), 1).unwrap();
        let inside = obj.evaluate(&[40.0]);
        let valley = obj.evaluate(&[127.0]);
        assert!(inside > valley, "inside {inside} vs valley {valley}");
        assert!(valley < 1e-3);
    }

    #[test]
    fn test_evaluate_canonicalizes_raw_position() {
        let obj = FuzzyEntropyObjective::with_default_steepness(&two_blocks(), 2).unwrap();
        let a = obj.evaluate(&[200.3, 40.1]);
        let b = obj.score_thresholds(&canonicalize(&[40.0, 200.0], 2));
        assert_eq!(a, b);
    }

    #[test]
    fn test_score_bounded_by_ln_classes() {
        let obj = FuzzyEntropyObjective::with_default_steepness(&two_blocks(), 3).unwrap();
        let s = obj.evaluate(&[30.0, 60.0, 200.0]);
        assert!(s >= 0.0 && s <= (4.0f64).ln() + 1e-9);
    }

    #[test]
    fn test_serialized_form_carries_validated_steepness() {
        let obj = FuzzyEntropyObjective::new(&two_blocks(), 2, 3.5).unwrap();
        let v = serde_json::to_value(&obj).unwrap();
        assert_eq!(v["k"], 2);
        assert_eq!(v["steepness"], 3.5);
        assert_eq!(v["probabilities"].as_array().unwrap().len(), NUM_BINS);
        // the only way back to an objective is through the validating constructor
        assert!(FuzzyEntropyObjective::new(&two_blocks(), 2, 0.0).is_err());
    }
}
