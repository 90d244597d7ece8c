// threshold canonicalization
//
// repairs a raw real-valued position into a threshold vector:
// - rounded to integer gray levels
// - sorted ascending
// - clipped to [THRESHOLD_MIN, THRESHOLD_MAX]
// - strictly increasing (except when saturation at the top forces duplicates)

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThresholdError};

/// lowest admissible threshold (0 would leave the first class empty)
pub const THRESHOLD_MIN: i32 = 1;
/// highest admissible threshold (255 would leave the last class empty)
pub const THRESHOLD_MAX: i32 = 254;
/// number of distinct admissible thresholds, i.e. the largest K that can be strictly increasing
pub const MAX_THRESHOLDS: usize = (THRESHOLD_MAX - THRESHOLD_MIN + 1) as usize;

/// ordered integer cut points dividing 0..=255 into K+1 classes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdVector(Vec<u8>);

impl ThresholdVector {
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// false only when upper-bound saturation produced repeated 254 entries
    pub fn is_strictly_increasing(&self) -> bool {
        self.0.windows(2).all(|w| w[0] < w[1])
    }

    /// thresholds as reals, e.g. to seed a position or feed the objective directly
    pub fn to_position(&self) -> Vec<f64> {
        self.0.iter().map(|&t| t as f64).collect()
    }
}

impl AsRef<[u8]> for ThresholdVector {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<ThresholdVector> for Vec<u8> {
    fn from(t: ThresholdVector) -> Self {
        t.0
    }
}

/// canonicalize the first `k` components of `raw`.
/// in-engine callers guarantee `raw.len() >= k`; missing components are ignored
/// (use `try_canonicalize` at API boundaries).
///
/// degraded output is accepted: when many components crowd the top of the range the
/// bump pass saturates at THRESHOLD_MAX and the tail repeats 254. check
/// `is_strictly_increasing()` on the result if that matters to the caller.
pub fn canonicalize(raw: &[f64], k: usize) -> ThresholdVector {
    profiling::scope!("canonicalize");

    let take = k.min(raw.len());
    let mut v: Vec<i32> = raw[..take]
        .iter()
        .map(|&x| {
            // NaN goes to the bottom of the range instead of poisoning the sort
            if x.is_nan() {
                THRESHOLD_MIN
            } else {
                let r = x.round_ties_even();
                r.clamp(i32::MIN as f64, i32::MAX as f64) as i32
            }
        })
        .collect();

    v.sort_unstable();
    for t in v.iter_mut() {
        *t = (*t).clamp(THRESHOLD_MIN, THRESHOLD_MAX);
    }
    for i in 1..v.len() {
        if v[i] <= v[i - 1] {
            v[i] = (v[i - 1] + 1).min(THRESHOLD_MAX);
        }
    }

    ThresholdVector(v.into_iter().map(|t| t as u8).collect())
}

/// checked variant of `canonicalize` for positions coming from outside the engine.
pub fn try_canonicalize(raw: &[f64], k: usize) -> Result<ThresholdVector> {
    if k == 0 {
        return Err(ThresholdError::InvalidConfiguration(
            "threshold count k must be at least 1".to_string(),
        ));
    }
    if raw.len() < k {
        return Err(ThresholdError::DimensionMismatch { expected: k, actual: raw.len() });
    }
    Ok(canonicalize(raw, k))
}

/// shared guard for every population optimizer: a zero-dimensional search space is undefined
/// and more than MAX_THRESHOLDS levels can never be strictly increasing.
pub fn validate_threshold_count(k: usize) -> Result<()> {
    if k == 0 {
        return Err(ThresholdError::InvalidConfiguration(
            "threshold count k must be at least 1".to_string(),
        ));
    }
    if k > MAX_THRESHOLDS {
        return Err(ThresholdError::InvalidConfiguration(format!(
            "threshold count k = {k} exceeds the {MAX_THRESHOLDS} admissible gray levels"
        )));
    }
    Ok(())
}
