//─────────────────────────────────────────────────────────────────────────────
// exact multi-level otsu baseline
//─────────────────────────────────────────────────────────────────────────────

use crate::error::{Result, ThresholdError};
use crate::fitness::{Histogram, NUM_BINS};

/// thresholds splitting the histogram into `classes` classes with maximal between-class
/// variance. threshold `t` puts bin `t` in the lower class, so results lie in 0..=254.
///
/// `classes <= 1` and an all-zero histogram give an empty vector. the search is an exact
/// dynamic program over bin boundaries maximizing Σ ω_k μ_k², which differs from the
/// between-class variance only by a constant.
pub fn multi_otsu(histogram: &Histogram, classes: usize) -> Result<Vec<u8>> {
    profiling::scope!("multi_otsu");

    if classes > NUM_BINS {
        return Err(ThresholdError::InvalidConfiguration(format!(
            "otsu supports at most {NUM_BINS} classes, got {classes}"
        )));
    }
    if classes <= 1 || histogram.total() <= 0.0 {
        return Ok(Vec::new());
    }

    let p = histogram.probabilities();

    // prefix sums of mass and first moment; index i covers bins [0, i)
    let mut mass = vec![0.0; NUM_BINS + 1];
    let mut moment = vec![0.0; NUM_BINS + 1];
    for b in 0..NUM_BINS {
        mass[b + 1] = mass[b] + p[b];
        moment[b + 1] = moment[b] + b as f64 * p[b];
    }

    // ω·μ² of the class spanning bins [lo, hi)
    let class_score = |lo: usize, hi: usize| -> f64 {
        let w = mass[hi] - mass[lo];
        if w <= 0.0 {
            0.0
        } else {
            let m = moment[hi] - moment[lo];
            m * m / w
        }
    };

    // best[c][j]: first j bins split into c + 1 non-empty classes
    // split[c][j]: start bin of the last of those classes
    let width = NUM_BINS + 1;
    let mut best = vec![f64::NEG_INFINITY; classes * width];
    let mut split = vec![0usize; classes * width];
    for j in 1..=NUM_BINS {
        best[j] = class_score(0, j);
    }
    for c in 1..classes {
        for j in (c + 1)..=NUM_BINS {
            let mut top = f64::NEG_INFINITY;
            let mut arg = c;
            for i in c..j {
                let prev = best[(c - 1) * width + i];
                if prev == f64::NEG_INFINITY {
                    continue;
                }
                let v = prev + class_score(i, j);
                if v > top {
                    top = v;
                    arg = i;
                }
            }
            best[c * width + j] = top;
            split[c * width + j] = arg;
        }
    }

    // walk the boundaries back from the full histogram
    let mut thresholds = vec![0u8; classes - 1];
    let mut j = NUM_BINS;
    for c in (1..classes).rev() {
        let i = split[c * width + j];
        thresholds[c - 1] = (i - 1) as u8;
        j = i;
    }

    Ok(thresholds)
}
