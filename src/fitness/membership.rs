//─────────────────────────────────────────────────────────────────────────────
// fuzzy partition of the intensity domain (logistic boundaries)
//─────────────────────────────────────────────────────────────────────────────

use super::histogram::NUM_BINS;

/// logistic arguments are clamped to ±LOGISTIC_ARG_LIMIT before exp().
/// exp(500) ≈ 1.4e217 stays finite; beyond the clamp the sigmoid is flat (monotone, not strict).
pub const LOGISTIC_ARG_LIMIT: f64 = 500.0;

/// guard added to the membership sum and inside ln()
pub const MEMBERSHIP_EPS: f64 = 1e-12;

/// overflow-safe logistic 1 / (1 + e^-x)
#[inline]
pub fn logistic(x: f64) -> f64 {
    let x = x.clamp(-LOGISTIC_ARG_LIMIT, LOGISTIC_ARG_LIMIT);
    1.0 / (1.0 + (-x).exp())
}

/// raw (unnormalized) membership of bin `b` in class `j` for thresholds `t` and steepness `s`.
/// class 0 lies left of t[0], class K right of t[K-1], interior classes between neighbours.
#[inline]
fn raw_membership(t: &[u8], j: usize, b: f64, s: f64) -> f64 {
    let k = t.len();
    if j == 0 {
        logistic((t[0] as f64 - b) / s)
    } else if j == k {
        logistic((b - t[k - 1] as f64) / s)
    } else {
        logistic((b - t[j - 1] as f64) / s) * logistic((t[j] as f64 - b) / s)
    }
}

/// fill `out` (length K+1) with the normalized memberships of bin `b`.
/// memberships sum to 1 up to MEMBERSHIP_EPS (partition of unity).
pub fn memberships_at(t: &[u8], b: usize, s: f64, out: &mut [f64]) {
    let bf = b as f64;
    let mut sum = 0.0;
    for (j, m) in out.iter_mut().enumerate() {
        *m = raw_membership(t, j, bf, s);
        sum += *m;
    }
    let denom = sum + MEMBERSHIP_EPS;
    for m in out.iter_mut() {
        *m /= denom;
    }
}

/// fuzzy entropy -Σ μ ln(μ + eps) of one membership column
#[inline]
pub fn column_entropy(mu: &[f64]) -> f64 {
    -mu.iter().map(|&m| m * (m + MEMBERSHIP_EPS).ln()).sum::<f64>()
}

/// per-bin fuzzy entropy across the whole 0..=255 domain
pub fn entropy_profile(t: &[u8], s: f64) -> Vec<f64> {
    profiling::scope!("entropy_profile");
    let mut mu = vec![0.0; t.len() + 1];
    (0..NUM_BINS)
        .map(|b| {
            memberships_at(t, b, s, &mut mu);
            column_entropy(&mu)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logistic_extremes_are_finite() {
        assert_eq!(logistic(1e6), 1.0);
        assert!(logistic(-1e6) > 0.0);
        assert!(logistic(-1e6).is_finite());
        assert!((logistic(0.0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_logistic_monotone_across_clamp() {
        let xs = [-1e9, -600.0, -500.0, -20.0, 0.0, 20.0, 500.0, 600.0, 1e9];
        for w in xs.windows(2) {
            assert!(logistic(w[0]) <= logistic(w[1]));
        }
    }

    #[test]
    fn test_memberships_partition_of_unity() {
        let t = [40u8, 100, 180];
        let mut mu = [0.0; 4];
        for b in 0..NUM_BINS {
            memberships_at(&t, b, 2.0, &mut mu);
            let s: f64 = mu.iter().sum();
            assert!((s - 1.0).abs() < 1e-9, "bin {b}: sum {s}");
        }
    }

    #[test]
    fn test_entropy_peaks_at_threshold() {
        let profile = entropy_profile(&[128], 2.0);
        let at = profile[128];
        assert!((at - std::f64::consts::LN_2).abs() < 1e-9);
        assert!(profile[10] < 1e-6);
        assert!(profile[250] < 1e-6);
    }

    #[test]
    fn test_tiny_steepness_stays_finite() {
        // s so small that unclamped arguments would reach ±1e14
        let profile = entropy_profile(&[3, 251], 1e-12);
        assert!(profile.iter().all(|e| e.is_finite()));
    }
}
