//─────────────────────────────────────────────────────────────────────────────
// bubble-net move shared by the single-task and multifactorial whale optimizers
//─────────────────────────────────────────────────────────────────────────────

use rand::Rng;
use std::f64::consts::PI;

use super::population::{Bounds, Positioned};

/// logarithmic spiral shape constant
pub const SPIRAL_B: f64 = 1.0;

/// `a` decays linearly from 2 at t = 0 to 0 at t = iters - 1
#[inline]
pub fn control_parameter(t: usize, iters: usize) -> f64 {
    let denom = iters.saturating_sub(1).max(1) as f64;
    2.0 - 2.0 * (t as f64 / denom)
}

/// per-individual coefficient vectors A = 2a·r1 − a and C = 2·r2.
/// drawn before any branch decision so every individual consumes r1 then r2.
#[derive(Clone, Debug)]
pub struct WhaleCoefficients {
    pub a: Vec<f64>,
    pub c: Vec<f64>,
}

impl WhaleCoefficients {
    pub fn draw<R: Rng>(rng: &mut R, a: f64, len: usize) -> Self {
        let r1: Vec<f64> = (0..len).map(|_| rng.random::<f64>()).collect();
        let r2: Vec<f64> = (0..len).map(|_| rng.random::<f64>()).collect();
        Self {
            a: r1.iter().map(|&r| 2.0 * a * r - a).collect(),
            c: r2.iter().map(|&r| 2.0 * r).collect(),
        }
    }

    /// ‖A‖₂ over the active leading slice
    #[inline]
    pub fn a_norm(&self, active: usize) -> f64 {
        self.a[..active].iter().map(|x| x * x).sum::<f64>().sqrt()
    }
}

/// propose a new active slice for `current` (clipped to bounds).
///
/// - p < 0.5 and ‖A‖ ≥ 1: explore toward a uniformly random member of `population`
/// - p < 0.5 and ‖A‖ < 1: shrink-encircle `guide`
/// - p ≥ 0.5: logarithmic spiral around `guide`
///
/// only the first `active` components of `current`, `guide` and the peer are read.
pub fn propose<R: Rng, P: Positioned>(
    rng: &mut R,
    coeffs: &WhaleCoefficients,
    current: &[f64],
    guide: &[f64],
    population: &[P],
    active: usize,
    bounds: &Bounds,
) -> Vec<f64> {
    profiling::scope!("whale_propose");

    let p = rng.random::<f64>();
    let mut next: Vec<f64> = if p < 0.5 {
        if coeffs.a_norm(active) >= 1.0 {
            let j = rng.random_range(0..population.len());
            let peer = population[j].position();
            (0..active)
                .map(|d| {
                    let dist = (coeffs.c[d] * peer[d] - current[d]).abs();
                    peer[d] - coeffs.a[d] * dist
                })
                .collect()
        } else {
            (0..active)
                .map(|d| {
                    let dist = (coeffs.c[d] * guide[d] - current[d]).abs();
                    guide[d] - coeffs.a[d] * dist
                })
                .collect()
        }
    } else {
        (0..active)
            .map(|d| {
                let l = rng.random::<f64>() * 2.0 - 1.0;
                let dist = (guide[d] - current[d]).abs();
                dist * (SPIRAL_B * l).exp() * (2.0 * PI * l).cos() + guide[d]
            })
            .collect()
    };

    bounds.clip_slice(&mut next);
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::population::Candidate;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_control_parameter_schedule() {
        assert_eq!(control_parameter(0, 10), 2.0);
        assert!((control_parameter(9, 10) - 0.0).abs() < 1e-12);
        // single-iteration runs stay at a = 2
        assert_eq!(control_parameter(0, 1), 2.0);
    }

    #[test]
    fn test_coefficients_ranges() {
        let mut rng = Pcg32::seed_from_u64(3);
        let c = WhaleCoefficients::draw(&mut rng, 1.5, 100);
        assert!(c.a.iter().all(|&x| (-1.5..=1.5).contains(&x)));
        assert!(c.c.iter().all(|&x| (0.0..=2.0).contains(&x)));
    }

    #[test]
    fn test_propose_respects_bounds_and_active_slice() {
        let bounds = Bounds::default();
        let pop = vec![
            Candidate::new(vec![10.0, 20.0, 30.0], 0.0),
            Candidate::new(vec![200.0, 210.0, 220.0], 0.0),
        ];
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..200 {
            let coeffs = WhaleCoefficients::draw(&mut rng, 2.0, 3);
            let next = propose(&mut rng, &coeffs, &pop[0].position, &pop[1].position, &pop, 2, &bounds);
            assert_eq!(next.len(), 2);
            assert!(next.iter().all(|&x| x >= bounds.lb && x <= bounds.ub));
        }
    }

    #[test]
    fn test_spiral_at_guide_is_fixed_point() {
        // when current == guide every branch except exploration returns the guide itself
        let bounds = Bounds::default();
        let pos = vec![100.0, 150.0];
        let pop = vec![Candidate::new(pos.clone(), 0.0)];
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..50 {
            // a = 0 makes A = 0, so the encircle branch is always taken over exploration
            let coeffs = WhaleCoefficients::draw(&mut rng, 0.0, 2);
            let next = propose(&mut rng, &coeffs, &pos, &pos, &pop, 2, &bounds);
            assert_eq!(next, pos);
        }
    }
}
