use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ThresholdError};
use crate::fitness::Objective;

/// box constraint shared by every dimension of a search space
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lb: f64,
    pub ub: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self { lb: 1.0, ub: 254.0 }
    }
}

impl Bounds {
    pub fn new(lb: f64, ub: f64) -> Result<Self> {
        let b = Self { lb, ub };
        b.validate()?;
        Ok(b)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.lb.is_finite() || !self.ub.is_finite() || self.lb >= self.ub {
            return Err(ThresholdError::InvalidConfiguration(format!(
                "bounds must be finite with lb < ub, got [{}, {}]",
                self.lb, self.ub
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.ub - self.lb
    }

    #[inline]
    pub fn clip(&self, x: f64) -> f64 {
        x.clamp(self.lb, self.ub)
    }

    #[inline]
    pub fn clip_slice(&self, xs: &mut [f64]) {
        for x in xs.iter_mut() {
            *x = self.clip(*x);
        }
    }

    /// uniform sample in [lb, ub)
    #[inline]
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        self.lb + self.width() * rng.random::<f64>()
    }

    /// one uniformly random position of dimension `dim`
    pub fn sample_position<R: Rng>(&self, rng: &mut R, dim: usize) -> Vec<f64> {
        (0..dim).map(|_| self.sample(rng)).collect()
    }
}

/// one member of a population: an immutable (position, fitness) pair.
/// updates replace the whole value instead of mutating it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub position: Vec<f64>,
    pub fitness: f64,
}

impl Candidate {
    #[inline]
    pub fn new(position: Vec<f64>, fitness: f64) -> Self {
        Self { position, fitness }
    }
}

/// anything that exposes a position vector to the whale move kernel
pub trait Positioned {
    fn position(&self) -> &[f64];
}

impl Positioned for Candidate {
    #[inline]
    fn position(&self) -> &[f64] {
        &self.position
    }
}

/// how a proposed move is accepted against the individual's current fitness
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Acceptance {
    /// replace only when strictly better (whale default)
    StrictImprovement,
    /// replace unless strictly worse, ties accepted (multifactorial whale default)
    AllowTies,
}

impl Acceptance {
    #[inline]
    pub fn accepts(self, proposed: f64, current: f64) -> bool {
        match self {
            Acceptance::StrictImprovement => proposed > current,
            Acceptance::AllowTies => !(proposed < current),
        }
    }
}

/// index of the first maximum; None for an empty slice.
/// -inf never wins over a finite value, so unevaluated slots lose to any real score.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            None => best = Some(i),
            Some(b) if v > values[b] => best = Some(i),
            _ => {}
        }
    }
    best
}

/// Evaluate every position, in index order, on the rayon pool.
/// the objective is pure, so the result is identical to a sequential map.
pub fn evaluate_all<O: Objective + ?Sized>(objective: &O, positions: &[Vec<f64>]) -> Vec<f64> {
    profiling::scope!("evaluate_all");
    positions.par_iter().map(|x| objective.evaluate(x)).collect()
}

/// uniform random positions (row-major draw order: individual by individual)
pub fn init_positions<R: Rng>(rng: &mut R, bounds: &Bounds, pop: usize, dim: usize) -> Vec<Vec<f64>> {
    profiling::scope!("init_positions");
    (0..pop).map(|_| bounds.sample_position(rng, dim)).collect()
}

pub(crate) fn validate_population(pop: usize, what: &str) -> Result<()> {
    if pop == 0 {
        return Err(ThresholdError::InvalidConfiguration(format!(
            "{what} population size must be at least 1"
        )));
    }
    Ok(())
}

pub(crate) fn validate_probability(p: f64, name: &str) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ThresholdError::InvalidConfiguration(format!(
            "{name} must lie in [0, 1], got {p}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_finite(x: f64, name: &str) -> Result<()> {
    if !x.is_finite() {
        return Err(ThresholdError::InvalidConfiguration(format!("{name} must be finite, got {x}")));
    }
    Ok(())
}
