use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::population::{
    argmax, evaluate_all, init_positions, validate_finite, validate_population, validate_probability,
    Candidate,
};
use super::{finish, OptimizationResult, Task};
use crate::error::{Result, ThresholdError};

/// which individual the genetic algorithm reports at the end of a run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GaResultPolicy {
    /// best member of the last generation only; earlier, better individuals can be lost
    FinalGenerationOnly,
    /// best individual seen in any generation
    BestEver,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaParams {
    pub pop: usize,
    pub iters: usize,
    /// crossover probability per reproduction event
    pub pc: f64,
    /// per-gene mutation probability
    pub pm: f64,
    /// BLX-α interval expansion
    pub blend_alpha: f64,
    /// mutation σ as a fraction of (ub - lb)
    pub mutation_scale: f64,
    pub seed: u64,
    pub result_policy: GaResultPolicy,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            pop: 30,
            iters: 100,
            pc: 0.9,
            pm: 0.1,
            blend_alpha: 0.3,
            mutation_scale: 0.05,
            seed: 42,
            result_policy: GaResultPolicy::FinalGenerationOnly,
        }
    }
}

impl GaParams {
    pub fn validate(&self) -> Result<()> {
        validate_population(self.pop, "ga")?;
        validate_probability(self.pc, "ga pc")?;
        validate_probability(self.pm, "ga pm")?;
        validate_finite(self.blend_alpha, "ga blend_alpha")?;
        validate_finite(self.mutation_scale, "ga mutation_scale")?;
        if self.blend_alpha < 0.0 || self.mutation_scale < 0.0 {
            return Err(ThresholdError::InvalidConfiguration(
                "ga blend_alpha and mutation_scale must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// real-coded generational GA: binary tournament, BLX-α crossover, gaussian mutation,
/// full replacement without elitism.
#[derive(Clone, Debug)]
pub struct GeneticOptimizer {
    params: GaParams,
}

impl GeneticOptimizer {
    pub fn new(params: GaParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &GaParams {
        &self.params
    }

    /// run with a fresh Pcg32 seeded from `params.seed`
    pub fn run(&self, task: &Task<'_>) -> Result<OptimizationResult> {
        let mut rng = Pcg32::seed_from_u64(self.params.seed);
        self.run_with_rng(task, &mut rng)
    }

    pub fn run_with_rng<R: Rng>(&self, task: &Task<'_>, rng: &mut R) -> Result<OptimizationResult> {
        profiling::scope!("GeneticOptimizer::run");
        task.validate()?;

        let p = &self.params;
        let dim = task.k;
        let bounds = task.bounds;
        let sigma = p.mutation_scale * bounds.width();

        tracing::debug!(algorithm = "ga", k = dim, pop = p.pop, iters = p.iters, "starting run");

        let mut positions = init_positions(rng, &bounds, p.pop, dim);
        let mut fitness = evaluate_all(task.objective, &positions);
        let mut evaluations = p.pop;

        let mut history = Vec::with_capacity(p.iters + 1);
        let mut best_ever = generation_best(&positions, &fitness);
        history.push(best_ever.fitness);

        for generation in 0..p.iters {
            profiling::scope!("ga_generation");

            let mut next: Vec<Vec<f64>> = Vec::with_capacity(p.pop + 1);
            while next.len() < p.pop {
                if rng.random::<f64>() < p.pc {
                    let p1 = tournament(rng, &fitness);
                    let p2 = tournament(rng, &fitness);
                    let (c1, c2) = blend_crossover(rng, &positions[p1], &positions[p2], p.blend_alpha);
                    next.push(c1);
                    next.push(c2);
                } else {
                    let winner = tournament(rng, &fitness);
                    next.push(positions[winner].clone());
                }
            }
            next.truncate(p.pop);

            for genes in next.iter_mut() {
                for g in genes.iter_mut() {
                    if rng.random::<f64>() < p.pm {
                        let z: f64 = rng.sample(StandardNormal);
                        *g += sigma * z;
                    }
                }
                bounds.clip_slice(genes);
            }

            positions = next;
            fitness = evaluate_all(task.objective, &positions);
            evaluations += p.pop;

            let current = generation_best(&positions, &fitness);
            if current.fitness > best_ever.fitness {
                best_ever = current.clone();
            }
            tracing::trace!(algorithm = "ga", generation, best = current.fitness, "generation done");
            history.push(current.fitness);
        }

        let reported = match p.result_policy {
            GaResultPolicy::FinalGenerationOnly => generation_best(&positions, &fitness),
            GaResultPolicy::BestEver => best_ever,
        };

        Ok(finish("ga", dim, &reported.position, reported.fitness, history, evaluations))
    }
}

/// binary tournament: two uniform draws, the strictly fitter one wins, otherwise the second
#[inline]
fn tournament<R: Rng>(rng: &mut R, fitness: &[f64]) -> usize {
    let i = rng.random_range(0..fitness.len());
    let j = rng.random_range(0..fitness.len());
    if fitness[i] > fitness[j] { i } else { j }
}

/// BLX-α: both children sampled uniformly from the parents' per-gene range widened by α·|d|.
/// child one is drawn over all genes before child two.
fn blend_crossover<R: Rng>(rng: &mut R, p1: &[f64], p2: &[f64], alpha: f64) -> (Vec<f64>, Vec<f64>) {
    let (low, high): (Vec<f64>, Vec<f64>) = p1
        .iter()
        .zip(p2)
        .map(|(&a, &b)| {
            let d = (a - b).abs();
            (a.min(b) - alpha * d, a.max(b) + alpha * d)
        })
        .unzip();

    let child = |rng: &mut R| -> Vec<f64> {
        low.iter()
            .zip(&high)
            .map(|(&lo, &hi)| lo + (hi - lo) * rng.random::<f64>())
            .collect()
    };
    let c1 = child(rng);
    let c2 = child(rng);
    (c1, c2)
}

fn generation_best(positions: &[Vec<f64>], fitness: &[f64]) -> Candidate {
    // populations are never empty (validated), so argmax always finds an index
    let idx = argmax(fitness).unwrap_or(0);
    Candidate::new(positions[idx].clone(), fitness[idx])
}
