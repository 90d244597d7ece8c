use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::population::{argmax, evaluate_all, init_positions, validate_finite, validate_population};
use super::{finish, OptimizationResult, Task};
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsoParams {
    pub pop: usize,
    pub iters: usize,
    /// inertia weight
    pub w: f64,
    /// cognitive coefficient (pull toward personal best)
    pub c1: f64,
    /// social coefficient (pull toward global best)
    pub c2: f64,
    /// initial velocity σ as a fraction of (ub - lb)
    pub initial_velocity_scale: f64,
    pub seed: u64,
}

impl Default for PsoParams {
    fn default() -> Self {
        Self {
            pop: 20,
            iters: 100,
            w: 0.72,
            c1: 1.49,
            c2: 1.49,
            initial_velocity_scale: 0.1,
            seed: 42,
        }
    }
}

impl PsoParams {
    pub fn validate(&self) -> Result<()> {
        validate_population(self.pop, "pso")?;
        validate_finite(self.w, "pso w")?;
        validate_finite(self.c1, "pso c1")?;
        validate_finite(self.c2, "pso c2")?;
        validate_finite(self.initial_velocity_scale, "pso initial_velocity_scale")?;
        Ok(())
    }
}

/// one swarm member with its personal best
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec<f64>,
    pub velocity: Vec<f64>,
    pub fitness: f64,
    pub best_position: Vec<f64>,
    pub best_fitness: f64,
}

/// standard inertia-weight particle swarm with synchronous (generational) updates.
#[derive(Clone, Debug)]
pub struct ParticleSwarmOptimizer {
    params: PsoParams,
}

impl ParticleSwarmOptimizer {
    pub fn new(params: PsoParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &PsoParams {
        &self.params
    }

    pub fn run(&self, task: &Task<'_>) -> Result<OptimizationResult> {
        let mut rng = Pcg32::seed_from_u64(self.params.seed);
        self.run_with_rng(task, &mut rng)
    }

    pub fn run_with_rng<R: Rng>(&self, task: &Task<'_>, rng: &mut R) -> Result<OptimizationResult> {
        profiling::scope!("ParticleSwarmOptimizer::run");
        task.validate()?;

        let p = &self.params;
        let dim = task.k;
        let bounds = task.bounds;
        let v_sigma = p.initial_velocity_scale * bounds.width();

        tracing::debug!(algorithm = "pso", k = dim, pop = p.pop, iters = p.iters, "starting run");

        let positions = init_positions(rng, &bounds, p.pop, dim);
        let velocities: Vec<Vec<f64>> = (0..p.pop)
            .map(|_| {
                (0..dim)
                    .map(|_| v_sigma * rng.sample::<f64, _>(StandardNormal))
                    .collect()
            })
            .collect();
        let fitness = evaluate_all(task.objective, &positions);
        let mut evaluations = p.pop;

        let mut swarm: Vec<Particle> = positions
            .into_iter()
            .zip(velocities)
            .zip(&fitness)
            .map(|((position, velocity), &f)| Particle {
                best_position: position.clone(),
                best_fitness: f,
                position,
                velocity,
                fitness: f,
            })
            .collect();

        let g_idx = argmax(&fitness).unwrap_or(0);
        let mut gbest = swarm[g_idx].position.clone();
        let mut gbest_fit = swarm[g_idx].fitness;

        let mut history = Vec::with_capacity(p.iters + 1);
        history.push(gbest_fit);

        for iteration in 0..p.iters {
            profiling::scope!("pso_iteration");

            // r1, r2 for the whole swarm are drawn before any particle moves
            let r1: Vec<Vec<f64>> = (0..p.pop).map(|_| (0..dim).map(|_| rng.random::<f64>()).collect()).collect();
            let r2: Vec<Vec<f64>> = (0..p.pop).map(|_| (0..dim).map(|_| rng.random::<f64>()).collect()).collect();

            // every particle reads the same gbest snapshot; nothing here depends on earlier particles
            for (i, particle) in swarm.iter_mut().enumerate() {
                for d in 0..dim {
                    let x = particle.position[d];
                    let v = p.w * particle.velocity[d]
                        + p.c1 * r1[i][d] * (particle.best_position[d] - x)
                        + p.c2 * r2[i][d] * (gbest[d] - x);
                    particle.velocity[d] = v;
                    particle.position[d] = bounds.clip(x + v);
                }
            }

            let moved: Vec<Vec<f64>> = swarm.iter().map(|pt| pt.position.clone()).collect();
            let fit = evaluate_all(task.objective, &moved);
            evaluations += p.pop;

            for (particle, &f) in swarm.iter_mut().zip(&fit) {
                particle.fitness = f;
                if f > particle.best_fitness {
                    particle.best_fitness = f;
                    particle.best_position = particle.position.clone();
                }
            }

            if let Some(it_best) = argmax(&fit) {
                if fit[it_best] > gbest_fit {
                    gbest = swarm[it_best].position.clone();
                    gbest_fit = fit[it_best];
                }
            }

            tracing::trace!(algorithm = "pso", iteration, best = gbest_fit, "iteration done");
            history.push(gbest_fit);
        }

        Ok(finish("pso", dim, &gbest, gbest_fit, history, evaluations))
    }
}
