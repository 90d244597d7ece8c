//─────────────────────────────────────────────────────────────────────────────
// multifactorial whale optimization: one population solving several K at once
//─────────────────────────────────────────────────────────────────────────────

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::population::{init_positions, validate_population, validate_probability, Acceptance, Positioned};
use super::whale::{control_parameter, propose, WhaleCoefficients};
use super::{finish, Task};
use crate::error::{Result, ThresholdError};
use crate::thresholds::ThresholdVector;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfwoaParams {
    pub pop: usize,
    pub iters: usize,
    /// random mating probability: chance of steering by another task's best
    pub rmp: f64,
    pub seed: u64,
    pub acceptance: Acceptance,
}

impl Default for MfwoaParams {
    fn default() -> Self {
        Self {
            pop: 40,
            iters: 100,
            rmp: 0.3,
            seed: 42,
            acceptance: Acceptance::AllowTies,
        }
    }
}

impl MfwoaParams {
    pub fn validate(&self) -> Result<()> {
        validate_population(self.pop, "mfwoa")?;
        validate_probability(self.rmp, "mfwoa rmp")
    }
}

/// individual in the unified space of dimension max K.
/// only the first K of its skill task are ever scored.
#[derive(Clone, Debug, PartialEq)]
struct SkilledWhale {
    position: Vec<f64>,
    fitness: f64,
    skill: usize,
}

impl Positioned for SkilledWhale {
    #[inline]
    fn position(&self) -> &[f64] {
        &self.position
    }
}

#[derive(Clone, Debug)]
struct TaskBest {
    position: Vec<f64>,
    fitness: f64,
}

/// per-task slot of a multifactorial run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskResult {
    pub k: usize,
    /// None when no individual ever carried this task's skill factor
    pub thresholds: Option<ThresholdVector>,
    /// -inf together with `thresholds: None`
    pub fitness: f64,
    pub history: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MultiTaskResult {
    /// same order as the input tasks
    pub tasks: Vec<TaskResult>,
    pub evaluations: usize,
}

#[derive(Clone, Debug)]
pub struct MultifactorialWhaleOptimizer {
    params: MfwoaParams,
}

impl MultifactorialWhaleOptimizer {
    pub fn new(params: MfwoaParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &MfwoaParams {
        &self.params
    }

    pub fn run(&self, tasks: &[Task<'_>]) -> Result<MultiTaskResult> {
        let mut rng = Pcg32::seed_from_u64(self.params.seed);
        self.run_with_rng(tasks, &mut rng)
    }

    pub fn run_with_rng<R: Rng>(&self, tasks: &[Task<'_>], rng: &mut R) -> Result<MultiTaskResult> {
        profiling::scope!("MultifactorialWhaleOptimizer::run");

        let first = tasks.first().ok_or_else(|| {
            ThresholdError::InvalidConfiguration("mfwoa needs at least one task".to_string())
        })?;
        for t in tasks {
            t.validate()?;
            if t.bounds != first.bounds {
                return Err(ThresholdError::InvalidConfiguration(
                    "all mfwoa tasks must share the same bounds".to_string(),
                ));
            }
        }

        let p = &self.params;
        let bounds = first.bounds;
        let n_tasks = tasks.len();
        let max_k = tasks.iter().map(|t| t.k).max().unwrap_or(first.k);

        tracing::debug!(algorithm = "mfwoa", n_tasks, max_k, pop = p.pop, iters = p.iters, rmp = p.rmp, "starting run");

        // positions for the whole population first, then skill factors
        let positions = init_positions(rng, &bounds, p.pop, max_k);
        let skills: Vec<usize> = if n_tasks > 1 {
            (0..p.pop).map(|_| rng.random_range(0..n_tasks)).collect()
        } else {
            vec![0; p.pop]
        };

        let mut population: Vec<SkilledWhale> = positions
            .into_iter()
            .zip(skills)
            .map(|(position, skill)| {
                let fitness = tasks[skill].objective.evaluate(&position[..tasks[skill].k]);
                SkilledWhale { position, fitness, skill }
            })
            .collect();
        let mut evaluations = p.pop;

        let mut best: Vec<Option<TaskBest>> = vec![None; n_tasks];
        for w in &population {
            let slot = &mut best[w.skill];
            if slot.as_ref().is_none_or(|b| w.fitness > b.fitness) {
                *slot = Some(TaskBest { position: w.position.clone(), fitness: w.fitness });
            }
        }

        let mut history: Vec<Vec<f64>> = vec![Vec::with_capacity(p.iters + 1); n_tasks];
        record(&mut history, &best);

        for iteration in 0..p.iters {
            profiling::scope!("mfwoa_iteration");
            let a = control_parameter(iteration, p.iters);

            for i in 0..population.len() {
                let skill = population[i].skill;
                let active = tasks[skill].k;
                let coeffs = WhaleCoefficients::draw(rng, a, max_k);

                let mut guide_task = skill;
                if n_tasks > 1 && rng.random::<f64>() < p.rmp {
                    let others: Vec<usize> = (0..n_tasks).filter(|&t| t != skill && best[t].is_some()).collect();
                    if !others.is_empty() {
                        guide_task = others[rng.random_range(0..others.len())];
                    }
                }
                let guide: &[f64] = match &best[guide_task] {
                    Some(b) => &b.position,
                    None => &population[i].position,
                };

                let moved = propose(rng, &coeffs, &population[i].position, guide, &population, active, &bounds);
                let mut position = population[i].position.clone();
                position[..active].copy_from_slice(&moved);

                let fitness = tasks[skill].objective.evaluate(&position[..active]);
                evaluations += 1;

                if p.acceptance.accepts(fitness, population[i].fitness) {
                    if best[skill].as_ref().is_none_or(|b| fitness > b.fitness) {
                        best[skill] = Some(TaskBest { position: position.clone(), fitness });
                    }
                    population[i] = SkilledWhale { position, fitness, skill };
                }
            }

            tracing::trace!(algorithm = "mfwoa", iteration, a, "iteration done");
            record(&mut history, &best);
        }

        let results = tasks
            .iter()
            .zip(best)
            .zip(history)
            .map(|((task, slot), history)| match slot {
                Some(b) => {
                    let r = finish("mfwoa", task.k, &b.position, b.fitness, history, evaluations);
                    TaskResult { k: task.k, thresholds: Some(r.thresholds), fitness: r.fitness, history: r.history }
                }
                None => {
                    tracing::warn!(algorithm = "mfwoa", k = task.k, "no individual was assigned to this task");
                    TaskResult { k: task.k, thresholds: None, fitness: f64::NEG_INFINITY, history }
                }
            })
            .collect();

        Ok(MultiTaskResult { tasks: results, evaluations })
    }
}

fn record(history: &mut [Vec<f64>], best: &[Option<TaskBest>]) {
    for (h, b) in history.iter_mut().zip(best) {
        h.push(b.as_ref().map_or(f64::NEG_INFINITY, |b| b.fitness));
    }
}
