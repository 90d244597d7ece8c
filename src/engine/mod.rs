// Engine module organization
// Each submodule implements one optimizer over threshold positions; the shared
// population plumbing and the whale move live in their own files

pub mod ga;
pub mod mfwoa;
pub mod population;
pub mod pso;
pub mod whale;
pub mod woa;

#[cfg(test)]
pub(crate) mod test_support;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ThresholdError};
use crate::fitness::{FuzzyEntropyObjective, Histogram, Objective};
use crate::otsu::multi_otsu;
use crate::settings::RunSettings;
use crate::thresholds::{canonicalize, validate_threshold_count, ThresholdVector};

pub use ga::{GaParams, GaResultPolicy, GeneticOptimizer};
pub use mfwoa::{MfwoaParams, MultiTaskResult, MultifactorialWhaleOptimizer, TaskResult};
pub use population::{Acceptance, Bounds, Candidate};
pub use pso::{ParticleSwarmOptimizer, PsoParams};
pub use woa::{WhaleOptimizer, WoaParams};

/// one optimization problem: K thresholds scored by `objective` inside `bounds`
#[derive(Clone, Copy)]
pub struct Task<'a> {
    pub k: usize,
    pub objective: &'a dyn Objective,
    pub bounds: Bounds,
}

impl<'a> Task<'a> {
    pub fn new(k: usize, objective: &'a dyn Objective, bounds: Bounds) -> Result<Self> {
        let task = Self { k, objective, bounds };
        task.validate()?;
        Ok(task)
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold_count(self.k)?;
        self.bounds.validate()
    }
}

impl fmt::Debug for Task<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("k", &self.k)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

/// result of a single-task run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub thresholds: ThresholdVector,
    pub fitness: f64,
    /// initial best followed by one entry per iteration
    pub history: Vec<f64>,
    pub evaluations: usize,
}

/// canonicalize the reported position and close out the run log
pub(crate) fn finish(
    algorithm: &'static str,
    k: usize,
    position: &[f64],
    fitness: f64,
    history: Vec<f64>,
    evaluations: usize,
) -> OptimizationResult {
    let thresholds = canonicalize(position, k);
    if !thresholds.is_strictly_increasing() {
        tracing::warn!(algorithm, k, thresholds = ?thresholds.as_slice(), "threshold vector saturated at the top of the range");
    }
    tracing::debug!(algorithm, k, fitness, evaluations, thresholds = ?thresholds.as_slice(), "run finished");
    OptimizationResult { thresholds, fitness, history, evaluations }
}

/// the closed set of thresholding methods
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Ga,
    Pso,
    Woa,
    Mfwoa,
    Otsu,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [Algorithm::Ga, Algorithm::Pso, Algorithm::Woa, Algorithm::Mfwoa, Algorithm::Otsu];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Ga => "ga",
            Algorithm::Pso => "pso",
            Algorithm::Woa => "woa",
            Algorithm::Mfwoa => "mfwoa",
            Algorithm::Otsu => "otsu",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == lower)
            .ok_or_else(|| ThresholdError::UnknownAlgorithm(s.to_string()))
    }
}

/// per-K outcome of `solve`. `thresholds` is None (and fitness -inf) only when the
/// method produced nothing for that K.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskOutcome {
    pub algorithm: Algorithm,
    pub k: usize,
    pub thresholds: Option<ThresholdVector>,
    pub fitness: f64,
    pub history: Vec<f64>,
}

impl TaskOutcome {
    fn from_result(algorithm: Algorithm, k: usize, r: OptimizationResult) -> Self {
        Self {
            algorithm,
            k,
            thresholds: Some(r.thresholds),
            fitness: r.fitness,
            history: r.history,
        }
    }
}

/// threshold `histogram` for every K in `ks` with one algorithm.
///
/// single-task optimizers run once per K, MFWOA runs once over all K, and Otsu uses
/// K+1 classes; its fitness is the fuzzy score of its thresholds.
pub fn solve(algorithm: Algorithm, histogram: &Histogram, ks: &[usize], settings: &RunSettings) -> Result<Vec<TaskOutcome>> {
    profiling::scope!("solve");
    if ks.is_empty() {
        return Err(ThresholdError::InvalidConfiguration("at least one threshold count is required".to_string()));
    }
    settings.validate()?;

    let objectives = ks
        .iter()
        .map(|&k| FuzzyEntropyObjective::new(histogram, k, settings.steepness))
        .collect::<Result<Vec<_>>>()?;
    let tasks = objectives
        .iter()
        .map(|obj| Task::new(obj.k(), obj, settings.bounds))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(%algorithm, ?ks, "solving");

    match algorithm {
        Algorithm::Ga => {
            let opt = GeneticOptimizer::new(settings.ga.clone())?;
            tasks
                .iter()
                .map(|t| -> Result<TaskOutcome> { Ok(TaskOutcome::from_result(algorithm, t.k, opt.run(t)?)) })
                .collect()
        }
        Algorithm::Pso => {
            let opt = ParticleSwarmOptimizer::new(settings.pso.clone())?;
            tasks
                .iter()
                .map(|t| -> Result<TaskOutcome> { Ok(TaskOutcome::from_result(algorithm, t.k, opt.run(t)?)) })
                .collect()
        }
        Algorithm::Woa => {
            let opt = WhaleOptimizer::new(settings.woa.clone())?;
            tasks
                .iter()
                .map(|t| -> Result<TaskOutcome> { Ok(TaskOutcome::from_result(algorithm, t.k, opt.run(t)?)) })
                .collect()
        }
        Algorithm::Mfwoa => {
            let opt = MultifactorialWhaleOptimizer::new(settings.mfwoa.clone())?;
            let r = opt.run(&tasks)?;
            Ok(r.tasks
                .into_iter()
                .map(|t| TaskOutcome {
                    algorithm,
                    k: t.k,
                    thresholds: t.thresholds,
                    fitness: t.fitness,
                    history: t.history,
                })
                .collect())
        }
        Algorithm::Otsu => objectives
            .iter()
            .map(|obj| -> Result<TaskOutcome> {
                let levels = multi_otsu(histogram, obj.k() + 1)?;
                if levels.len() != obj.k() {
                    // empty histogram: nothing to separate
                    return Ok(TaskOutcome {
                        algorithm,
                        k: obj.k(),
                        thresholds: None,
                        fitness: f64::NEG_INFINITY,
                        history: Vec::new(),
                    });
                }
                let raw: Vec<f64> = levels.iter().map(|&t| t as f64).collect();
                let thresholds = canonicalize(&raw, obj.k());
                let fitness = obj.score_thresholds(&thresholds);
                Ok(TaskOutcome {
                    algorithm,
                    k: obj.k(),
                    thresholds: Some(thresholds),
                    fitness,
                    history: vec![fitness],
                })
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::three_modes;

    fn quick_settings() -> RunSettings {
        let mut s = RunSettings::default();
        s.ga.pop = 12;
        s.ga.iters = 10;
        s.pso.pop = 12;
        s.pso.iters = 10;
        s.woa.pop = 12;
        s.woa.iters = 10;
        s.mfwoa.pop = 16;
        s.mfwoa.iters = 10;
        s
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("MFWOA".parse::<Algorithm>().unwrap(), Algorithm::Mfwoa);
        assert_eq!(" otsu ".parse::<Algorithm>().unwrap(), Algorithm::Otsu);
        assert!(matches!("sa".parse::<Algorithm>(), Err(ThresholdError::UnknownAlgorithm(_))));
        for a in Algorithm::ALL {
            assert_eq!(a.to_string().parse::<Algorithm>().unwrap(), a);
        }
    }

    #[test]
    fn test_task_rejects_empty_search_space() {
        let f = |_: &[f64]| 0.0;
        assert!(Task::new(0, &f, Bounds::default()).is_err());
        assert!(Task::new(255, &f, Bounds::default()).is_err());
        assert!(Task::new(2, &f, Bounds { lb: 10.0, ub: 10.0 }).is_err());
    }

    #[test]
    fn test_solve_every_algorithm_returns_one_outcome_per_k() {
        let hist = three_modes();
        let settings = quick_settings();
        for a in Algorithm::ALL {
            let out = solve(a, &hist, &[1, 2], &settings).unwrap();
            assert_eq!(out.len(), 2, "{a}");
            for (o, k) in out.iter().zip([1, 2]) {
                assert_eq!(o.algorithm, a);
                assert_eq!(o.k, k);
                let t = o.thresholds.as_ref().unwrap();
                assert_eq!(t.len(), k);
                assert!(t.is_strictly_increasing());
                assert!(o.fitness.is_finite());
            }
        }
    }

    #[test]
    fn test_solve_rejects_empty_ks() {
        let hist = three_modes();
        assert!(solve(Algorithm::Ga, &hist, &[], &RunSettings::default()).is_err());
        assert!(solve(Algorithm::Woa, &hist, &[0], &RunSettings::default()).is_err());
    }

    #[test]
    fn test_solve_otsu_on_empty_histogram_reports_sentinel() {
        let hist = Histogram::new(&[0.0; 256]).unwrap();
        let out = solve(Algorithm::Otsu, &hist, &[2], &RunSettings::default()).unwrap();
        assert_eq!(out[0].thresholds, None);
        assert_eq!(out[0].fitness, f64::NEG_INFINITY);
    }
}
