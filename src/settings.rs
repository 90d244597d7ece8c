use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engine::{Bounds, GaParams, MfwoaParams, PsoParams, WoaParams};
use crate::error::{Result, ThresholdError};
use crate::fitness::DEFAULT_STEEPNESS;

/// persisted run configuration; every field falls back to its default when absent
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub ga: GaParams,
    pub pso: PsoParams,
    pub woa: WoaParams,
    pub mfwoa: MfwoaParams,

    // shared search space and objective
    pub bounds: Bounds,
    pub steepness: f64,

    /// when set, overrides every optimizer's own seed
    pub seed: Option<u64>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            ga: GaParams::default(),
            pso: PsoParams::default(),
            woa: WoaParams::default(),
            mfwoa: MfwoaParams::default(),
            bounds: Bounds::default(),
            steepness: DEFAULT_STEEPNESS,
            seed: None,
        }
    }
}

impl RunSettings {
    /// parse settings JSON, failing on malformed input
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.apply_seed())
    }

    /// save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// load settings from a JSON file; a missing file yields defaults, a malformed one an error
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json_str(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ThresholdError::Settings(format!("{}: {e}", path.display()))),
        }
    }

    /// load settings from a JSON file, or return defaults if it is missing or unreadable
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load settings, using defaults");
                Self::default()
            }
        }
    }

    /// copy of these settings with `seed` pushed into every optimizer
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.apply_seed()
    }

    fn apply_seed(mut self) -> Self {
        if let Some(seed) = self.seed {
            self.ga.seed = seed;
            self.pso.seed = seed;
            self.woa.seed = seed;
            self.mfwoa.seed = seed;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.ga.validate()?;
        self.pso.validate()?;
        self.woa.validate()?;
        self.mfwoa.validate()?;
        self.bounds.validate()?;
        if !self.steepness.is_finite() || self.steepness <= 0.0 {
            return Err(ThresholdError::InvalidConfiguration(format!(
                "steepness must be finite and positive, got {}",
                self.steepness
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Acceptance, GaResultPolicy};

    #[test]
    fn test_defaults_match_optimizer_defaults() {
        let s = RunSettings::default();
        assert_eq!(s.ga.pop, 30);
        assert_eq!(s.pso.w, 0.72);
        assert_eq!(s.woa.acceptance, Acceptance::StrictImprovement);
        assert_eq!(s.mfwoa.acceptance, Acceptance::AllowTies);
        assert_eq!(s.mfwoa.rmp, 0.3);
        assert_eq!(s.ga.result_policy, GaResultPolicy::FinalGenerationOnly);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = RunSettings::from_json_str(r#"{ "woa": { "pop": 7 }, "steepness": 3.5 }"#).unwrap();
        assert_eq!(s.woa.pop, 7);
        assert_eq!(s.woa.iters, 100);
        assert_eq!(s.steepness, 3.5);
        assert_eq!(s.pso, PsoParams::default());
    }

    #[test]
    fn test_global_seed_overrides_each_optimizer() {
        let s = RunSettings::from_json_str(r#"{ "seed": 7, "ga": { "seed": 1 } }"#).unwrap();
        assert_eq!(s.ga.seed, 7);
        assert_eq!(s.mfwoa.seed, 7);
        let s = RunSettings::default().with_seed(99);
        assert_eq!(s.pso.seed, 99);
        assert_eq!(s.woa.seed, 99);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(RunSettings::from_json_str("{ not json"), Err(ThresholdError::Settings(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut s = RunSettings::default();
        s.mfwoa.rmp = 0.5;
        s.bounds = Bounds::new(5.0, 250.0).unwrap();
        s.save(&path).unwrap();
        assert_eq!(RunSettings::load(&path).unwrap(), s);
    }

    #[test]
    fn test_missing_and_broken_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert_eq!(RunSettings::load(&missing).unwrap(), RunSettings::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "[1, 2").unwrap();
        assert!(RunSettings::load(&broken).is_err());
        assert_eq!(RunSettings::load_or_default(&broken), RunSettings::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut s = RunSettings::default();
        s.steepness = 0.0;
        assert!(s.validate().is_err());
        let mut s = RunSettings::default();
        s.pso.pop = 0;
        assert!(s.validate().is_err());
        let mut s = RunSettings::default();
        s.bounds = Bounds { lb: 200.0, ub: 100.0 };
        assert!(s.validate().is_err());
    }
}
