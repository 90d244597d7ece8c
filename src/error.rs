use thiserror::Error;

/// errors surfaced by the thresholding engine.
/// every failure is local to the call that produced it; no population or rng state leaks out.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThresholdError {
    /// algorithm name not recognised at the dispatch boundary
    #[error("unknown algorithm '{0}' (expected one of: ga, pso, woa, mfwoa, otsu)")]
    UnknownAlgorithm(String),

    /// hyperparameters or task shape that define no valid search space
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid histogram: {0}")]
    InvalidHistogram(String),

    #[error("dimension mismatch: expected at least {expected} components, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// settings file could not be parsed or written
    #[error("settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, ThresholdError>;

impl From<serde_json::Error> for ThresholdError {
    fn from(err: serde_json::Error) -> Self {
        ThresholdError::Settings(err.to_string())
    }
}

impl From<std::io::Error> for ThresholdError {
    fn from(err: std::io::Error) -> Self {
        ThresholdError::Settings(err.to_string())
    }
}
