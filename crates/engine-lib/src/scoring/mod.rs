//! Scoring algorithms served by the engine
//!
//! Each algorithm is a pure function of its request. The [`ScoringModel`]
//! trait is the seam the registry and dispatcher work against.

mod anomaly;
mod threat;
mod trajectory;

pub use anomaly::{AnomalyDetector, DEFAULT_Z_THRESHOLD, HIGH_SEVERITY_Z};
pub use threat::{
    indicator_weight, recommendations_for, ThreatAssessor, DEFAULT_INDICATOR_WEIGHT,
    INDICATOR_WEIGHTS,
};
pub use trajectory::{
    TrajectoryPredictor, KM_PER_DEGREE, OVERALL_CONFIDENCE, PREDICTION_STEPS, STEP_SECS,
};

use crate::models::{ModelKind, PredictionOutput, PredictionRequest};
use thiserror::Error;

/// Failure raised while computing a prediction
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("{model} cannot score a {received} request")]
    KindMismatch {
        model: ModelKind,
        received: ModelKind,
    },

    #[error("non-finite {field} produced during computation")]
    NonFinite { field: &'static str },

    #[error("model panicked: {0}")]
    Panicked(String),
}

/// Trait for scoring model implementations
pub trait ScoringModel: Send + Sync {
    /// Kind of request this model serves
    fn kind(&self) -> ModelKind;

    /// Score a request, failing if it is not of this model's kind
    fn score(&self, request: &PredictionRequest) -> Result<PredictionOutput, ScoringError>;
}

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, ScoringError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ScoringError::NonFinite { field })
    }
}
