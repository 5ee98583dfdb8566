//! Z-score anomaly detection
//!
//! Flags values lying more than a threshold number of standard deviations
//! from the mean of the whole series.

use super::{ensure_finite, ScoringError, ScoringModel};
use crate::models::{
    AnomalyObservation, AnomalyReport, AnomalySeverity, ModelKind, PredictionOutput,
    PredictionRequest,
};

/// Default number of standard deviations for a value to be anomalous
pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;

/// Z-score above which an anomaly is reported as high severity
pub const HIGH_SEVERITY_Z: f64 = 3.0;

/// Minimum number of values for statistics to be meaningful
const MIN_VALUES: usize = 2;

/// Detects outliers in a series of values
#[derive(Debug, Default, Clone)]
pub struct AnomalyDetector;

impl AnomalyDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect anomalous values
    ///
    /// Series shorter than two values produce an empty report with zero
    /// mean and standard deviation.
    pub fn detect(&self, values: &[f64], threshold: f64) -> Result<AnomalyReport, ScoringError> {
        if values.len() < MIN_VALUES {
            return Ok(AnomalyReport {
                anomalies: Vec::new(),
                mean: 0.0,
                std: 0.0,
                threshold,
                anomaly_count: 0,
            });
        }

        let (mean, std) = population_stats(values);
        let mean = ensure_finite("mean", mean)?;
        let std = ensure_finite("std", std)?;

        let anomalies: Vec<AnomalyObservation> = values
            .iter()
            .enumerate()
            .filter_map(|(index, &value)| {
                let z_score = if std > 0.0 {
                    ((value - mean) / std).abs()
                } else {
                    0.0
                };

                (z_score > threshold).then(|| AnomalyObservation {
                    index,
                    value,
                    z_score,
                    severity: if z_score > HIGH_SEVERITY_Z {
                        AnomalySeverity::High
                    } else {
                        AnomalySeverity::Medium
                    },
                })
            })
            .collect();

        Ok(AnomalyReport {
            anomaly_count: anomalies.len(),
            anomalies,
            mean,
            std,
            threshold,
        })
    }
}

/// Mean and population standard deviation (two-pass)
fn population_stats(values: &[f64]) -> (f64, f64) {
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    (mean, variance.sqrt())
}

impl ScoringModel for AnomalyDetector {
    fn kind(&self) -> ModelKind {
        ModelKind::AnomalyDetector
    }

    fn score(&self, request: &PredictionRequest) -> Result<PredictionOutput, ScoringError> {
        match request {
            PredictionRequest::Anomaly(req) => self
                .detect(&req.values, req.threshold)
                .map(PredictionOutput::Anomaly),
            other => Err(ScoringError::KindMismatch {
                model: self.kind(),
                received: other.kind(),
            }),
        }
    }
}
