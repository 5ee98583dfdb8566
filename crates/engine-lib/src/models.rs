//! Core data models for the prediction engine

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Models served by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    AircraftTrajectory,
    AnomalyDetector,
    ThreatAssessor,
}

impl ModelKind {
    /// Name the model is registered under
    pub fn model_name(&self) -> &'static str {
        match self {
            ModelKind::AircraftTrajectory => "aircraft_trajectory",
            ModelKind::AnomalyDetector => "anomaly_detector",
            ModelKind::ThreatAssessor => "threat_assessor",
        }
    }

    /// Value of the `model_type` metrics label
    pub fn metric_label(&self) -> &'static str {
        match self {
            ModelKind::AircraftTrajectory => "trajectory",
            ModelKind::AnomalyDetector => "anomaly",
            ModelKind::ThreatAssessor => "threat",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_name())
    }
}

/// Current state of an aircraft, input to trajectory prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryRequest {
    pub icao24: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters; negative values are allowed for below-sea-level datums
    pub altitude: f64,
    /// Meters per second
    pub velocity: f64,
    /// Degrees, [0, 360)
    pub heading: f64,
    /// Accepted for forward compatibility, not used by the extrapolator
    #[serde(default)]
    pub historical_positions: Vec<HashMap<String, f64>>,
}

/// Extrapolated position at a fixed offset from now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedPosition {
    /// Offset from the request time in seconds
    pub timestamp: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryPrediction {
    pub predicted_positions: Vec<PredictedPosition>,
    pub estimated_arrival: PredictedPosition,
    pub confidence_score: f64,
}

fn default_threshold() -> f64 {
    crate::scoring::DEFAULT_Z_THRESHOLD
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyDetectionRequest {
    /// Free-form label for the series, carried as metadata
    pub data_type: String,
    pub values: Vec<f64>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Medium,
    High,
}

impl AnomalySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalySeverity::Medium => "medium",
            AnomalySeverity::High => "high",
        }
    }
}

/// A single value flagged as anomalous
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyObservation {
    /// Position of the value in the request's `values`
    pub index: usize,
    pub value: f64,
    pub z_score: f64,
    pub severity: AnomalySeverity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub anomalies: Vec<AnomalyObservation>,
    pub mean: f64,
    pub std: f64,
    pub threshold: f64,
    pub anomaly_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatAssessmentRequest {
    pub source_type: String,
    #[serde(default)]
    pub location: HashMap<String, f64>,
    pub indicators: Vec<String>,
    /// Must lie in [0, 1]
    pub confidence_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "low",
            ThreatLevel::Medium => "medium",
            ThreatLevel::High => "high",
            ThreatLevel::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredIndicator {
    pub indicator: String,
    pub weight: f64,
    pub triggered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatAssessment {
    pub threat_level: ThreatLevel,
    pub threat_score: f64,
    pub confidence: f64,
    pub triggered_indicators: Vec<TriggeredIndicator>,
    pub recommendations: Vec<String>,
}

/// A validated request for one of the served models
#[derive(Debug, Clone)]
pub enum PredictionRequest {
    Trajectory(TrajectoryRequest),
    Anomaly(AnomalyDetectionRequest),
    Threat(ThreatAssessmentRequest),
}

impl PredictionRequest {
    /// Model kind that serves this request
    pub fn kind(&self) -> ModelKind {
        match self {
            PredictionRequest::Trajectory(_) => ModelKind::AircraftTrajectory,
            PredictionRequest::Anomaly(_) => ModelKind::AnomalyDetector,
            PredictionRequest::Threat(_) => ModelKind::ThreatAssessor,
        }
    }
}

/// Algorithm-specific result payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    Trajectory(TrajectoryPrediction),
    Anomaly(AnomalyReport),
    Threat(ThreatAssessment),
}

impl PredictionOutput {
    /// Overall confidence reported alongside the result, if the model has one
    pub fn confidence(&self) -> Option<f64> {
        match self {
            PredictionOutput::Trajectory(t) => Some(t.confidence_score),
            PredictionOutput::Anomaly(_) => None,
            PredictionOutput::Threat(t) => Some(t.confidence),
        }
    }
}

/// Successful prediction with timing metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionEnvelope {
    pub result: PredictionOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub model_version: String,
    pub processing_time_ms: f64,
    pub timestamp: String,
}

/// Entry in the model listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    pub status: String,
}
