//! Aircraft trajectory extrapolation
//!
//! Dead reckoning from the current position, assuming constant speed,
//! heading and altitude.

use super::{ensure_finite, ScoringError, ScoringModel};
use crate::models::{
    ModelKind, PredictedPosition, PredictionOutput, PredictionRequest, TrajectoryPrediction,
    TrajectoryRequest,
};

/// Number of future positions produced
pub const PREDICTION_STEPS: u32 = 10;

/// Spacing between predicted positions
pub const STEP_SECS: u32 = 60;

/// Kilometers per degree of latitude
pub const KM_PER_DEGREE: f64 = 111.32;

/// Overall confidence reported for every trajectory.
///
/// Fixed regardless of input or horizon.
pub const OVERALL_CONFIDENCE: f64 = 0.85;

const INITIAL_CONFIDENCE: f64 = 0.95;
const CONFIDENCE_DECAY_PER_STEP: f64 = 0.05;
const MIN_CONFIDENCE: f64 = 0.5;

/// Below this, cos(latitude) is treated as zero and longitude is held
const POLE_COS_EPSILON: f64 = 1e-9;

/// Predicts future aircraft positions by linear extrapolation
#[derive(Debug, Default, Clone)]
pub struct TrajectoryPredictor;

impl TrajectoryPredictor {
    pub fn new() -> Self {
        Self
    }

    /// Extrapolate the next positions at one-minute intervals
    pub fn predict(&self, state: &TrajectoryRequest) -> Result<TrajectoryPrediction, ScoringError> {
        let heading_rad = state.heading.to_radians();
        let lat_cos = state.latitude.to_radians().cos();

        let mut positions = Vec::with_capacity(PREDICTION_STEPS as usize);
        for step in 1..=PREDICTION_STEPS {
            let distance_km = state.velocity * f64::from(STEP_SECS * step) / 1000.0;
            let delta_lat = distance_km * heading_rad.cos() / KM_PER_DEGREE;
            // Longitude is undefined at the poles
            let delta_lon = if lat_cos.abs() < POLE_COS_EPSILON {
                0.0
            } else {
                distance_km * heading_rad.sin() / (KM_PER_DEGREE * lat_cos)
            };

            positions.push(PredictedPosition {
                timestamp: STEP_SECS * step,
                latitude: ensure_finite("latitude", state.latitude + delta_lat)?,
                longitude: ensure_finite("longitude", state.longitude + delta_lon)?,
                altitude: ensure_finite("altitude", state.altitude)?,
                confidence: step_confidence(step),
            });
        }

        let estimated_arrival = positions
            .last()
            .cloned()
            .ok_or(ScoringError::NonFinite { field: "positions" })?;

        Ok(TrajectoryPrediction {
            predicted_positions: positions,
            estimated_arrival,
            confidence_score: OVERALL_CONFIDENCE,
        })
    }
}

/// Confidence for the position `step` minutes ahead
fn step_confidence(step: u32) -> f64 {
    (INITIAL_CONFIDENCE - CONFIDENCE_DECAY_PER_STEP * f64::from(step)).max(MIN_CONFIDENCE)
}

impl ScoringModel for TrajectoryPredictor {
    fn kind(&self) -> ModelKind {
        ModelKind::AircraftTrajectory
    }

    fn score(&self, request: &PredictionRequest) -> Result<PredictionOutput, ScoringError> {
        match request {
            PredictionRequest::Trajectory(state) => {
                self.predict(state).map(PredictionOutput::Trajectory)
            }
            other => Err(ScoringError::KindMismatch {
                model: self.kind(),
                received: other.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(latitude: f64, velocity: f64, heading: f64) -> TrajectoryRequest {
        TrajectoryRequest {
            icao24: "a1b2c3".to_string(),
            latitude,
            longitude: -0.45,
            altitude: 10_000.0,
            velocity,
            heading,
            historical_positions: Vec::new(),
        }
    }

    #[test]
    fn test_produces_ten_ordered_positions() {
        let prediction = TrajectoryPredictor::new()
            .predict(&state(51.47, 250.0, 90.0))
            .unwrap();

        assert_eq!(prediction.predicted_positions.len(), 10);
        let timestamps: Vec<u32> = prediction
            .predicted_positions
            .iter()
            .map(|p| p.timestamp)
            .collect();
        assert_eq!(timestamps, vec![60, 120, 180, 240, 300, 360, 420, 480, 540, 600]);
    }

    #[test]
    fn test_confidence_decays_to_floor() {
        let prediction = TrajectoryPredictor::new()
            .predict(&state(10.0, 200.0, 45.0))
            .unwrap();

        let confidences: Vec<f64> = prediction
            .predicted_positions
            .iter()
            .map(|p| p.confidence)
            .collect();
        for pair in confidences.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        assert!((confidences[0] - 0.9).abs() < 1e-9);
        assert!(confidences.iter().all(|c| *c >= 0.5));
        assert!((confidences[9] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_velocity_stays_in_place() {
        let start = state(40.0, 0.0, 123.0);
        let prediction = TrajectoryPredictor::new().predict(&start).unwrap();

        for position in &prediction.predicted_positions {
            assert_eq!(position.latitude, start.latitude);
            assert_eq!(position.longitude, start.longitude);
            assert_eq!(position.altitude, start.altitude);
        }
    }

    #[test]
    fn test_due_north_moves_latitude_only() {
        let prediction = TrajectoryPredictor::new()
            .predict(&state(0.0, 1000.0 / 60.0, 0.0))
            .unwrap();

        // 1 km per minute
        let first = &prediction.predicted_positions[0];
        assert!((first.latitude - 1.0 / KM_PER_DEGREE).abs() < 1e-12);
        assert!((first.longitude - (-0.45)).abs() < 1e-12);
    }

    #[test]
    fn test_estimated_arrival_and_fixed_confidence() {
        let prediction = TrajectoryPredictor::new()
            .predict(&state(35.0, 230.0, 270.0))
            .unwrap();

        assert_eq!(
            &prediction.estimated_arrival,
            prediction.predicted_positions.last().unwrap()
        );
        assert_eq!(prediction.confidence_score, OVERALL_CONFIDENCE);
    }

    #[test]
    fn test_pole_holds_longitude() {
        let prediction = TrajectoryPredictor::new()
            .predict(&state(90.0, 250.0, 90.0))
            .unwrap();

        for position in &prediction.predicted_positions {
            assert!(position.longitude.is_finite());
            assert_eq!(position.longitude, -0.45);
        }
    }

    #[test]
    fn test_non_finite_input_is_an_error() {
        let result = TrajectoryPredictor::new().predict(&state(10.0, f64::INFINITY, 45.0));
        assert!(matches!(result, Err(ScoringError::NonFinite { .. })));
    }

    #[test]
    fn test_rejects_other_request_kinds() {
        let request = PredictionRequest::Anomaly(crate::models::AnomalyDetectionRequest {
            data_type: "cpu".to_string(),
            values: vec![1.0, 2.0],
            threshold: 2.0,
        });

        let result = TrajectoryPredictor::new().score(&request);
        assert!(matches!(result, Err(ScoringError::KindMismatch { .. })));
    }
}
