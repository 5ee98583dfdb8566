//! Request validation performed before dispatch

use crate::models::{AnomalyDetectionRequest, ThreatAssessmentRequest, TrajectoryRequest};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("heading must be within [0, 360), got {0}")]
    Heading(f64),
}

/// Checks a request's field ranges
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl Validate for TrajectoryRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        in_range("latitude", self.latitude, -90.0, 90.0)?;
        in_range("longitude", self.longitude, -180.0, 180.0)?;
        finite("altitude", self.altitude)?;
        finite("velocity", self.velocity)?;
        finite("heading", self.heading)?;
        if !(0.0..360.0).contains(&self.heading) {
            return Err(ValidationError::Heading(self.heading));
        }
        Ok(())
    }
}

impl Validate for AnomalyDetectionRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        finite("threshold", self.threshold)
    }
}

impl Validate for ThreatAssessmentRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        in_range("confidence_level", self.confidence_level, 0.0, 1.0)
    }
}
