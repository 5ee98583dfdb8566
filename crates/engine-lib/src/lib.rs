//! Prediction engine library
//!
//! This crate provides the core functionality for:
//! - Trajectory extrapolation, anomaly detection and threat scoring
//! - The model registry and request dispatch
//! - Request validation
//! - Health checks and observability

pub mod dispatch;
pub mod health;
pub mod models;
pub mod observability;
pub mod registry;
pub mod scoring;
pub mod validation;

pub use dispatch::{DispatchError, Dispatcher, ErrorBody, StatusKind};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{InFlightGuard, ServiceMetrics, StructuredLogger};
pub use registry::{ModelRegistry, RegisteredModel};
pub use scoring::{ScoringError, ScoringModel};
pub use validation::{Validate, ValidationError};
