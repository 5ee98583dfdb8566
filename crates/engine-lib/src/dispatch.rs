//! Request dispatch
//!
//! Routes a validated request to its registered model, times the call,
//! records metrics and wraps the result in an envelope. Every failure is
//! converted to a [`DispatchError`]; nothing escapes to the caller as a panic.

use crate::models::{ModelKind, PredictionEnvelope, PredictionOutput, PredictionRequest};
use crate::observability::{ServiceMetrics, StructuredLogger};
use crate::registry::ModelRegistry;
use crate::scoring::ScoringError;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Category of a failed request, as reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    /// No model is registered for the request
    ServiceUnavailable,
    /// The model failed while computing
    Internal,
    /// The request was rejected before dispatch
    InvalidRequest,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::ServiceUnavailable => "ServiceUnavailable",
            StatusKind::Internal => "Internal",
            StatusKind::InvalidRequest => "InvalidRequest",
        }
    }
}

/// Uniform error payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status_kind: StatusKind,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Model not available: {model}")]
    ModelUnavailable { model: String },

    #[error("{model} prediction failed: {source}")]
    Computation {
        model: String,
        #[source]
        source: ScoringError,
    },
}

impl DispatchError {
    pub fn status_kind(&self) -> StatusKind {
        match self {
            DispatchError::ModelUnavailable { .. } => StatusKind::ServiceUnavailable,
            DispatchError::Computation { .. } => StatusKind::Internal,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            status_kind: self.status_kind(),
            message: self.to_string(),
        }
    }
}

/// Dispatches prediction requests to registered models
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ModelRegistry>,
    metrics: ServiceMetrics,
    logger: StructuredLogger,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ModelRegistry>,
        metrics: ServiceMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            registry,
            metrics,
            logger,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    /// Run a request through its model
    pub fn dispatch(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionEnvelope, DispatchError> {
        let kind = request.kind();
        let _in_flight = self.metrics.track_in_flight();
        let start = Instant::now();

        match self.invoke(kind, request) {
            Ok(output) => {
                let elapsed = start.elapsed();
                self.metrics.record_success(kind, elapsed.as_secs_f64());

                let model_version = self.registry.get_version(kind.model_name());
                let processing_time_ms = elapsed.as_secs_f64() * 1000.0;
                let confidence = output.confidence();

                self.logger
                    .log_prediction(kind, &model_version, processing_time_ms, confidence);
                match &output {
                    PredictionOutput::Anomaly(report) => self.logger.log_anomalies(report),
                    PredictionOutput::Threat(assessment) => self.logger.log_threat(assessment),
                    PredictionOutput::Trajectory(_) => {}
                }

                Ok(PredictionEnvelope {
                    result: output,
                    confidence,
                    model_version,
                    processing_time_ms,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                })
            }
            Err(e) => {
                self.metrics.record_error(kind);
                self.logger
                    .log_prediction_failed(kind, e.status_kind().as_str(), &e.to_string());
                Err(e)
            }
        }
    }

    fn invoke(
        &self,
        kind: ModelKind,
        request: &PredictionRequest,
    ) -> Result<PredictionOutput, DispatchError> {
        let name = kind.model_name();
        let model = self
            .registry
            .get(name)
            .ok_or_else(|| DispatchError::ModelUnavailable {
                model: name.to_string(),
            })?;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| model.score(request)))
            .unwrap_or_else(|payload| Err(ScoringError::Panicked(panic_message(payload.as_ref()))));

        outcome.map_err(|source| DispatchError::Computation {
            model: name.to_string(),
            source,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AnomalyDetectionRequest, ThreatAssessmentRequest, ThreatLevel, TrajectoryRequest,
    };
    use crate::observability::{STATUS_ERROR, STATUS_SUCCESS};
    use crate::scoring::ScoringModel;
    use std::collections::HashMap;

    struct PanickingModel;

    impl ScoringModel for PanickingModel {
        fn kind(&self) -> ModelKind {
            ModelKind::AnomalyDetector
        }

        fn score(&self, _request: &PredictionRequest) -> Result<PredictionOutput, ScoringError> {
            panic!("detector blew up");
        }
    }

    fn dispatcher(registry: ModelRegistry) -> Dispatcher {
        Dispatcher::new(
            Arc::new(registry),
            ServiceMetrics::new().unwrap(),
            StructuredLogger::new("test"),
        )
    }

    fn trajectory_request() -> PredictionRequest {
        PredictionRequest::Trajectory(TrajectoryRequest {
            icao24: "4ca7b3".to_string(),
            latitude: 53.42,
            longitude: -6.27,
            altitude: 11_000.0,
            velocity: 240.0,
            heading: 110.0,
            historical_positions: Vec::new(),
        })
    }

    fn anomaly_request(values: Vec<f64>) -> PredictionRequest {
        PredictionRequest::Anomaly(AnomalyDetectionRequest {
            data_type: "signal_strength".to_string(),
            values,
            threshold: 2.0,
        })
    }

    fn threat_request() -> PredictionRequest {
        PredictionRequest::Threat(ThreatAssessmentRequest {
            source_type: "sigint".to_string(),
            location: HashMap::new(),
            indicators: vec!["unusual_activity".to_string(), "proximity_alert".to_string()],
            confidence_level: 1.0,
        })
    }

    #[test]
    fn test_successful_dispatch_builds_envelope() {
        let dispatcher = dispatcher(ModelRegistry::with_default_models("1.0.0"));

        let envelope = dispatcher.dispatch(&trajectory_request()).unwrap();

        assert_eq!(envelope.model_version, "1.0.0");
        assert_eq!(envelope.confidence, Some(0.85));
        assert!(envelope.processing_time_ms >= 0.0);
        assert!(chrono::DateTime::parse_from_rfc3339(&envelope.timestamp).is_ok());
        assert!(matches!(envelope.result, PredictionOutput::Trajectory(_)));

        let metrics = dispatcher.metrics();
        assert_eq!(
            metrics.prediction_count(ModelKind::AircraftTrajectory, STATUS_SUCCESS),
            1
        );
        assert_eq!(metrics.latency_samples(ModelKind::AircraftTrajectory), 1);
        assert_eq!(metrics.in_flight(), 0);
    }

    #[test]
    fn test_threat_envelope_carries_confidence_level() {
        let dispatcher = dispatcher(ModelRegistry::with_default_models("1.0.0"));

        let envelope = dispatcher.dispatch(&threat_request()).unwrap();

        assert_eq!(envelope.confidence, Some(1.0));
        match envelope.result {
            PredictionOutput::Threat(t) => assert_eq!(t.threat_level, ThreatLevel::High),
            other => panic!("unexpected output: {:?}", other),
        }
    }

    #[test]
    fn test_anomaly_envelope_has_no_confidence() {
        let dispatcher = dispatcher(ModelRegistry::with_default_models("1.0.0"));

        let envelope = dispatcher
            .dispatch(&anomaly_request(vec![1.0, 2.0, 3.0]))
            .unwrap();

        assert_eq!(envelope.confidence, None);
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("confidence").is_none());
        assert_eq!(json["result"]["anomaly_count"], 0);
    }

    #[test]
    fn test_missing_model_is_service_unavailable() {
        let dispatcher = dispatcher(ModelRegistry::new());

        let err = dispatcher.dispatch(&threat_request()).unwrap_err();

        assert!(matches!(err, DispatchError::ModelUnavailable { .. }));
        assert_eq!(err.status_kind(), StatusKind::ServiceUnavailable);
        assert_eq!(
            dispatcher
                .metrics()
                .prediction_count(ModelKind::ThreatAssessor, STATUS_ERROR),
            1
        );
        assert_eq!(dispatcher.metrics().in_flight(), 0);
    }

    #[test]
    fn test_computation_error_is_internal() {
        let dispatcher = dispatcher(ModelRegistry::with_default_models("1.0.0"));

        let err = dispatcher
            .dispatch(&anomaly_request(vec![f64::MAX, f64::MAX]))
            .unwrap_err();

        assert_eq!(err.status_kind(), StatusKind::Internal);
        assert_eq!(err.to_body().status_kind, StatusKind::Internal);
        assert_eq!(
            dispatcher
                .metrics()
                .prediction_count(ModelKind::AnomalyDetector, STATUS_ERROR),
            1
        );
        assert_eq!(dispatcher.metrics().latency_samples(ModelKind::AnomalyDetector), 0);
    }

    #[test]
    fn test_panicking_model_is_contained() {
        let mut registry = ModelRegistry::new();
        registry.register("anomaly_detector", Arc::new(PanickingModel), "0.0.1");
        registry.register(
            "threat_assessor",
            Arc::new(crate::scoring::ThreatAssessor::new()),
            "1.0.0",
        );
        let dispatcher = dispatcher(registry);

        let err = dispatcher
            .dispatch(&anomaly_request(vec![1.0, 2.0]))
            .unwrap_err();

        match err {
            DispatchError::Computation {
                source: ScoringError::Panicked(message),
                ..
            } => assert!(message.contains("blew up")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(dispatcher.metrics().in_flight(), 0);

        // Still serving afterwards
        assert!(dispatcher.dispatch(&threat_request()).is_ok());
    }

    #[test]
    fn test_mismatched_registration_is_internal() {
        let mut registry = ModelRegistry::new();
        registry.register(
            "aircraft_trajectory",
            Arc::new(crate::scoring::ThreatAssessor::new()),
            "1.0.0",
        );
        let dispatcher = dispatcher(registry);

        let err = dispatcher.dispatch(&trajectory_request()).unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Computation {
                source: ScoringError::KindMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_concurrent_dispatch_restores_in_flight_gauge() {
        let dispatcher = dispatcher(ModelRegistry::with_default_models("1.0.0"));
        let before = dispatcher.metrics().in_flight();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..32u32)
                .map(|i| {
                    let dispatcher = &dispatcher;
                    scope.spawn(move || {
                        if i % 4 == 0 {
                            dispatcher.dispatch(&anomaly_request(vec![f64::MAX, f64::MAX]))
                        } else {
                            dispatcher.dispatch(&anomaly_request(vec![0.0, 0.0, f64::from(i)]))
                        }
                    })
                })
                .collect();

            for (i, handle) in handles.into_iter().enumerate() {
                let result = handle.join().unwrap();
                if i % 4 == 0 {
                    assert!(result.is_err());
                } else {
                    let envelope = result.unwrap();
                    match envelope.result {
                        PredictionOutput::Anomaly(report) => {
                            assert!((report.mean - i as f64 / 3.0).abs() < 1e-9)
                        }
                        other => panic!("unexpected output: {:?}", other),
                    }
                }
            }
        });

        let metrics = dispatcher.metrics();
        assert_eq!(metrics.in_flight(), before);
        assert_eq!(metrics.prediction_count(ModelKind::AnomalyDetector, STATUS_SUCCESS), 24);
        assert_eq!(metrics.prediction_count(ModelKind::AnomalyDetector, STATUS_ERROR), 8);
    }
}
