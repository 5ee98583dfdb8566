//! Observability infrastructure for the prediction service
//!
//! Provides:
//! - Prometheus metrics (prediction counts, latency, in-flight gauge, model load time)
//! - Structured JSON logging with tracing

use crate::models::{AnomalyReport, AnomalySeverity, ModelKind, ThreatAssessment, ThreatLevel};
use prometheus::{
    Encoder, Gauge, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// `status` label for successful predictions
pub const STATUS_SUCCESS: &str = "success";

/// `status` label for failed predictions
pub const STATUS_ERROR: &str = "error";

struct ServiceMetricsInner {
    registry: Registry,
    predictions_total: IntCounterVec,
    prediction_latency_seconds: HistogramVec,
    active_predictions: IntGauge,
    model_load_time_seconds: Gauge,
}

impl ServiceMetricsInner {
    fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let predictions_total = IntCounterVec::new(
            Opts::new("ml_predictions_total", "Total number of ML predictions"),
            &["model_type", "status"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        let prediction_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "ml_prediction_latency_seconds",
                "ML prediction latency in seconds",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["model_type"],
        )?;
        registry.register(Box::new(prediction_latency_seconds.clone()))?;

        let active_predictions =
            IntGauge::new("ml_active_predictions", "Number of active predictions")?;
        registry.register(Box::new(active_predictions.clone()))?;

        let model_load_time_seconds = Gauge::new(
            "ml_model_load_time_seconds",
            "Time taken to load ML models",
        )?;
        registry.register(Box::new(model_load_time_seconds.clone()))?;

        Ok(Self {
            registry,
            predictions_total,
            prediction_latency_seconds,
            active_predictions,
            model_load_time_seconds,
        })
    }
}

/// Service metrics for Prometheus exposition
///
/// Each instance owns its own Prometheus registry. Clones share the same
/// underlying metrics, so one instance is built at startup and handed to
/// every component that records or exports metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    inner: Arc<ServiceMetricsInner>,
}

impl ServiceMetrics {
    /// Create and register a fresh set of metrics
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            inner: Arc::new(ServiceMetricsInner::new()?),
        })
    }

    pub fn inc_in_flight(&self) {
        self.inner.active_predictions.inc();
    }

    pub fn dec_in_flight(&self) {
        self.inner.active_predictions.dec();
    }

    /// Mark a prediction as in flight until the returned guard is dropped
    pub fn track_in_flight(&self) -> InFlightGuard {
        self.inc_in_flight();
        InFlightGuard {
            metrics: self.clone(),
        }
    }

    /// Number of predictions currently executing
    pub fn in_flight(&self) -> i64 {
        self.inner.active_predictions.get()
    }

    /// Record a successful prediction and its latency
    pub fn record_success(&self, kind: ModelKind, latency_secs: f64) {
        self.inner
            .predictions_total
            .with_label_values(&[kind.metric_label(), STATUS_SUCCESS])
            .inc();
        self.inner
            .prediction_latency_seconds
            .with_label_values(&[kind.metric_label()])
            .observe(latency_secs);
    }

    /// Record a failed prediction
    pub fn record_error(&self, kind: ModelKind) {
        self.inner
            .predictions_total
            .with_label_values(&[kind.metric_label(), STATUS_ERROR])
            .inc();
    }

    /// Current value of the prediction counter for a model and status
    pub fn prediction_count(&self, kind: ModelKind, status: &str) -> u64 {
        self.inner
            .predictions_total
            .with_label_values(&[kind.metric_label(), status])
            .get()
    }

    /// Number of latency samples recorded for a model
    pub fn latency_samples(&self, kind: ModelKind) -> u64 {
        self.inner
            .prediction_latency_seconds
            .with_label_values(&[kind.metric_label()])
            .get_sample_count()
    }

    /// Record how long model registration took
    pub fn set_model_load_time(&self, secs: f64) {
        self.inner.model_load_time_seconds.set(secs);
    }

    /// Encode all metrics in the Prometheus text exposition format
    pub fn encode_text(&self) -> prometheus::Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }

    /// Content type of [`Self::encode_text`] output
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}

/// Releases an in-flight slot when dropped, on every exit path
#[must_use = "the prediction stops counting as in flight when the guard is dropped"]
pub struct InFlightGuard {
    metrics: ServiceMetrics,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.metrics.dec_in_flight();
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for predictions, detected
/// anomalies, threat assessments and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, model_version: &str) {
        info!(
            event = "service_started",
            service = %self.service_name,
            service_version = %version,
            model_version = %model_version,
            "Prediction service started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service_name,
            reason = %reason,
            "Prediction service shutting down"
        );
    }

    /// Log completion of model registration
    pub fn log_models_loaded(&self, count: usize, load_time_secs: f64) {
        info!(
            event = "models_loaded",
            service = %self.service_name,
            models = count,
            load_time_secs = load_time_secs,
            "Models loaded in {:.2}s",
            load_time_secs
        );
    }

    /// Log a served prediction
    pub fn log_prediction(
        &self,
        kind: ModelKind,
        model_version: &str,
        processing_time_ms: f64,
        confidence: Option<f64>,
    ) {
        debug!(
            event = "prediction_served",
            service = %self.service_name,
            model = %kind,
            model_version = %model_version,
            processing_time_ms = processing_time_ms,
            confidence = ?confidence,
            "Prediction served"
        );
    }

    /// Log a failed prediction
    pub fn log_prediction_failed(&self, kind: ModelKind, status_kind: &str, error: &str) {
        warn!(
            event = "prediction_failed",
            service = %self.service_name,
            model = %kind,
            status_kind = %status_kind,
            error = %error,
            "Prediction failed"
        );
    }

    /// Log the outcome of an anomaly scan
    pub fn log_anomalies(&self, report: &AnomalyReport) {
        if report.anomaly_count == 0 {
            return;
        }

        let high = report
            .anomalies
            .iter()
            .filter(|a| a.severity == AnomalySeverity::High)
            .count();

        if high > 0 {
            warn!(
                event = "anomaly_detected",
                service = %self.service_name,
                severity = %AnomalySeverity::High.as_str(),
                anomalies = report.anomaly_count,
                high_severity = high,
                mean = report.mean,
                std = report.std,
                "High severity anomalies detected"
            );
        } else {
            info!(
                event = "anomaly_detected",
                service = %self.service_name,
                severity = %AnomalySeverity::Medium.as_str(),
                anomalies = report.anomaly_count,
                mean = report.mean,
                std = report.std,
                "Anomalies detected"
            );
        }
    }

    /// Log a threat assessment, escalating critical ones
    pub fn log_threat(&self, assessment: &ThreatAssessment) {
        match assessment.threat_level {
            ThreatLevel::Critical => {
                warn!(
                    event = "threat_assessed",
                    service = %self.service_name,
                    threat_level = %assessment.threat_level.as_str(),
                    threat_score = assessment.threat_score,
                    indicators = assessment.triggered_indicators.len(),
                    "Critical threat assessed"
                );
            }
            _ => {
                info!(
                    event = "threat_assessed",
                    service = %self.service_name,
                    threat_level = %assessment.threat_level.as_str(),
                    threat_score = assessment.threat_score,
                    indicators = assessment.triggered_indicators.len(),
                    "Threat assessed"
                );
            }
        }
    }
}
