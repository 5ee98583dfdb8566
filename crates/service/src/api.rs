//! HTTP API for predictions, health checks and Prometheus metrics

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use engine_lib::{
    health::{components, ComponentStatus},
    AnomalyDetectionRequest, DispatchError, Dispatcher, ErrorBody, HealthRegistry, ModelInfo,
    PredictionRequest, ScoringError, StatusKind, ThreatAssessmentRequest, TrajectoryRequest,
    Validate, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub health_registry: HealthRegistry,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        dispatcher: Dispatcher,
        health_registry: HealthRegistry,
        request_timeout: Duration,
    ) -> Self {
        Self {
            dispatcher,
            health_registry,
            request_timeout,
        }
    }
}

/// Listing returned by `/models`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub models: Vec<ModelInfo>,
}

/// Error returned by prediction endpoints
#[derive(Debug)]
pub enum ApiError {
    Invalid(ValidationError),
    Dispatch(DispatchError),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Invalid(e)
    }
}

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        ApiError::Dispatch(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, body) = match self {
            ApiError::Invalid(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    status_kind: StatusKind::InvalidRequest,
                    message: e.to_string(),
                },
            ),
            ApiError::Dispatch(e) => {
                let status_code = match e.status_kind() {
                    StatusKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status_code, e.to_body())
            }
        };

        (status_code, Json(body)).into_response()
    }
}

/// Mark the dispatcher degraded after a contained failure
async fn degrade_dispatcher(state: &AppState, message: String) {
    state
        .health_registry
        .report(components::DISPATCHER, ComponentStatus::Degraded, Some(message))
        .await;
}

async fn run_prediction(
    state: &AppState,
    request: PredictionRequest,
) -> Result<Response, ApiError> {
    match state.dispatcher.dispatch(&request) {
        Ok(envelope) => Ok(Json(envelope).into_response()),
        Err(e) => {
            if let DispatchError::Computation {
                source: ScoringError::Panicked(_),
                ..
            } = &e
            {
                degrade_dispatcher(state, e.to_string()).await;
            }
            Err(e.into())
        }
    }
}

/// Predict an aircraft trajectory
async fn predict_trajectory(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TrajectoryRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;
    run_prediction(&state, PredictionRequest::Trajectory(request)).await
}

/// Detect anomalies in a series
async fn detect_anomalies(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnomalyDetectionRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;
    run_prediction(&state, PredictionRequest::Anomaly(request)).await
}

/// Assess a threat
async fn assess_threat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ThreatAssessmentRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;
    run_prediction(&state, PredictionRequest::Threat(request)).await
}

/// List registered models
async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelList> {
    Json(ModelList {
        models: state.dispatcher.registry().list_models(),
    })
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let models_loaded = state.dispatcher.registry().len();
    let health = state.health_registry.health(models_loaded).await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let metrics = state.dispatcher.metrics();

    match metrics.encode_text().map_err(|e| e.to_string()) {
        Ok(buffer) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, metrics.content_type())],
            buffer,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            degrade_dispatcher(&state, format!("Metrics encoding failed: {}", e)).await;
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        .route("/health", get(health))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/models", get(list_models))
        .route("/predict/trajectory", post(predict_trajectory))
        .route("/detect/anomalies", post(detect_anomalies))
        .route("/assess/threat", post(assess_threat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Start the API server, returning once `shutdown` resolves
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
