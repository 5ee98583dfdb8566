//! Prediction service
//!
//! HTTP facade over the prediction engine: loads the models, wires the
//! dispatcher, metrics and health tracking together and serves them.

pub mod api;
pub mod config;

use anyhow::{Context, Result};
use api::AppState;
use config::ServiceConfig;
use engine_lib::{
    health::components, Dispatcher, HealthRegistry, ModelRegistry, ServiceMetrics,
    StructuredLogger,
};
use std::sync::Arc;
use std::time::Instant;

pub const SERVICE_NAME: &str = "prediction-service";

/// Register models and build the shared application state
pub async fn bootstrap(config: &ServiceConfig, logger: &StructuredLogger) -> Result<Arc<AppState>> {
    let health_registry = HealthRegistry::new(config.service_version.clone());
    health_registry.register(components::MODEL_REGISTRY).await;
    health_registry.register(components::DISPATCHER).await;

    let metrics = ServiceMetrics::new().context("Failed to register metrics")?;

    let load_start = Instant::now();
    let registry = ModelRegistry::with_default_models(&config.model_version);
    let load_time = load_start.elapsed().as_secs_f64();

    metrics.set_model_load_time(load_time);
    logger.log_models_loaded(registry.len(), load_time);

    let dispatcher = Dispatcher::new(Arc::new(registry), metrics, logger.clone());
    let state = Arc::new(AppState::new(
        dispatcher,
        health_registry.clone(),
        config.request_timeout(),
    ));

    health_registry.mark_started();

    Ok(state)
}
