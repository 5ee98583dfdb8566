//! Prediction service - trajectory, anomaly and threat scoring over HTTP
//!
//! Loads the scoring models at startup and serves predictions, health and
//! Prometheus metrics until interrupted.

use anyhow::Result;
use engine_lib::StructuredLogger;
use prediction_service::{
    api, bootstrap,
    config::{LogFormat, ServiceConfig},
    SERVICE_NAME,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServiceConfig::load()?;

    // Initialize tracing with the configured output and env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init(),
    }

    info!(addr = %config.listen_addr(), "Starting prediction-service");

    let logger = StructuredLogger::new(SERVICE_NAME);
    let state = bootstrap(&config, &logger).await?;
    logger.log_startup(&config.service_version, &config.model_version);

    let shutdown_logger = logger.clone();
    let shutdown_health = state.health_registry.clone();
    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        shutdown_health.begin_shutdown().await;
        shutdown_logger.log_shutdown("SIGINT received");
    };

    api::serve(&config.listen_addr(), state, shutdown).await?;
    info!("Shutting down");

    Ok(())
}
