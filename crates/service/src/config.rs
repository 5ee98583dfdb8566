//! Service configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP port for predictions, health and metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Version recorded for every registered model
    #[serde(default = "default_model_version")]
    pub model_version: String,

    /// Version reported by the health endpoint
    #[serde(default = "default_service_version")]
    pub service_version: String,

    /// Per-request timeout enforced by the HTTP layer
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8001
}

fn default_model_version() -> String {
    "1.0.0".to_string()
}

fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_port: default_api_port(),
            model_version: default_model_version(),
            service_version: default_service_version(),
            request_timeout_secs: default_request_timeout(),
            log_format: LogFormat::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from `PREDICTOR_*` environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("PREDICTOR").try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid service configuration")
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.api_port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
