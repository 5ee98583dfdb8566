//! Health and readiness reporting
//!
//! Components start healthy and are moved to another status by events the
//! service observes: a model panicking during dispatch, metrics failing to
//! encode, or the process draining for shutdown. The model registry's status
//! is derived from the number of loaded models each time health is read.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Health status of a component, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Serving, but something needs attention
    Degraded,
    /// Not serving
    Unhealthy,
}

impl ComponentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Healthy => "healthy",
            ComponentStatus::Degraded => "degraded",
            ComponentStatus::Unhealthy => "unhealthy",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Unix seconds of the last status change
    pub last_check_timestamp: i64,
}

impl ComponentHealth {
    pub fn new(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_check_timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub models_loaded: usize,
    pub components: HashMap<String, ComponentHealth>,
}

/// Body of `GET /readyz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const MODEL_REGISTRY: &str = "model_registry";
    pub const DISPATCHER: &str = "dispatcher";
}

const NOT_STARTED_REASON: &str = "Models not yet loaded";
const UNHEALTHY_REASON: &str = "Critical component unhealthy";
const NO_MODELS_MESSAGE: &str = "No models registered";
const SHUTDOWN_MESSAGE: &str = "Shutting down";

/// Shared handle on the service's health state
#[derive(Debug, Clone)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    started: Arc<AtomicBool>,
    version: String,
    started_at: Instant,
}

impl HealthRegistry {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            components: Arc::new(RwLock::new(HashMap::new())),
            started: Arc::new(AtomicBool::new(false)),
            version: version.into(),
            started_at: Instant::now(),
        }
    }

    /// Track a component, starting healthy
    pub async fn register(&self, name: &str) {
        self.report(name, ComponentStatus::Healthy, None).await;
    }

    /// Record a status change for a component
    pub async fn report(&self, name: &str, status: ComponentStatus, message: Option<String>) {
        self.components
            .write()
            .await
            .insert(name.to_string(), ComponentHealth::new(status, message));
    }

    /// Startup finished; readiness now depends on component status only
    pub fn mark_started(&self) {
        self.started.store(true, Ordering::SeqCst);
    }

    /// Stop taking traffic while in-flight requests drain
    pub async fn begin_shutdown(&self) {
        self.report(
            components::DISPATCHER,
            ComponentStatus::Unhealthy,
            Some(SHUTDOWN_MESSAGE.to_string()),
        )
        .await;
    }

    /// Current health, given how many models the registry holds
    pub async fn health(&self, models_loaded: usize) -> HealthResponse {
        let mut components = self.components.read().await.clone();

        if models_loaded == 0 {
            if let Some(registry) = components.get_mut(components::MODEL_REGISTRY) {
                if registry.status == ComponentStatus::Healthy {
                    *registry = ComponentHealth::new(
                        ComponentStatus::Degraded,
                        Some(NO_MODELS_MESSAGE.to_string()),
                    );
                }
            }
        }

        HealthResponse {
            status: worst_status(&components),
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: self.version.clone(),
            uptime_seconds: self.started_at.elapsed().as_secs(),
            models_loaded,
            components,
        }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        let reason = if !self.started.load(Ordering::SeqCst) {
            Some(NOT_STARTED_REASON)
        } else if worst_status(&*self.components.read().await) == ComponentStatus::Unhealthy {
            Some(UNHEALTHY_REASON)
        } else {
            None
        };

        ReadinessResponse {
            ready: reason.is_none(),
            reason: reason.map(str::to_string),
        }
    }
}

fn worst_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
    components
        .values()
        .map(|c| c.status)
        .max()
        .unwrap_or(ComponentStatus::Healthy)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn started_registry() -> HealthRegistry {
        let registry = HealthRegistry::new("2.0.0");
        registry.register(components::MODEL_REGISTRY).await;
        registry.register(components::DISPATCHER).await;
        registry.mark_started();
        registry
    }

    #[tokio::test]
    async fn test_no_components_is_healthy() {
        let registry = HealthRegistry::new("2.0.0");
        let health = registry.health(0).await;

        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());
        assert_eq!(health.version, "2.0.0");
    }

    #[tokio::test]
    async fn test_loaded_models_keep_registry_healthy() {
        let registry = started_registry().await;

        let health = registry.health(3).await;
        assert_eq!(health.status, ComponentStatus::Healthy);
        assert_eq!(health.models_loaded, 3);
        assert_eq!(
            health.components[components::MODEL_REGISTRY].status,
            ComponentStatus::Healthy
        );
    }

    #[tokio::test]
    async fn test_empty_registry_is_degraded_but_ready() {
        let registry = started_registry().await;

        let health = registry.health(0).await;
        let model_registry = &health.components[components::MODEL_REGISTRY];
        assert_eq!(health.status, ComponentStatus::Degraded);
        assert_eq!(model_registry.message.as_deref(), Some("No models registered"));

        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_worst_component_wins() {
        let registry = started_registry().await;
        registry
            .report(
                components::DISPATCHER,
                ComponentStatus::Degraded,
                Some("Model panicked".to_string()),
            )
            .await;
        assert_eq!(registry.health(3).await.status, ComponentStatus::Degraded);

        registry
            .report(components::MODEL_REGISTRY, ComponentStatus::Unhealthy, None)
            .await;
        assert_eq!(registry.health(3).await.status, ComponentStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_not_ready_before_start() {
        let registry = HealthRegistry::new("2.0.0");
        let readiness = registry.readiness().await;

        assert!(!readiness.ready);
        assert_eq!(readiness.reason.as_deref(), Some("Models not yet loaded"));
    }

    #[tokio::test]
    async fn test_shutdown_makes_service_unready() {
        let registry = started_registry().await;
        assert!(registry.readiness().await.ready);

        registry.begin_shutdown().await;

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(readiness.reason.as_deref(), Some("Critical component unhealthy"));

        let health = registry.health(3).await;
        assert_eq!(health.status, ComponentStatus::Unhealthy);
        assert_eq!(
            health.components[components::DISPATCHER].message.as_deref(),
            Some("Shutting down")
        );
    }
}
