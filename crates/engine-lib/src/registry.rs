//! Model registry
//!
//! Maps model names to scoring implementations and their versions. The
//! registry is populated once at startup and shared read-only afterwards.

use crate::models::{ModelInfo, ModelKind};
use crate::scoring::{AnomalyDetector, ScoringModel, ThreatAssessor, TrajectoryPredictor};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Version reported for names with no registered model
pub const UNKNOWN_VERSION: &str = "unknown";

/// Status reported for every registered model
pub const LOADED_STATUS: &str = "loaded";

/// A named, versioned model
#[derive(Clone)]
pub struct RegisteredModel {
    pub name: String,
    pub version: String,
    pub model: Arc<dyn ScoringModel>,
}

impl fmt::Debug for RegisteredModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredModel")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("kind", &self.model.kind())
            .finish()
    }
}

/// Registry of models available for dispatch
#[derive(Debug, Default)]
pub struct ModelRegistry {
    // Registration order is the listing order
    entries: Vec<RegisteredModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding the three built-in models
    pub fn with_default_models(version: &str) -> Self {
        let mut registry = Self::new();
        registry.register(
            ModelKind::AircraftTrajectory.model_name(),
            Arc::new(TrajectoryPredictor::new()),
            version,
        );
        registry.register(
            ModelKind::AnomalyDetector.model_name(),
            Arc::new(AnomalyDetector::new()),
            version,
        );
        registry.register(
            ModelKind::ThreatAssessor.model_name(),
            Arc::new(ThreatAssessor::new()),
            version,
        );
        registry
    }

    /// Register a model, replacing any existing entry with the same name
    pub fn register(&mut self, name: &str, model: Arc<dyn ScoringModel>, version: &str) {
        let entry = RegisteredModel {
            name: name.to_string(),
            version: version.to_string(),
            model,
        };

        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }

        info!(model = %name, version = %version, "Registered model");
    }

    /// Look up a model by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn ScoringModel>> {
        self.entry(name).map(|e| Arc::clone(&e.model))
    }

    /// Version of a model, or [`UNKNOWN_VERSION`] if it is not registered
    pub fn get_version(&self, name: &str) -> String {
        self.entry(name)
            .map(|e| e.version.clone())
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string())
    }

    /// List registered models in registration order
    pub fn list_models(&self) -> Vec<ModelInfo> {
        self.entries
            .iter()
            .map(|e| ModelInfo {
                name: e.name.clone(),
                version: e.version.clone(),
                status: LOADED_STATUS.to_string(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, name: &str) -> Option<&RegisteredModel> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_name_is_a_miss() {
        let registry = ModelRegistry::with_default_models("1.0.0");

        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.get_version("nonexistent"), "unknown");
    }

    #[test]
    fn test_default_models_are_listed_in_order() {
        let registry = ModelRegistry::with_default_models("1.0.0");
        let names: Vec<String> = registry.list_models().into_iter().map(|m| m.name).collect();

        assert_eq!(
            names,
            vec!["aircraft_trajectory", "anomaly_detector", "threat_assessor"]
        );
        assert_eq!(registry.len(), 3);
        assert!(registry
            .list_models()
            .iter()
            .all(|m| m.status == "loaded" && m.version == "1.0.0"));
    }

    #[test]
    fn test_register_overwrites_existing_entry() {
        let mut registry = ModelRegistry::with_default_models("1.0.0");

        // Same name, different implementation and version
        registry.register("anomaly_detector", Arc::new(ThreatAssessor::new()), "2.0.0");

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get_version("anomaly_detector"), "2.0.0");
        assert_eq!(
            registry.get("anomaly_detector").unwrap().kind(),
            ModelKind::ThreatAssessor
        );
        // Overwriting keeps the listing position
        assert_eq!(registry.list_models()[1].name, "anomaly_detector");
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = ModelRegistry::new();
        registry.register("threat_assessor", Arc::new(ThreatAssessor::new()), "1.0.0");
        registry.register("threat_assessor", Arc::new(ThreatAssessor::new()), "1.0.0");

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get_version("threat_assessor"), "1.0.0");
    }

    #[test]
    fn test_empty_registry() {
        let registry = ModelRegistry::new();

        assert!(registry.is_empty());
        assert!(registry.list_models().is_empty());
    }
}
