//! API client for communicating with the Prediction Service

use anyhow::{Context, Result};
use engine_lib::{
    AnomalyDetectionRequest, AnomalyReport, ErrorBody, HealthResponse, ModelInfo, StatusKind,
    ThreatAssessment, ThreatAssessmentRequest, TrajectoryPrediction, TrajectoryRequest,
};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Non-success response from the service
#[derive(Debug, Error)]
#[error("API error ({status}): {message}")]
pub struct ApiError {
    pub status: u16,
    /// Present when the service returned a structured error body
    pub status_kind: Option<StatusKind>,
    pub message: String,
}

impl ApiError {
    /// True when the service reported that no model could serve the request
    pub fn is_unavailable(&self) -> bool {
        self.status_kind == Some(StatusKind::ServiceUnavailable)
    }
}

/// API client for the Prediction Service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (status_kind, message) = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(error) => (Some(error.status_kind), error.message),
                Err(_) => (None, body),
            };
            return Err(ApiError {
                status: status.as_u16(),
                status_kind,
                message,
            }
            .into());
        }

        response.json().await.context("Failed to parse response")
    }
}

/// Response of `GET /models`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub models: Vec<ModelInfo>,
}

/// Prediction response with the result typed for the endpoint that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub result: T,
    #[serde(default)]
    pub confidence: Option<f64>,
    pub model_version: String,
    pub processing_time_ms: f64,
    pub timestamp: String,
}

impl ApiClient {
    /// Fetch the health report.
    ///
    /// The service answers 503 with a full report when unhealthy, so that
    /// status is decoded rather than treated as an error.
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.base_url.join("health").context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return response.json().await.context("Failed to parse response");
        }

        Self::parse(response).await
    }

    pub async fn models(&self) -> Result<ModelList> {
        self.get("models").await
    }

    pub async fn predict_trajectory(
        &self,
        request: &TrajectoryRequest,
    ) -> Result<Envelope<TrajectoryPrediction>> {
        self.post("predict/trajectory", request).await
    }

    pub async fn detect_anomalies(
        &self,
        request: &AnomalyDetectionRequest,
    ) -> Result<Envelope<AnomalyReport>> {
        self.post("detect/anomalies", request).await
    }

    pub async fn assess_threat(
        &self,
        request: &ThreatAssessmentRequest,
    ) -> Result<Envelope<ThreatAssessment>> {
        self.post("assess/threat", request).await
    }
}
