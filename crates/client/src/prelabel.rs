//! Client for the prelabeling orchestrator service.

use async_trait::async_trait;
use doclab_core::{JobKind, RawJobStatus};
use serde::Serialize;

use crate::backend::{require_job_id, CancelReply, JobBackend, SubmitAccepted};
use crate::error::ApiError;
use crate::http::{parse_json, JobEndpoints};

/// Parameters for an AI prelabeling run over a labeling project.
#[derive(Debug, Clone, Serialize)]
pub struct PrelabelRequest {
    /// Name of the labeling project whose tasks get prelabeled.
    pub project_name: String,
    /// Model identifier the orchestrator should run.
    pub model: String,
    /// System prompt handed to the model.
    pub system_prompt: String,
    /// Questions-and-labels definition file, relative to the project.
    pub qal_file: String,
    /// Labeling-service API token the orchestrator acts with.
    pub token: String,
    /// Parsed questions-and-labels JSON.
    pub questions_and_labels: serde_json::Value,
}

/// HTTP client for the orchestrator service.
pub struct PrelabelBackend {
    client: reqwest::Client,
    endpoints: JobEndpoints,
}

impl PrelabelBackend {
    /// Create a client for the orchestrator at `base_url`
    /// (e.g. `http://localhost:5001`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            endpoints: JobEndpoints::new(base_url, JobKind::Prelabel),
        }
    }
}

#[async_trait]
impl JobBackend for PrelabelBackend {
    type Payload = PrelabelRequest;

    fn kind(&self) -> JobKind {
        JobKind::Prelabel
    }

    async fn submit(&self, payload: &Self::Payload) -> Result<SubmitAccepted, ApiError> {
        let response = self
            .client
            .post(self.endpoints.submit())
            .json(payload)
            .send()
            .await?;

        let accepted = require_job_id(parse_json(response).await?)?;
        tracing::info!(
            job_id = %accepted.job_id,
            project = %payload.project_name,
            model = %payload.model,
            "Prelabel job submitted",
        );
        Ok(accepted)
    }

    async fn status(&self, job_id: &str) -> Result<RawJobStatus, ApiError> {
        let response = self.client.get(self.endpoints.status(job_id)).send().await?;
        parse_json(response).await
    }

    async fn cancel(&self, job_id: &str) -> Result<CancelReply, ApiError> {
        let response = self.client.post(self.endpoints.cancel(job_id)).send().await?;
        parse_json(response).await
    }
}
