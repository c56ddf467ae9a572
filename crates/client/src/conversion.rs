//! Client for the PDF conversion service.

use std::path::PathBuf;

use async_trait::async_trait;
use doclab_core::{JobKind, RawJobStatus};

use crate::backend::{require_job_id, CancelReply, JobBackend, SubmitAccepted};
use crate::error::ApiError;
use crate::http::{parse_json, JobEndpoints};

/// A batch of PDFs to convert into a named working folder.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Target folder on the conversion service; created if absent.
    pub folder: String,
    /// Local paths of the PDF files to upload.
    pub files: Vec<PathBuf>,
}

/// HTTP client for the conversion service.
pub struct ConversionBackend {
    client: reqwest::Client,
    endpoints: JobEndpoints,
}

impl ConversionBackend {
    /// Create a client for the conversion service at `base_url`
    /// (e.g. `http://localhost:5004`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful
    /// for connection pooling across backends).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            endpoints: JobEndpoints::new(base_url, JobKind::Conversion),
        }
    }

    /// List the working folders that already exist on the service.
    pub async fn list_folders(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/list-subfolders", self.endpoints.base_url());
        let response = self.client.get(url).send().await?;
        parse_json(response).await
    }

    /// List the PDF files already uploaded into `folder`.
    pub async fn list_files(&self, folder: &str) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/list-files", self.endpoints.base_url());
        let response = self
            .client
            .get(url)
            .query(&[("folder", folder)])
            .send()
            .await?;
        parse_json(response).await
    }

    async fn upload_form(&self, request: &ConversionRequest) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new().text("folder", request.folder.clone());

        for path in &request.files {
            let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
                path: path.clone(),
                source,
            })?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.pdf".to_string());
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(file_name)
                .mime_str("application/pdf")?;
            form = form.part("files", part);
        }

        Ok(form)
    }
}

#[async_trait]
impl JobBackend for ConversionBackend {
    type Payload = ConversionRequest;

    fn kind(&self) -> JobKind {
        JobKind::Conversion
    }

    async fn submit(&self, payload: &Self::Payload) -> Result<SubmitAccepted, ApiError> {
        let form = self.upload_form(payload).await?;
        let response = self
            .client
            .post(self.endpoints.submit())
            .multipart(form)
            .send()
            .await?;

        let accepted = require_job_id(parse_json(response).await?)?;
        tracing::info!(
            job_id = %accepted.job_id,
            folder = %payload.folder,
            files = payload.files.len(),
            "Conversion job submitted",
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
