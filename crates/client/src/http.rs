//! Shared request plumbing: endpoint templates and response handling.

use doclab_core::JobKind;

use crate::error::ApiError;

/// URL templates for one job kind on one backend service.
///
/// The job protocol is uniform across kinds; only the base URL and the
/// kind's path segment differ.
#[derive(Debug, Clone)]
pub struct JobEndpoints {
    base_url: String,
    kind: JobKind,
}

impl JobEndpoints {
    pub fn new(base_url: impl Into<String>, kind: JobKind) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, kind }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn submit(&self) -> String {
        format!("{}/{}/submit", self.base_url, self.kind)
    }

    pub fn status(&self, job_id: &str) -> String {
        format!("{}/{}/status/{}", self.base_url, self.kind, job_id)
    }

    pub fn cancel(&self, job_id: &str) -> String {
        format!("{}/{}/cancel/{}", self.base_url, self.kind, job_id)
    }
}

/// Ensure the response has a success status code.
///
/// 404 is split out into [`ApiError::NotFound`] so callers can run
/// stale-reference cleanup instead of treating it as a failure; every
/// other non-2xx becomes [`ApiError::Status`] with the body preserved.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}
