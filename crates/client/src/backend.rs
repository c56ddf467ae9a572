//! The job protocol contract shared by both backend services.

use async_trait::async_trait;
use doclab_core::{JobKind, RawJobStatus};
use serde::Deserialize;

use crate::error::ApiError;

/// Response returned by a `POST /<kind>/submit` acceptance.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAccepted {
    /// Server-assigned identifier for the accepted job.
    pub job_id: String,
    /// Optional human-readable acceptance note.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response returned by `POST /<kind>/cancel/{job_id}`.
///
/// `status` is `"cancel_requested"` when the server will try to stop the
/// job, or `"already_finished"` when the job reached a terminal state
/// before the request arrived (in which case `state` names it).
#[derive(Debug, Clone, Deserialize)]
pub struct CancelReply {
    pub status: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// One backend service's view of one job kind.
///
/// Implementations perform plain request/response I/O and no retries or
/// scheduling; the tracker owns the poll loop. 404 responses surface as
/// [`ApiError::NotFound`] on both `status` and `cancel` so callers can
/// distinguish a stale job id from a real failure.
#[async_trait]
pub trait JobBackend: Send + Sync + 'static {
    /// Kind-specific submission payload.
    type Payload: Send + Sync;

    fn kind(&self) -> JobKind;

    /// Start a job. Fails on non-2xx responses and on acceptance bodies
    /// that carry no job id.
    async fn submit(&self, payload: &Self::Payload) -> Result<SubmitAccepted, ApiError>;

    /// Fetch the current raw status of a job.
    async fn status(&self, job_id: &str) -> Result<RawJobStatus, ApiError>;

    /// Request cancellation of a job. Advisory: the authoritative outcome
    /// is whatever the next status poll reports.
    async fn cancel(&self, job_id: &str) -> Result<CancelReply, ApiError>;
}

/// Deserialization target for acceptance bodies where `job_id` may be
/// absent; [`require_job_id`] converts it into a [`SubmitAccepted`].
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawAcceptance {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reject acceptance bodies without a job id.
pub(crate) fn require_job_id(raw: RawAcceptance) -> Result<SubmitAccepted, ApiError> {
    match raw.job_id {
        Some(job_id) if !job_id.is_empty() => Ok(SubmitAccepted {
            job_id,
            message: raw.message,
        }),
        _ => Err(ApiError::MissingJobId),
    }
}
