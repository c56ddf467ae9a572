//! Advisory cancellation.

use doclab_client::{ApiError, CancelReply, JobBackend};
use doclab_core::JobHandle;

/// Outcome of a cancel request as the server reported it.
///
/// Cancellation is advisory: none of these outcomes stop the status
/// poller, whose next tick carries the authoritative state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The server accepted the request and will try to stop the job.
    CancelRequested,
    /// The job reached a terminal state before the request arrived.
    AlreadyFinished,
    /// The server's answer fit neither case (including a 404 for an id
    /// it no longer knows).
    Unknown,
}

impl CancelOutcome {
    fn from_reply(reply: &CancelReply) -> Self {
        match reply.status.as_str() {
            "cancel_requested" => Self::CancelRequested,
            "already_finished" => Self::AlreadyFinished,
            _ => Self::Unknown,
        }
    }
}

/// Issue one cancel call for `handle`.
///
/// Returns `Err` only for real failures (network, 5xx); a 404 is mapped
/// to [`CancelOutcome::Unknown`] with `stale` set so the caller can run
/// the same reference cleanup as the poller.
pub(crate) async fn request_cancel<B: JobBackend>(
    backend: &B,
    handle: &JobHandle,
) -> Result<(CancelOutcome, bool), ApiError> {
    match backend.cancel(&handle.id).await {
        Ok(reply) => {
            let outcome = CancelOutcome::from_reply(&reply);
            tracing::info!(
                kind = %handle.kind,
                job_id = %handle.id,
                reply_status = %reply.status,
                final_state = reply.state.as_deref().unwrap_or(""),
                "Cancel request answered",
            );
            Ok((outcome, false))
        }
        Err(ApiError::NotFound) => {
            tracing::info!(
                kind = %handle.kind,
                job_id = %handle.id,
                "Cancel target unknown to the server, treating reference as stale",
            );
            Ok((CancelOutcome::Unknown, true))
        }
        Err(e) => Err(e),
    }
}
