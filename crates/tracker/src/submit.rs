//! Job submission: start the job, persist the reference.

use doclab_client::JobBackend;
use doclab_core::JobHandle;
use doclab_store::JobRefSlot;

use crate::tracker::TrackerError;

/// Submit a job and persist its reference.
///
/// The reference is written *before* the handle is returned, so a caller
/// that crashes immediately after submission still finds the job on the
/// next start. On submission failure nothing is written.
pub(crate) async fn submit_job<B: JobBackend>(
    backend: &B,
    slot: &JobRefSlot,
    payload: &B::Payload,
) -> Result<JobHandle, TrackerError> {
    let accepted = backend.submit(payload).await?;
    let handle = JobHandle::new(accepted.job_id, backend.kind());

    slot.save(&handle)?;
    tracing::info!(
        kind = %handle.kind,
        job_id = %handle.id,
        message = accepted.message.as_deref().unwrap_or(""),
        "Job accepted and reference persisted",
    );

    Ok(handle)
}
