//! The cooperative status-poll loop.
//!
//! One loop instance tracks one job. There is never more than one
//! in-flight status request: each tick waits for the previous response,
//! applies it, then sleeps for the poll interval, so a slow backend
//! naturally throttles the request rate. The loop exits when a terminal
//! state is observed, when the server stops recognizing the job id, when
//! the persisted reference is cleared or replaced by another writer, or
//! when the tracker shuts down.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use doclab_client::{ApiError, JobBackend};
use doclab_core::{normalize, JobHandle, JobStatus};
use doclab_store::JobRefSlot;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::events::JobEvent;
use crate::machine::{self, Tick};

/// Shared pieces the poll loop works against.
pub(crate) struct PollContext {
    pub slot: JobRefSlot,
    pub interval: Duration,
    pub current: Arc<RwLock<Option<JobStatus>>>,
    pub events: broadcast::Sender<JobEvent>,
    pub shutdown: CancellationToken,
}

pub(crate) fn read_current(current: &RwLock<Option<JobStatus>>) -> Option<JobStatus> {
    current
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

pub(crate) fn set_current(current: &RwLock<Option<JobStatus>>, value: Option<JobStatus>) {
    *current.write().unwrap_or_else(PoisonError::into_inner) = value;
}

/// Drive one job to completion.
pub(crate) async fn run<B: JobBackend>(backend: Arc<B>, ctx: PollContext, handle: JobHandle) {
    loop {
        if ctx.shutdown.is_cancelled() {
            return;
        }

        // Another writer (a second host sharing the store) may have
        // cleared or replaced the slot since the last tick; re-check
        // before issuing a request on its behalf.
        match ctx.slot.load() {
            Ok(Some(persisted)) if persisted.id == handle.id => {}
            Ok(_) => {
                tracing::debug!(
                    kind = %handle.kind,
                    job_id = %handle.id,
                    "Persisted reference no longer names this job, stopping poll loop",
                );
                return;
            }
            Err(e) => {
                // The store being briefly unreadable is no reason to
                // abandon a live job; poll anyway.
                tracing::warn!(
                    kind = %handle.kind,
                    job_id = %handle.id,
                    error = %e,
                    "Failed to re-read job reference",
                );
            }
        }

        match backend.status(&handle.id).await {
            Ok(raw) => {
                let prev = read_current(&ctx.current);
                match machine::advance(prev.as_ref(), normalize(&raw)) {
                    Tick::Terminal(status) => {
                        tracing::info!(
                            kind = %handle.kind,
                            job_id = %handle.id,
                            state = %status.state,
                            "Job reached a terminal state",
                        );
                        set_current(&ctx.current, Some(status.clone()));
                        if let Err(e) = ctx.slot.clear() {
                            tracing::error!(
                                kind = %handle.kind,
                                job_id = %handle.id,
                                error = %e,
                                "Failed to clear job reference",
                            );
                        }
                        let _ = ctx.events.send(JobEvent::Finished {
                            kind: handle.kind,
                            job_id: handle.id.clone(),
                            status,
                        });
                        return;
                    }
                    Tick::Progress(status) => {
                        tracing::debug!(
                            kind = %handle.kind,
                            job_id = %handle.id,
                            state = %status.state,
                            progress = status.progress,
                            "Job status",
                        );
                        set_current(&ctx.current, Some(status.clone()));
                        let _ = ctx.events.send(JobEvent::Status {
                            kind: handle.kind,
                            job_id: handle.id.clone(),
                            status,
                        });
                    }
                }
            }
            Err(ApiError::NotFound) => {
                stale_cleanup(&ctx.slot, &ctx.current, &ctx.events, &handle);
                return;
            }
            Err(e) => {
                // Transient: skip this tick's state update and keep
                // polling. Surface a placeholder only if nothing has
                // been observed yet, so watchers see *something*.
                tracing::warn!(
                    kind = %handle.kind,
                    job_id = %handle.id,
                    error = %e,
                    "Status poll failed, will retry",
                );
                if read_current(&ctx.current).is_none() {
                    let placeholder = JobStatus::waiting();
                    set_current(&ctx.current, Some(placeholder.clone()));
                    let _ = ctx.events.send(JobEvent::Status {
                        kind: handle.kind,
                        job_id: handle.id.clone(),
                        status: placeholder,
                    });
                }
            }
        }

        tokio::select! {
            _ = ctx.shutdown.cancelled() => return,
            _ = tokio::time::sleep(ctx.interval) => {}
        }
    }
}

/// Shared stale-reference cleanup for the poller and the cancel path.
///
/// A 404 for a persisted id is the expected aftermath of a job finishing
/// on the server between restarts: drop the reference, drop the cached
/// snapshot, and tell subscribers the job went stale.
pub(crate) fn stale_cleanup(
    slot: &JobRefSlot,
    current: &RwLock<Option<JobStatus>>,
    events: &broadcast::Sender<JobEvent>,
    handle: &JobHandle,
) {
    tracing::info!(
        kind = %handle.kind,
        job_id = %handle.id,
        "Server no longer knows this job, clearing stale reference",
    );
    if let Err(e) = slot.clear() {
        tracing::error!(
            kind = %handle.kind,
            job_id = %handle.id,
            error = %e,
            "Failed to clear stale job reference",
        );
    }
    set_current(current, None);
    let _ = events.send(JobEvent::Stale {
        kind: handle.kind,
        job_id: handle.id.clone(),
    });
}
