//! Subcommand implementations.

use std::sync::Arc;

use doclab_client::{ApiError, JobBackend};
use doclab_core::{normalize, JobStatus};
use doclab_store::{JobRefSlot, RefStore};
use doclab_tracker::{CancelOutcome, JobEvent, JobTracker, TrackerError};
use tokio::sync::broadcast;

/// Render one status snapshot as a single progress line.
fn status_line(status: &JobStatus) -> String {
    let percent = (status.progress * 100.0).round() as u32;
    let mut line = format!("{} — {percent}%", status.state);
    if let (Some(done), Some(total)) = (status.done, status.total) {
        line.push_str(&format!(" ({done}/{total} files)"));
    }
    if !status.message.is_empty() {
        line.push_str(&format!(" — {}", status.message));
    }
    if let Some(error) = &status.error {
        line.push_str(&format!(" — error: {error}"));
    }
    line
}

/// Print events until the job finishes or goes stale.
async fn follow(mut rx: broadcast::Receiver<JobEvent>) -> anyhow::Result<()> {
    loop {
        match rx.recv().await {
            Ok(JobEvent::Status { status, .. }) => {
                println!("{}", status_line(&status));
            }
            Ok(JobEvent::Finished { job_id, status, .. }) => {
                println!("{job_id}: {}", status_line(&status));
                if let Some(result) = &status.result {
                    println!("result: {result}");
                }
                return Ok(());
            }
            Ok(JobEvent::Stale { job_id, .. }) => {
                println!("{job_id}: no longer known to the server; cleared local reference");
                return Ok(());
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Missed status updates, continuing");
            }
            Err(broadcast::error::RecvError::Closed) => return Ok(()),
        }
    }
}

/// Submit a job and, unless detached, follow it to completion.
pub async fn submit_and_watch<B: JobBackend>(
    tracker: &JobTracker<B>,
    payload: &B::Payload,
    detach: bool,
) -> anyhow::Result<()> {
    // Subscribe before submitting so the first poll's event is not
    // missed.
    let rx = tracker.subscribe();
    let handle = tracker.submit(payload).await?;
    println!("Accepted {} job {}.", handle.kind, handle.id);

    if detach {
        println!("Tracking state saved; run `doclab watch {}` to follow it.", handle.kind);
        return Ok(());
    }
    follow(rx).await
}

/// Resume the persisted job of this tracker's kind and follow it.
pub async fn watch<B: JobBackend>(tracker: &JobTracker<B>) -> anyhow::Result<()> {
    let rx = tracker.subscribe();
    let Some(handle) = tracker.resume()? else {
        println!("No active {} job.", tracker.kind());
        return Ok(());
    };
    println!("Watching {} job {}…", handle.kind, handle.id);
    follow(rx).await
}

/// One-shot status check of the persisted job, without starting a poll
/// loop.
pub async fn status_once<B: JobBackend>(
    backend: &B,
    store: Arc<dyn RefStore>,
) -> anyhow::Result<()> {
    let slot = JobRefSlot::new(store, backend.kind());
    let Some(handle) = slot.load()? else {
        println!("No active {} job.", backend.kind());
        return Ok(());
    };

    match backend.status(&handle.id).await {
        Ok(raw) => {
            println!("{}: {}", handle.id, status_line(&normalize(&raw)));
        }
        Err(ApiError::NotFound) => {
            slot.clear()?;
            println!(
                "{}: no longer known to the server; cleared local reference",
                handle.id
            );
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Request cancellation of the persisted job.
pub async fn cancel<B: JobBackend>(tracker: &JobTracker<B>) -> anyhow::Result<()> {
    match tracker.cancel().await {
        Ok(CancelOutcome::CancelRequested) => {
            println!("Cancel requested; the job will stop at its next checkpoint.");
        }
        Ok(CancelOutcome::AlreadyFinished) => {
            println!("Job already finished before the cancel arrived.");
        }
        Ok(CancelOutcome::Unknown) => {
            println!("Job is unknown to the server; cleared local reference.");
        }
        Err(TrackerError::NoActiveJob { kind }) => {
            println!("No active {kind} job.");
        }
        Err(TrackerError::Cancel(e)) => {
            // Advisory: a failed cancel leaves the job running and
            // tracked, so this is a warning rather than a failure.
            tracing::warn!(error = %e, "Cancel request failed; the job keeps running");
            println!("Cancel request failed ({e}); the job keeps running.");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Drop the locally persisted reference without touching the server.
pub fn clear_local<B: JobBackend>(tracker: &JobTracker<B>) -> anyhow::Result<()> {
    tracker.clear_local()?;
    println!("Cleared local {} job reference.", tracker.kind());
    Ok(())
}
