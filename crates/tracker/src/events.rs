//! Events emitted by a [`JobTracker`](crate::JobTracker).

use doclab_core::{JobKind, JobStatus};
use serde::Serialize;

/// A lifecycle event for a tracked job, delivered via the tracker's
/// broadcast channel.
#[derive(Debug, Clone, Serialize)]
pub enum JobEvent {
    /// A new (non-terminal) status snapshot was observed.
    Status {
        kind: JobKind,
        job_id: String,
        status: JobStatus,
    },

    /// The job reached a terminal state; the persisted reference has
    /// been cleared and polling has stopped.
    Finished {
        kind: JobKind,
        job_id: String,
        status: JobStatus,
    },

    /// The server no longer knows the persisted job id. The reference
    /// has been cleared. This is informational, not a failure: the job
    /// most likely finished and was cleaned up while no client was
    /// watching.
    Stale { kind: JobKind, job_id: String },
}
