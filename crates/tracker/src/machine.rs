//! The poll-driven job state machine.
//!
//! Each successful poll yields a fresh normalized [`JobStatus`];
//! [`advance`] decides whether that snapshot keeps the job active or
//! ends tracking. The server's report is authoritative for every
//! transition except two local rules: a queued job with visible progress
//! is promoted to running, and a cancel-requested report at full
//! progress is treated as completion (some backends stop updating state
//! after their final step, leaving `cancel_requested` as the last word
//! on a job that actually finished).

use doclab_core::{JobState, JobStatus};

/// Result of applying one polled snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// The job is still active; keep polling.
    Progress(JobStatus),
    /// The job reached a terminal state; polling must stop and the
    /// persisted reference must be cleared.
    Terminal(JobStatus),
}

impl Tick {
    pub fn status(&self) -> &JobStatus {
        match self {
            Self::Progress(s) | Self::Terminal(s) => s,
        }
    }
}

/// Apply a freshly polled snapshot on top of the previous one.
///
/// Once a terminal snapshot has been produced no further transition is
/// permitted: a stray late poll result is discarded in favor of the
/// terminal state already observed.
pub fn advance(prev: Option<&JobStatus>, mut next: JobStatus) -> Tick {
    if let Some(prev) = prev {
        if prev.state.is_terminal() {
            return Tick::Terminal(prev.clone());
        }
    }

    // A backend may keep reporting "queued" while already making
    // progress; visible progress is an implicit running signal.
    if next.state == JobState::Queued && next.progress > 0.0 {
        next.state = JobState::Running;
    }

    // Compatibility shim: cancel acknowledged but the job ran to
    // completion first. Synthesize the success the backend never sent.
    if next.state == JobState::CancelRequested && next.progress >= 1.0 {
        next.state = JobState::Succeeded;
        next.message = "finished before cancellation took effect".to_string();
        return Tick::Terminal(next);
    }

    if next.state.is_terminal() {
        Tick::Terminal(next)
    } else {
        Tick::Progress(next)
    }
}
