//! Canonical job states and status snapshots.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a backend job.
///
/// `Done`, `Succeeded`, `Failed` and `Cancelled` are terminal: once one of
/// them is observed no further state change will occur. `Done` and
/// `Succeeded` both mean successful completion: the conversion service
/// reports `done`, the orchestrator reports `SUCCEEDED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running,
    CancelRequested,
    Done,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    /// Parse a server-reported state name, case-insensitively.
    ///
    /// Accepts the vocabulary of both backend services plus common
    /// variants. Returns `None` for names outside that vocabulary; the
    /// normalizer decides the fallback.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" | "pending" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "cancelling" | "cancel_requested" => Some(Self::CancelRequested),
            "done" => Some(Self::Done),
            "succeeded" => Some(Self::Succeeded),
            "failed" | "error" => Some(Self::Failed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether no further state change can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Done | Self::Succeeded | Self::Failed | Self::Cancelled
        )
    }

    /// Whether the job is still queued, running, or winding down.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::CancelRequested => "cancel_requested",
            Self::Done => "done",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable status snapshot for a job.
///
/// Produced fresh on every successful poll; never mutated in place. The
/// `progress` field is always a fraction in `[0, 1]` regardless of how the
/// backend expressed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub state: JobState,
    pub progress: f64,
    pub message: String,
    pub done: Option<u64>,
    pub total: Option<u64>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl JobStatus {
    /// A placeholder snapshot used when polling has not yet produced a
    /// real one (e.g. the first tick failed transiently).
    pub fn waiting() -> Self {
        Self {
            state: JobState::Queued,
            progress: 0.0,
            message: "waiting…".to_string(),
            done: None,
            total: None,
            result: None,
            error: None,
        }
    }
}
