//! Normalization of heterogeneous backend status payloads.
//!
//! The two backend services report status in different shapes: the
//! conversion service writes lowercase state names with fractional
//! progress (`0.0`–`1.0`), the orchestrator writes uppercase state names
//! with percent progress serialized as strings (`"0"`–`"100"`).
//! [`normalize`] maps either into one canonical [`JobStatus`].

use serde::Deserialize;

use crate::status::{JobState, JobStatus};

/// Status payload as reported by `GET /<kind>/status/{job_id}`.
///
/// Every field is optional and unknown fields are ignored, so a payload
/// from either backend deserializes without error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJobStatus {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub progress: Option<RawProgress>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub done: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Progress as it appears on the wire: a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawProgress {
    Number(f64),
    Text(String),
}

/// Map a raw status payload into a canonical [`JobStatus`].
///
/// Pure: the same input always yields the same output.
///
/// Progress handling: absent progress defaults to 0; numeric strings are
/// parsed (a trailing `%` is tolerated); values above 1 are interpreted as
/// percentages; the result is clamped to `[0, 1]`. State names are matched
/// case-insensitively; an unrecognized name degrades to `Queued` (or
/// `Running` when progress indicates the job has started) so a vocabulary
/// drift on the server never stalls the client.
pub fn normalize(raw: &RawJobStatus) -> JobStatus {
    let progress = normalize_progress(raw.progress.as_ref());

    let state = raw
        .state
        .as_deref()
        .and_then(JobState::parse)
        .unwrap_or(if progress > 0.0 {
            JobState::Running
        } else {
            JobState::Queued
        });

    JobStatus {
        state,
        progress,
        message: raw.message.clone().unwrap_or_default(),
        done: raw.done,
        total: raw.total,
        result: raw.result.clone(),
        error: raw.error.clone(),
    }
}

/// Reduce a raw progress value to a fraction in `[0, 1]`.
///
/// Values greater than 1 are treated as percentages.
fn normalize_progress(raw: Option<&RawProgress>) -> f64 {
    let value = match raw {
        None => 0.0,
        Some(RawProgress::Number(n)) => *n,
        Some(RawProgress::Text(s)) => s
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .unwrap_or(0.0),
    };

    if !value.is_finite() {
        return 0.0;
    }

    let fraction = if value > 1.0 { value / 100.0 } else { value };
    fraction.clamp(0.0, 1.0)
}
