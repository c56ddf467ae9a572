//! Job kinds and handles.

use serde::{Deserialize, Serialize};

/// The two long-running operations the pipeline backends run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// PDF-to-HTML conversion of an uploaded document batch.
    Conversion,
    /// AI prelabeling of a labeling project.
    Prelabel,
}

impl JobKind {
    /// URL path segment for this kind (`/<kind>/submit` etc.).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conversion => "conversion",
            Self::Prelabel => "prelabel",
        }
    }

    /// Key of the durable slot holding this kind's active job id.
    ///
    /// At most one job per kind is tracked at a time; absence of the key
    /// means no active job of that kind.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::Conversion => "conversionJobId",
            Self::Prelabel => "prelabelJobId",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a job accepted by a backend service.
///
/// Created on successful submission and immutable afterwards. The `id` is
/// opaque to the client; only the server interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: String,
    pub kind: JobKind,
}

impl JobHandle {
    pub fn new(id: impl Into<String>, kind: JobKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}
