//! Canonical job model for the document-labeling pipeline client.
//!
//! Defines the job kinds the pipeline runs (PDF conversion, AI
//! prelabeling), the canonical status snapshot produced from the
//! heterogeneous payloads the backend services report, and the pure
//! normalization function that maps raw wire payloads into that shape.

pub mod job;
pub mod normalize;
pub mod status;

pub use job::{JobHandle, JobKind};
pub use normalize::{normalize, RawJobStatus, RawProgress};
pub use status::{JobState, JobStatus};
