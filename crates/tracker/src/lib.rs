//! Generic lifecycle tracking for long-running backend jobs.
//!
//! A [`JobTracker`] owns one job kind end-to-end: it submits the job,
//! persists the returned id so a restart can pick the job back up,
//! polls status until a terminal state, and relays advisory
//! cancellation. The same component drives both pipeline job kinds
//! (PDF conversion and AI prelabeling); only the injected backend and
//! payload differ.

pub mod cancel;
pub mod events;
pub mod machine;
pub mod tracker;

mod poller;
mod submit;

pub use cancel::CancelOutcome;
pub use events::JobEvent;
pub use tracker::{JobTracker, TrackerConfig, TrackerError};
