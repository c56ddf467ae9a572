//! Errors from the job protocol HTTP layer.

use std::path::PathBuf;

/// Errors produced while talking to a backend service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned a non-2xx status other than 404.
    #[error("Backend error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for diagnostics.
        body: String,
    },

    /// The server does not know the requested job id (HTTP 404).
    ///
    /// This is the expected outcome for a stale persisted reference, not
    /// an application failure; callers clean up the reference and move on.
    #[error("Job not known to the server")]
    NotFound,

    /// A submission was accepted but the response carried no job id.
    #[error("Acceptance response is missing a job_id")]
    MissingJobId,

    /// A local file destined for upload could not be read.
    #[error("Failed to read upload file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
