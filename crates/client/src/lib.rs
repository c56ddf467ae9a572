//! HTTP bindings for the document-labeling pipeline's job protocol.
//!
//! Both backend services expose the same job lifecycle over HTTP:
//! submit a job, poll its status by id, request cancellation. The
//! [`JobBackend`] trait captures that contract; [`ConversionBackend`]
//! and [`PrelabelBackend`] bind it to the two real services, differing
//! only in their submission payloads (multipart PDF upload vs. JSON).

pub mod backend;
pub mod conversion;
pub mod error;
pub mod prelabel;

mod http;

pub use backend::{CancelReply, JobBackend, SubmitAccepted};
pub use conversion::{ConversionBackend, ConversionRequest};
pub use error::ApiError;
pub use http::JobEndpoints;
pub use prelabel::{PrelabelBackend, PrelabelRequest};
