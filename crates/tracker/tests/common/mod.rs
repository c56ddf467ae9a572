//! Shared test fixtures: a scripted in-process job backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use doclab_client::{ApiError, CancelReply, JobBackend, SubmitAccepted};
use doclab_core::{JobKind, RawJobStatus};
use doclab_store::{MemoryStore, RefStore};
use doclab_tracker::{JobEvent, JobTracker, TrackerConfig};
use tokio::sync::broadcast;

/// One scripted answer to a status poll.
pub enum StatusStep {
    /// 200 with the given JSON payload.
    Payload(serde_json::Value),
    /// 404: the server does not know the job.
    NotFound,
    /// A transient failure (network or 5xx).
    Outage,
}

/// One scripted answer to a cancel call.
pub enum CancelStep {
    Reply {
        status: &'static str,
        state: Option<&'static str>,
    },
    NotFound,
    Outage,
}

/// A [`JobBackend`] that replays scripted responses and counts calls.
pub struct ScriptedBackend {
    kind: JobKind,
    accept_id: String,
    statuses: Mutex<VecDeque<StatusStep>>,
    cancels: Mutex<VecDeque<CancelStep>>,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub cancel_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(kind: JobKind, accept_id: &str) -> Self {
        Self {
            kind,
            accept_id: accept_id.to_string(),
            statuses: Mutex::new(VecDeque::new()),
            cancels: Mutex::new(VecDeque::new()),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_statuses(self, steps: impl IntoIterator<Item = StatusStep>) -> Self {
        self.statuses.lock().unwrap().extend(steps);
        self
    }

    pub fn with_cancels(self, steps: impl IntoIterator<Item = CancelStep>) -> Self {
        self.cancels.lock().unwrap().extend(steps);
        self
    }

    pub fn status_count(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn submit_count(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobBackend for ScriptedBackend {
    type Payload = ();

    fn kind(&self) -> JobKind {
        self.kind
    }

    async fn submit(&self, _payload: &Self::Payload) -> Result<SubmitAccepted, ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(SubmitAccepted {
            job_id: self.accept_id.clone(),
            message: Some("accepted".to_string()),
        })
    }

    async fn status(&self, _job_id: &str) -> Result<RawJobStatus, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.statuses.lock().unwrap().pop_front();
        match step {
            Some(StatusStep::Payload(json)) => {
                Ok(serde_json::from_value(json).expect("invalid scripted status"))
            }
            Some(StatusStep::NotFound) => Err(ApiError::NotFound),
            // An exhausted script behaves like an unreachable server so a
            // looping poller cannot panic the test harness.
            Some(StatusStep::Outage) | None => Err(ApiError::Status {
                status: 503,
                body: "scripted outage".to_string(),
            }),
        }
    }

    async fn cancel(&self, _job_id: &str) -> Result<CancelReply, ApiError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        let step = self.cancels.lock().unwrap().pop_front();
        match step {
            Some(CancelStep::Reply { status, state }) => Ok(CancelReply {
                status: status.to_string(),
                state: state.map(str::to_string),
            }),
            Some(CancelStep::NotFound) => Err(ApiError::NotFound),
            Some(CancelStep::Outage) | None => Err(ApiError::Status {
                status: 502,
                body: "scripted outage".to_string(),
            }),
        }
    }
}

/// A tracker wired to a scripted backend and an in-memory store, with a
/// short poll interval so tests run in milliseconds.
pub struct Fixture {
    pub backend: Arc<ScriptedBackend>,
    pub store: Arc<MemoryStore>,
    pub tracker: JobTracker<ScriptedBackend>,
}

pub fn fixture(backend: ScriptedBackend) -> Fixture {
    let backend = Arc::new(backend);
    let store = Arc::new(MemoryStore::new());
    let tracker = JobTracker::new(
        Arc::clone(&backend),
        Arc::clone(&store) as Arc<dyn RefStore>,
        TrackerConfig {
            poll_interval: Duration::from_millis(10),
        },
    );
    Fixture {
        backend,
        store,
        tracker,
    }
}

pub fn running(progress: f64) -> StatusStep {
    StatusStep::Payload(serde_json::json!({"state": "running", "progress": progress}))
}

pub fn payload(json: serde_json::Value) -> StatusStep {
    StatusStep::Payload(json)
}

/// Receive the next event, failing the test after a generous timeout.
pub async fn next_event(rx: &mut broadcast::Receiver<JobEvent>) -> JobEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a job event")
        .expect("event channel closed")
}

/// Skip past `Status` events until something else arrives.
pub async fn next_non_status_event(rx: &mut broadcast::Receiver<JobEvent>) -> JobEvent {
    loop {
        match next_event(rx).await {
            JobEvent::Status { .. } => continue,
            other => return other,
        }
    }
}
