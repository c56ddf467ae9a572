//! The composition root owning one job kind's lifecycle.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use doclab_client::{ApiError, JobBackend};
use doclab_core::{JobHandle, JobKind, JobStatus};
use doclab_store::{JobRefSlot, RefStore, StoreError};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::cancel::{self, CancelOutcome};
use crate::events::JobEvent;
use crate::poller::{self, PollContext};
use crate::submit;

/// Broadcast channel capacity for job events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Tunable parameters for a [`JobTracker`].
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Delay between the end of one status request and the start of the
    /// next.
    pub poll_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1500),
        }
    }
}

/// Tracks at most one job of one kind end-to-end.
///
/// Created per job kind with an injected backend and reference store.
/// Call [`resume`](Self::resume) once after construction to pick up a
/// job persisted by a previous run, then [`submit`](Self::submit) to
/// start new work. Status flows to subscribers as [`JobEvent`]s; the
/// latest snapshot is always available via
/// [`current_status`](Self::current_status).
pub struct JobTracker<B: JobBackend> {
    backend: Arc<B>,
    slot: JobRefSlot,
    config: TrackerConfig,
    current: Arc<RwLock<Option<JobStatus>>>,
    event_tx: broadcast::Sender<JobEvent>,
    poll_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
    /// Cancelled when the tracker shuts down; poll loops get child
    /// tokens.
    shutdown: CancellationToken,
}

impl<B: JobBackend> JobTracker<B> {
    pub fn new(backend: Arc<B>, store: Arc<dyn RefStore>, config: TrackerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let slot = JobRefSlot::new(store, backend.kind());

        Self {
            backend,
            slot,
            config,
            current: Arc::new(RwLock::new(None)),
            event_tx,
            poll_task: Mutex::new(None),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn kind(&self) -> JobKind {
        self.backend.kind()
    }

    /// Subscribe to lifecycle events for this tracker's job kind.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.event_tx.subscribe()
    }

    /// The most recent status snapshot, if any has been observed.
    pub fn current_status(&self) -> Option<JobStatus> {
        poller::read_current(&self.current)
    }

    /// The persisted handle of the active job, if one exists.
    pub fn active_job(&self) -> Result<Option<JobHandle>, TrackerError> {
        Ok(self.slot.load()?)
    }

    /// Pick up a job persisted by a previous run.
    ///
    /// If the slot holds an id, polling starts immediately without any
    /// re-submission and the handle is returned. Must be called from
    /// within a Tokio runtime.
    pub fn resume(&self) -> Result<Option<JobHandle>, TrackerError> {
        let Some(handle) = self.slot.load()? else {
            return Ok(None);
        };
        tracing::info!(
            kind = %handle.kind,
            job_id = %handle.id,
            "Resuming tracking of persisted job",
        );
        self.spawn_poller(handle.clone());
        Ok(Some(handle))
    }

    /// Submit a new job and start tracking it.
    ///
    /// Rejected without issuing any request while a job of this kind is
    /// already tracked: at most one live job per kind.
    pub async fn submit(&self, payload: &B::Payload) -> Result<JobHandle, TrackerError> {
        if let Some(existing) = self.slot.load()? {
            return Err(TrackerError::AlreadyActive {
                kind: existing.kind,
                job_id: existing.id,
            });
        }

        let handle = submit::submit_job(self.backend.as_ref(), &self.slot, payload).await?;
        poller::set_current(&self.current, None);
        self.spawn_poller(handle.clone());
        Ok(handle)
    }

    /// Request cancellation of the tracked job.
    ///
    /// Advisory: the poller keeps running and the next poll carries the
    /// authoritative outcome. A 404 means the server already forgot the
    /// job; the stale reference is cleaned up exactly as the poller
    /// would, and `Unknown` is returned.
    pub async fn cancel(&self) -> Result<CancelOutcome, TrackerError> {
        let Some(handle) = self.slot.load()? else {
            return Err(TrackerError::NoActiveJob { kind: self.kind() });
        };

        let (outcome, stale) = cancel::request_cancel(self.backend.as_ref(), &handle)
            .await
            .map_err(TrackerError::Cancel)?;

        if stale {
            poller::stale_cleanup(&self.slot, &self.current, &self.event_tx, &handle);
        }
        Ok(outcome)
    }

    /// Drop the persisted reference and cached status without touching
    /// the server. The poll loop notices the cleared slot on its next
    /// tick and stops.
    pub fn clear_local(&self) -> Result<(), TrackerError> {
        self.slot.clear()?;
        poller::set_current(&self.current, None);
        tracing::info!(kind = %self.kind(), "Cleared local job reference");
        Ok(())
    }

    /// Stop the poll task cooperatively. An in-flight status request is
    /// never aborted; the loop exits at its next suspension point.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let task = self
            .poll_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    fn spawn_poller(&self, handle: JobHandle) {
        let ctx = PollContext {
            slot: self.slot.clone(),
            interval: self.config.poll_interval,
            current: Arc::clone(&self.current),
            events: self.event_tx.clone(),
            shutdown: self.shutdown.child_token(),
        };
        let backend = Arc::clone(&self.backend);
        let task = tokio::spawn(async move {
            poller::run(backend, ctx, handle).await;
        });

        let previous = self
            .poll_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            // A finished loop's handle; the at-most-one-job invariant
            // means no live loop can still be running here.
            previous.abort();
        }
    }
}

/// Errors surfaced by a [`JobTracker`].
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// A job of this kind is already tracked; finish or cancel it first.
    #[error("A {kind} job is already active (id {job_id})")]
    AlreadyActive { kind: JobKind, job_id: String },

    /// No job of this kind is currently tracked.
    #[error("No active {kind} job")]
    NoActiveJob { kind: JobKind },

    /// Submission or status I/O failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The cancel call failed; the job keeps running and remains
    /// tracked.
    #[error("Cancel request failed: {0}")]
    Cancel(ApiError),

    /// The reference store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
