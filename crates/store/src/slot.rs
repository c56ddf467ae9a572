//! Typed facade over the one-slot-per-kind job reference.

use std::sync::Arc;

use doclab_core::{JobHandle, JobKind};

use crate::{RefStore, StoreError};

/// The durable slot holding the active job id for one [`JobKind`].
///
/// Invariant: at most one live id per kind. [`save`](Self::save)
/// overwrites any previous value (a new submission replaces the old job);
/// [`clear`](Self::clear) is issued exactly once per job, either when a
/// terminal status is observed or when the server no longer knows the id.
///
/// Another writer (a second host sharing the store) may clear or replace
/// the slot at any time, so readers must not assume a loaded handle is
/// still current; re-check before acting on it.
#[derive(Clone)]
pub struct JobRefSlot {
    store: Arc<dyn RefStore>,
    kind: JobKind,
}

impl JobRefSlot {
    pub fn new(store: Arc<dyn RefStore>, kind: JobKind) -> Self {
        Self { store, kind }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Read the currently persisted handle, if any.
    pub fn load(&self) -> Result<Option<JobHandle>, StoreError> {
        let id = self.store.get(self.kind.storage_key())?;
        Ok(id.map(|id| JobHandle::new(id, self.kind)))
    }

    /// Persist `handle` as the active job for this kind.
    pub fn save(&self, handle: &JobHandle) -> Result<(), StoreError> {
        self.store.put(self.kind.storage_key(), &handle.id)
    }

    /// Delete the persisted reference. A no-op if nothing is stored.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(self.kind.storage_key())
    }
}

impl std::fmt::Debug for JobRefSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRefSlot").field("kind", &self.kind).finish()
    }
}
