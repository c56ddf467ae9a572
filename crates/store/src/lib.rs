//! Durable storage for active job references.
//!
//! The tracker keeps at most one live job id per [`JobKind`] in a durable
//! key-value slot so that a job submitted before a restart can be picked
//! up again afterwards. The slot is abstracted behind the [`RefStore`]
//! trait so the same tracker logic runs against any host's storage: a
//! JSON file for the CLI, an in-memory map for tests or embedded use.
//!
//! [`JobKind`]: doclab_core::JobKind

pub mod file;
pub mod memory;
pub mod slot;

use std::io;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use slot::JobRefSlot;

/// A string key-value store with durable semantics.
///
/// Implementations must make `put` atomic: after a crash the slot holds
/// either the old value or the new one, never a torn write.
pub trait RefStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Errors from a [`RefStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Store contains invalid data: {0}")]
    Corrupt(#[from] serde_json::Error),
}
