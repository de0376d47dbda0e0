//! Durable device cache for the last-known cart snapshot.
//!
//! The store holds a copy for rehydration across reloads - it is never
//! authoritative. Writes are last-writer-wins with no versioning; the cart
//! is a single-device, single-session concern.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

use cartwheel_core::CartSnapshot;

/// Errors from the local snapshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Snapshot could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key-value contract for the persisted cart snapshot.
pub trait LocalStore: Send + Sync {
    /// Load the persisted snapshot, if any.
    ///
    /// A malformed snapshot is treated as absent: rehydration must never
    /// fail the mutation path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` only for access failures other than the
    /// snapshot not existing.
    fn load(&self) -> Result<Option<CartSnapshot>, StoreError>;

    /// Persist a snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the snapshot cannot be written.
    fn save(&self, snapshot: &CartSnapshot) -> Result<(), StoreError>;
}

/// File-backed store: one JSON document at a fixed path.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store backed by the given file path.
    ///
    /// The file and its parent directories are created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LocalStore for FileStore {
    fn load(&self) -> Result<Option<CartSnapshot>, StoreError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&data) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Discarding malformed cart snapshot"
                );
                Ok(None)
            }
        }
    }

    fn save(&self, snapshot: &CartSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec(snapshot)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<CartSnapshot>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently held snapshot, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<CartSnapshot> {
        self.snapshot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl LocalStore for MemoryStore {
    fn load(&self) -> Result<Option<CartSnapshot>, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, snapshot: &CartSnapshot) -> Result<(), StoreError> {
        *self
            .snapshot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(snapshot.clone());
        Ok(())
    }
}
