//! Durable store for the home-page grid sections.
//!
//! The grid configuration is one small JSON document with single-writer
//! admin traffic, so the store keeps a full in-memory snapshot behind an
//! `RwLock` and persists every write before the snapshot updates. Writes go
//! to a temp file and are renamed into place, so a crash mid-write leaves
//! the previous document intact.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use thiserror::Error;

use cartwheel_core::GridSection;

/// Errors from the grid-sections store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The persisted document is not valid grid JSON.
    ///
    /// Unlike the client cart cache, corruption here is surfaced rather than
    /// discarded: the grid is the durable source of truth for the home page.
    #[error("Corrupt grid data at {path}: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },

    /// Sections could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable grid-sections store.
#[derive(Debug)]
pub struct GridStore {
    path: PathBuf,
    sections: RwLock<Vec<GridSection>>,
}

impl GridStore {
    /// Open the store, loading any previously persisted sections.
    ///
    /// A missing file starts the store empty (the never-configured state).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Corrupt` if the file exists but cannot be
    /// parsed, or `StoreError::Io` for other access failures.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let sections = match fs::read(&path) {
            Ok(data) => serde_json::from_slice(&data).map_err(|source| StoreError::Corrupt {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            sections: RwLock::new(sections),
        })
    }

    /// The current sections.
    #[must_use]
    pub fn sections(&self) -> Vec<GridSection> {
        self.sections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the sections, persisting before the in-memory snapshot
    /// updates so readers never observe an unpersisted state.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the new document cannot be written; the
    /// previous sections remain in effect.
    pub fn replace(&self, sections: Vec<GridSection>) -> Result<(), StoreError> {
        self.persist(&sections)?;
        *self
            .sections
            .write()
            .unwrap_or_else(PoisonError::into_inner) = sections;
        Ok(())
    }

    fn persist(&self, sections: &[GridSection]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_vec_pretty(sections)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartwheel_core::ProductId;

    fn sample_sections() -> Vec<GridSection> {
        vec![
            GridSection {
                title: "Deals of the day".to_owned(),
                product_ids: vec![ProductId::new("p1"), ProductId::new("p2")],
            },
            GridSection {
                title: "New arrivals".to_owned(),
                product_ids: vec![ProductId::new("p3")],
            },
        ]
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = GridStore::open(dir.path().join("grid.json")).expect("open");
        assert!(store.sections().is_empty());
    }

    #[test]
    fn test_replace_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("grid.json");

        let store = GridStore::open(&path).expect("open");
        store.replace(sample_sections()).expect("replace");
        drop(store);

        let reopened = GridStore::open(&path).expect("reopen");
        assert_eq!(reopened.sections(), sample_sections());
    }

    #[test]
    fn test_open_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("grid.json");
        fs::write(&path, b"{not json").expect("write");

        let err = GridStore::open(&path).expect_err("should fail");
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_replace_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("grid.json");

        let store = GridStore::open(&path).expect("open");
        store.replace(sample_sections()).expect("replace");

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }
}
