//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::MerchConfig;
use crate::store::{GridStore, StoreError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the durable grid store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MerchConfig,
    store: GridStore,
}

impl AppState {
    /// Create a new application state, opening the grid store at the
    /// configured path.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted grid document exists but cannot be
    /// read or parsed.
    pub fn new(config: MerchConfig) -> Result<Self, StoreError> {
        let store = GridStore::open(&config.data_path)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, store }),
        })
    }

    /// Get a reference to the service configuration.
    #[must_use]
    pub fn config(&self) -> &MerchConfig {
        &self.inner.config
    }

    /// Get a reference to the grid store.
    #[must_use]
    pub fn store(&self) -> &GridStore {
        &self.inner.store
    }
}
