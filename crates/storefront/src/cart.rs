//! Cart state container and the UI-facing cart handle.
//!
//! The session owns the canonical in-memory cart. Mutations are synchronous
//! and atomic with respect to each other - the lock is only held for the
//! duration of the change plus the write-through to the device cache, never
//! across an await point.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use cartwheel_core::{CartSnapshot, CartState, ProductId};

use crate::api::{ApiClient, ApiError};
use crate::local_store::LocalStore;
use crate::sync::SyncClient;

struct CartCell {
    state: CartState,
    /// Monotonic counter bumped on every local state change. Used to discard
    /// remote fetch results that raced a local mutation.
    revision: u64,
}

struct CartInner {
    cell: Mutex<CartCell>,
    store: Box<dyn LocalStore>,
}

/// Authoritative in-memory cart for the current session.
///
/// Cheaply cloneable; clones share the same state. The device cache holds a
/// copy for rehydration, the order service holds the cross-device copy -
/// both may lag this one.
#[derive(Clone)]
pub struct CartSession {
    inner: Arc<CartInner>,
}

impl CartSession {
    /// Create an empty session backed by the given snapshot store.
    #[must_use]
    pub fn new(store: Box<dyn LocalStore>) -> Self {
        Self {
            inner: Arc::new(CartInner {
                cell: Mutex::new(CartCell {
                    state: CartState::new(),
                    revision: 0,
                }),
                store,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CartCell> {
        self.inner.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a local mutation: bump the revision and write through to the
    /// device cache. A cache write failure is logged and swallowed - the
    /// mutation path must never fail the shopping UI.
    fn mutate(&self, apply: impl FnOnce(&mut CartState)) {
        let mut cell = self.lock();
        apply(&mut cell.state);
        cell.revision += 1;
        if let Err(e) = self.inner.store.save(&CartSnapshot::from(&cell.state)) {
            tracing::warn!(error = %e, "Failed to persist cart snapshot");
        }
    }

    /// Increment the quantity of a product, creating it at 1 if absent.
    ///
    /// Always succeeds; unknown product IDs are accepted opaquely.
    pub fn add_item(&self, product: ProductId) {
        self.mutate(|state| state.add(product));
    }

    /// Decrement the quantity of a product, deleting the entry at zero.
    pub fn remove_item(&self, product: &ProductId) {
        self.mutate(|state| state.remove(product));
    }

    /// Remove a product entirely, regardless of quantity.
    pub fn delete_item(&self, product: &ProductId) {
        self.mutate(|state| state.delete(product));
    }

    /// Reset the cart to empty (e.g. after checkout).
    pub fn clear(&self) {
        self.mutate(CartState::clear);
    }

    /// Replace in-memory state from the device cache snapshot, if one exists
    /// and is well-formed. Missing or malformed snapshots leave the state
    /// untouched.
    pub fn hydrate_from_local(&self) {
        let snapshot = match self.inner.store.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read cart snapshot");
                return;
            }
        };

        let mut cell = self.lock();
        cell.state = CartState::from(snapshot);
        cell.revision += 1;
    }

    /// Wholesale-replace the cart with the server's copy.
    ///
    /// `fetched_at` is the revision observed when the fetch was issued; if
    /// any local mutation advanced it meanwhile, the result is discarded and
    /// `false` is returned. The device cache is not written here - it tracks
    /// local mutations only.
    pub fn replace_from_remote(
        &self,
        items: BTreeMap<ProductId, u32>,
        fetched_at: u64,
    ) -> bool {
        let mut cell = self.lock();
        if cell.revision != fetched_at {
            return false;
        }
        cell.state = CartState::from_items(items);
        true
    }

    /// Snapshot of the current cart contents.
    #[must_use]
    pub fn items(&self) -> CartState {
        self.lock().state.clone()
    }

    /// Total number of items in the cart.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.lock().state.total()
    }

    /// Current local revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }
}

/// UI-facing cart handle: synchronous local mutation plus background sync.
///
/// Every mutation applies locally, writes through to the device cache, and
/// schedules a debounced upload. Mutations never block on the network and
/// never surface network failures.
pub struct Cart {
    session: CartSession,
    sync: SyncClient,
}

impl Cart {
    /// Create a cart whose session and sync client share state.
    ///
    /// Must be used within a tokio runtime: mutations spawn the debounce
    /// timer task.
    #[must_use]
    pub fn new(api: ApiClient, store: Box<dyn LocalStore>, debounce_window: Duration) -> Self {
        let session = CartSession::new(store);
        let sync = SyncClient::new(session.clone(), api, debounce_window);
        Self { session, sync }
    }

    /// Add one unit of a product and schedule an upload.
    pub fn add_item(&self, product: ProductId) {
        self.session.add_item(product);
        self.sync.schedule_upload();
    }

    /// Remove one unit of a product and schedule an upload.
    pub fn remove_item(&self, product: &ProductId) {
        self.session.remove_item(product);
        self.sync.schedule_upload();
    }

    /// Delete a product entirely and schedule an upload.
    pub fn delete_item(&self, product: &ProductId) {
        self.session.delete_item(product);
        self.sync.schedule_upload();
    }

    /// Clear the cart and schedule an upload.
    pub fn clear(&self) {
        self.session.clear();
        self.sync.schedule_upload();
    }

    /// Rehydrate from the device cache (call on process start).
    pub fn hydrate_from_local(&self) {
        self.session.hydrate_from_local();
    }

    /// Fetch the server cart and replace local state (call on login).
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`] after the retry policy is exhausted; local
    /// state is left untouched on failure.
    pub async fn refresh_from_remote(&self) -> Result<(), ApiError> {
        self.sync.fetch_remote().await
    }

    /// Snapshot of the current cart contents.
    #[must_use]
    pub fn items(&self) -> CartState {
        self.session.items()
    }

    /// Total number of items in the cart.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.session.total()
    }

    /// The underlying session, shared with the sync client.
    #[must_use]
    pub const fn session(&self) -> &CartSession {
        &self.session
    }

    /// The sync client driving uploads and fetches.
    #[must_use]
    pub const fn sync(&self) -> &SyncClient {
        &self.sync
    }
}
