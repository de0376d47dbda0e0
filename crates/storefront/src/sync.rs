//! Remote sync client: debounced cart uploads and server-cart hydration.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::instrument;

use crate::api::{ApiClient, ApiError};
use crate::cart::CartSession;

struct SyncInner {
    cart: CartSession,
    api: ApiClient,
    window: Duration,
    /// At most one pending quiescence timer. Owned by this instance so
    /// independent sessions never share a timer.
    pending: Mutex<Option<JoinHandle<()>>>,
}

/// Keeps the order service eventually consistent with local cart state.
///
/// Uploads are debounced: each trigger cancels the pending timer and starts
/// a new one, and when the timer fires the *current* cart contents are sent
/// in a single request. Intermediate states are never individually
/// transmitted. Upload failures are logged and dropped - the device cache
/// plus the next debounce cycle is the recovery path.
#[derive(Clone)]
pub struct SyncClient {
    inner: Arc<SyncInner>,
}

impl SyncClient {
    /// Create a sync client for the given session.
    #[must_use]
    pub fn new(cart: CartSession, api: ApiClient, window: Duration) -> Self {
        Self {
            inner: Arc::new(SyncInner {
                cart,
                api,
                window,
                pending: Mutex::new(None),
            }),
        }
    }

    /// Schedule a debounced upload of the complete cart contents.
    ///
    /// Cancels any pending timer and restarts the quiescence window. Must be
    /// called within a tokio runtime.
    pub fn schedule_upload(&self) {
        let inner = Arc::clone(&self.inner);
        let mut pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(timer) = pending.take() {
            timer.abort();
        }

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.window).await;
            // Cancellation only applies to the quiescence timer: once it has
            // fired, the upload runs to completion on its own.
            tokio::spawn(async move {
                let items = inner.cart.items();
                if let Err(e) = inner.api.upload_cart(items.items()).await {
                    tracing::warn!(
                        error = %e,
                        "Cart upload failed; device cache and next change will reconcile"
                    );
                }
            });
        }));
    }

    /// Whether a quiescence timer is currently pending.
    #[must_use]
    pub fn has_pending_upload(&self) -> bool {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Fetch the server's cart and replace local state wholesale.
    ///
    /// The replace is revision-guarded: if a local mutation landed while the
    /// fetch was in flight, the (now stale) result is discarded and the
    /// local state wins.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`] once the read retry policy is exhausted;
    /// local state is left untouched on failure.
    #[instrument(skip(self))]
    pub async fn fetch_remote(&self) -> Result<(), ApiError> {
        let fetched_at = self.inner.cart.revision();
        let items = self.inner.api.fetch_cart().await?;

        if !self.inner.cart.replace_from_remote(items, fetched_at) {
            tracing::debug!("Discarding cart fetch that raced a local mutation");
        }
        Ok(())
    }
}
