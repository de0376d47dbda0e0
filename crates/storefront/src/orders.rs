//! Staff order panel: list, status transitions, tracking, deletion.
//!
//! The panel keeps a local copy of the order list for display. Mutations are
//! never applied to it optimistically - the list only changes when a
//! confirmed re-fetch succeeds, so a rejected action can never leave a stale
//! state on screen.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::instrument;

use cartwheel_core::{Order, OrderId, OrderStatus};

use crate::api::{ApiClient, ApiError};

/// Shipment tracking input, persisted as a unit.
///
/// Serializes to the `update-tracking` request body:
/// `{ "orderId", "trackingId", "trackingUrl", "courier" }`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdate {
    pub order_id: OrderId,
    pub tracking_id: String,
    pub courier: String,
    pub tracking_url: Option<String>,
}

impl TrackingUpdate {
    /// Validate the non-empty preconditions on `tracking_id` and `courier`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] when either required field is
    /// empty or whitespace.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.tracking_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("trackingId is required".to_owned()));
        }
        if self.courier.trim().is_empty() {
            return Err(ApiError::InvalidInput("courier is required".to_owned()));
        }
        Ok(())
    }
}

/// Staff-facing order workflow client.
///
/// Statuses form a flat enumeration with no transition guard: any status is
/// directly settable, including moving a delivered order back - an
/// administrative override capability, not a state machine.
pub struct OrderPanel {
    api: ApiClient,
    orders: Mutex<Vec<Order>>,
}

impl OrderPanel {
    /// Create a panel over the given API client with an empty local list.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            orders: Mutex::new(Vec::new()),
        }
    }

    /// Re-fetch the order list from the service, replacing the local copy.
    ///
    /// # Errors
    ///
    /// Propagates [`ApiError`]; the local copy is untouched on failure.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let orders = self.api.list_orders().await?;
        *self
            .orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = orders;
        Ok(())
    }

    /// The current local copy of the order list.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Set an order's status and re-fetch the list on success.
    ///
    /// # Errors
    ///
    /// Propagates remote rejection (e.g. [`ApiError::NotFound`]); the local
    /// list is left untouched so a failed update is never displayed.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        self.api.update_order_status(order_id, status).await?;
        tracing::info!(order_id = %order_id, status = %status, "Order status updated");
        self.refresh().await
    }

    /// Record shipment tracking and re-fetch the list on success.
    ///
    /// The order service notifies the customer as a side effect of a
    /// successful update.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] before any request when the
    /// required fields are empty; otherwise propagates remote rejection.
    #[instrument(skip(self, update), fields(order_id = %update.order_id))]
    pub async fn record_tracking(&self, update: TrackingUpdate) -> Result<(), ApiError> {
        update.validate()?;
        self.api.update_order_tracking(&update).await?;
        tracing::info!(order_id = %update.order_id, courier = %update.courier, "Tracking recorded");
        self.refresh().await
    }

    /// Delete an order permanently and re-fetch the list on success.
    /// Irreversible.
    ///
    /// # Errors
    ///
    /// Propagates remote rejection; the local list is left untouched.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: &OrderId) -> Result<(), ApiError> {
        self.api.delete_order(order_id).await?;
        tracing::info!(order_id = %order_id, "Order deleted");
        self.refresh().await
    }
}
