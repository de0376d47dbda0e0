//! Authenticated JSON client for the order-service HTTP API.
//!
//! # Architecture
//!
//! - All requests carry the identity provider's bearer token
//! - Read endpoints go through the fixed-delay [`RetryPolicy`]; the cart
//!   upload and the staff order mutations do not
//! - Product lists are cached via `moka` (5-minute TTL); the cart is never
//!   cached (mutable state)
//! - The order service is the source of truth across devices; this client
//!   treats its storage, payment, and notification behavior as opaque

mod conversions;
pub mod retry;

pub use retry::RetryPolicy;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use cartwheel_core::{Address, Order, OrderId, OrderStatus, Product, ProductId, Rating};

use crate::config::StorefrontConfig;
use crate::orders::TrackingUpdate;
use conversions::OrderWire;

/// Errors that can occur when talking to the order service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication rejected. Never retried; the caller is expected to
    /// prompt re-authentication.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited after exhausting the retry budget.
    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Any other non-success response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Input rejected before any request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Base URL could not be combined with an endpoint path.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

// =============================================================================
// Response Envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
struct CartEnvelope {
    #[serde(default)]
    cart: BTreeMap<ProductId, u32>,
}

#[derive(Debug, Deserialize)]
struct AddressesEnvelope {
    #[serde(default)]
    addresses: Vec<Address>,
}

#[derive(Debug, Deserialize)]
struct RatingsEnvelope {
    #[serde(default)]
    ratings: Vec<Rating>,
}

#[derive(Debug, Deserialize)]
struct ProductsEnvelope {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct OrdersEnvelope {
    #[serde(default)]
    orders: Vec<OrderWire>,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the order-service HTTP API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    access_token: SecretString,
    retry: RetryPolicy,
    products: Cache<String, Arc<Vec<Product>>>,
}

impl ApiClient {
    /// Create a client from the storefront configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// is invalid.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        Self::with_base_url(
            &config.api_base_url,
            config.access_token.clone(),
            config.retry,
        )
    }

    /// Create a client with an explicit base URL (for tests against a mock
    /// server).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or `base_url` is
    /// not a valid URL.
    pub fn with_base_url(
        base_url: &str,
        access_token: SecretString,
        retry: RetryPolicy,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // join() appends to the path rather than replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)?;

        let products = Cache::builder()
            .max_capacity(100)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                access_token,
                retry,
                products,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    fn bearer(&self) -> &str {
        self.inner.access_token.expose_secret()
    }

    /// GET through the retry policy, returning the response once its status
    /// has been checked.
    async fn get_with_retry(&self, url: Url) -> Result<reqwest::Response, ApiError> {
        let response = retry::send_with_retry(self.inner.retry, || {
            self.inner
                .client
                .get(url.clone())
                .bearer_auth(self.bearer())
                .send()
        })
        .await?;
        self.check_status(response).await
    }

    /// Map non-success statuses into the error taxonomy.
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(response.url().path().to_owned())),
            StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited {
                attempts: self.inner.retry.attempts,
            }),
            _ => {
                let message = response.text().await.unwrap_or_default();
                Err(ApiError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// Read the body as text first for better diagnostics on shape mismatch.
    async fn parse_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(200).collect::<String>(),
                "Failed to parse order-service response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Cart Methods (not cached - mutable state)
    // =========================================================================

    /// Fetch the server's cart snapshot. Retry-wrapped.
    ///
    /// # Errors
    ///
    /// Returns an error once the retry policy is exhausted or on any
    /// non-429 failure.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> Result<BTreeMap<ProductId, u32>, ApiError> {
        let url = self.endpoint("api/cart")?;
        let response = self.get_with_retry(url).await?;
        let envelope: CartEnvelope = Self::parse_json(response).await?;
        Ok(envelope.cart)
    }

    /// Upload the complete cart contents.
    ///
    /// This is the fire-and-forget write path: it is never retried and never
    /// goes through the read retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error on any non-success response; the caller decides
    /// whether to surface or drop it.
    #[instrument(skip(self, items), fields(distinct = items.len()))]
    pub async fn upload_cart(&self, items: &BTreeMap<ProductId, u32>) -> Result<(), ApiError> {
        let url = self.endpoint("api/cart")?;
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.bearer())
            .json(&serde_json::json!({ "cart": items }))
            .send()
            .await?;
        self.check_status(response).await?;
        Ok(())
    }

    // =========================================================================
    // Account Read Methods
    // =========================================================================

    /// Fetch the customer's saved addresses. Retry-wrapped.
    ///
    /// # Errors
    ///
    /// Returns an error once the retry policy is exhausted or on any
    /// non-429 failure.
    #[instrument(skip(self))]
    pub async fn fetch_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let url = self.endpoint("api/address")?;
        let response = self.get_with_retry(url).await?;
        let envelope: AddressesEnvelope = Self::parse_json(response).await?;
        Ok(envelope.addresses)
    }

    /// Fetch the customer's product ratings. Retry-wrapped.
    ///
    /// # Errors
    ///
    /// Returns an error once the retry policy is exhausted or on any
    /// non-429 failure.
    #[instrument(skip(self))]
    pub async fn fetch_ratings(&self) -> Result<Vec<Rating>, ApiError> {
        let url = self.endpoint("api/rating")?;
        let response = self.get_with_retry(url).await?;
        let envelope: RatingsEnvelope = Self::parse_json(response).await?;
        Ok(envelope.ratings)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Fetch the product catalog, optionally scoped to one store.
    /// Retry-wrapped and cached for 5 minutes per scope.
    ///
    /// # Errors
    ///
    /// Returns an error once the retry policy is exhausted or on any
    /// non-429 failure.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self, store_id: Option<&str>) -> Result<Vec<Product>, ApiError> {
        let cache_key = store_id.unwrap_or_default().to_owned();

        if let Some(products) = self.inner.products.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products.as_ref().clone());
        }

        let mut url = self.endpoint("api/products")?;
        if let Some(id) = store_id {
            url.query_pairs_mut().append_pair("storeId", id);
        }

        let response = self.get_with_retry(url).await?;
        let envelope: ProductsEnvelope = Self::parse_json(response).await?;

        self.inner
            .products
            .insert(cache_key, Arc::new(envelope.products.clone()))
            .await;

        Ok(envelope.products)
    }

    /// Drop all cached product lists.
    pub fn invalidate_products(&self) {
        self.inner.products.invalidate_all();
    }

    // =========================================================================
    // Staff Order Methods (admin-scoped; never retry-wrapped)
    // =========================================================================

    /// List the store's orders.
    ///
    /// # Errors
    ///
    /// Returns an error on any non-success response.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint("api/store/orders")?;
        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(self.bearer())
            .send()
            .await?;
        let response = self.check_status(response).await?;
        let envelope: OrdersEnvelope = Self::parse_json(response).await?;
        Ok(envelope.orders.into_iter().map(Order::from).collect())
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns an error on any non-success response (e.g. `NotFound` for an
    /// unknown order).
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("api/store/orders/{order_id}"))?;
        let response = self
            .inner
            .client
            .put(url)
            .bearer_auth(self.bearer())
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await?;
        self.check_status(response).await?;
        Ok(())
    }

    /// Persist shipment tracking details as a unit.
    ///
    /// The order service notifies the customer as a side effect.
    ///
    /// # Errors
    ///
    /// Returns an error on any non-success response.
    #[instrument(skip(self, update), fields(order_id = %update.order_id))]
    pub async fn update_order_tracking(&self, update: &TrackingUpdate) -> Result<(), ApiError> {
        let url = self.endpoint("api/store/orders/update-tracking")?;
        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.bearer())
            .json(update)
            .send()
            .await?;
        self.check_status(response).await?;
        Ok(())
    }

    /// Delete an order permanently. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns an error on any non-success response.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: &OrderId) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("api/store/orders/{order_id}"))?;
        let response = self
            .inner
            .client
            .delete(url)
            .bearer_auth(self.bearer())
            .send()
            .await?;
        self.check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> ApiClient {
        ApiClient::with_base_url(
            base_url,
            SecretString::from("tok_test"),
            RetryPolicy::default(),
        )
        .expect("client construction should not fail")
    }

    #[test]
    fn test_endpoint_joins_against_base_path() {
        let client = test_client("https://shop.test");
        let url = client.endpoint("api/cart").expect("join");
        assert_eq!(url.as_str(), "https://shop.test/api/cart");
    }

    #[test]
    fn test_endpoint_tolerates_trailing_and_leading_slashes() {
        let client = test_client("https://shop.test/v1/");
        let url = client.endpoint("/api/cart").expect("join");
        assert_eq!(url.as_str(), "https://shop.test/v1/api/cart");
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("/api/store/orders/ord_1".to_string());
        assert_eq!(err.to_string(), "Not found: /api/store/orders/ord_1");

        let err = ApiError::RateLimited { attempts: 3 };
        assert_eq!(err.to_string(), "Rate limited after 3 attempts");
    }
}
