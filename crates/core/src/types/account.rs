//! Customer account data: saved addresses and product ratings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A product rating left by the signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: String,
    pub product_id: ProductId,
    /// Star rating, 1-5.
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}
