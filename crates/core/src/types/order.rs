//! Order lifecycle types for the staff order panel.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::account::Address;
use crate::types::id::{OrderId, ProductId};

/// Order lifecycle status.
///
/// The ordering reflects the normal fulfillment progression and is used for
/// display only. Transitions are not restricted: staff can set any status
/// directly, including moving a delivered order back to an earlier state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    OrderPlaced,
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 4] = [
        Self::OrderPlaced,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
    ];

    /// Wire representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrderPlaced => "ORDER_PLACED",
            Self::Processing => "PROCESSING",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error parsing an [`OrderStatus`] from its wire representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid order status: {0}")]
pub struct ParseStatusError(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ORDER_PLACED" => Ok(Self::OrderPlaced),
            "PROCESSING" => Ok(Self::Processing),
            "SHIPPED" => Ok(Self::Shipped),
            "DELIVERED" => Ok(Self::Delivered),
            other => Err(ParseStatusError(other.to_owned())),
        }
    }
}

/// Shipment tracking details.
///
/// The three fields are recorded together as a unit when staff registers a
/// shipment; an order either has all of them or none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInfo {
    pub tracking_id: String,
    pub courier: String,
    pub tracking_url: Option<String>,
}

/// The party an order belongs to.
///
/// Guest and linked-account orders carry disjoint contact fields; modeling
/// them as an enum makes exactly one set meaningful at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Customer {
    /// Checkout without an account; contact details captured on the order.
    Guest {
        name: String,
        email: String,
        phone: Option<String>,
    },
    /// Order placed by a signed-in customer.
    Account { name: String, email: String },
}

impl Customer {
    /// Display name for the panel.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Guest { name, .. } | Self::Account { name, .. } => name,
        }
    }

    /// Contact email address.
    #[must_use]
    pub fn email(&self) -> &str {
        match self {
            Self::Guest { email, .. } | Self::Account { email, .. } => email,
        }
    }

    /// Whether this is a guest order.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest { .. })
    }
}

/// A coupon applied to an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    /// Percentage discount.
    pub discount: Decimal,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Absent when the product was deleted after purchase.
    pub product_id: Option<ProductId>,
    pub name: String,
    pub quantity: u32,
    /// Unit price at the time of purchase.
    pub price: Decimal,
}

/// A store order as shown in the staff panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total: Decimal,
    pub payment_method: String,
    pub is_paid: bool,
    pub coupon: Option<Coupon>,
    pub tracking: Option<TrackingInfo>,
    pub customer: Customer,
    pub address: Option<Address>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::OrderPlaced).expect("serialize");
        assert_eq!(json, "\"ORDER_PLACED\"");

        let status: OrderStatus = serde_json::from_str("\"SHIPPED\"").expect("deserialize");
        assert_eq!(status, OrderStatus::Shipped);
    }

    #[test]
    fn test_status_display_and_parse_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed = OrderStatus::from_str(&status.to_string()).expect("parse");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_parse_rejects_unknown() {
        let err = OrderStatus::from_str("CANCELLED").expect_err("should reject");
        assert_eq!(err, ParseStatusError("CANCELLED".to_owned()));
    }

    #[test]
    fn test_status_display_order() {
        assert!(OrderStatus::OrderPlaced < OrderStatus::Processing);
        assert!(OrderStatus::Processing < OrderStatus::Shipped);
        assert!(OrderStatus::Shipped < OrderStatus::Delivered);
    }

    #[test]
    fn test_customer_accessors() {
        let guest = Customer::Guest {
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: None,
        };
        assert!(guest.is_guest());
        assert_eq!(guest.name(), "Ada");

        let account = Customer::Account {
            name: "Grace".to_owned(),
            email: "grace@example.com".to_owned(),
        };
        assert!(!account.is_guest());
        assert_eq!(account.email(), "grace@example.com");
    }
}
