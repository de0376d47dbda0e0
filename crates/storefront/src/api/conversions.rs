//! Wire-to-domain conversions for order-service payloads.
//!
//! The order service returns orders as one flat JSON object: guest contact
//! fields, linked-account fields, and the tracking triple all live side by
//! side. Conversion normalizes that into the domain model, where the
//! customer variants are disjoint and tracking is a single optional unit.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use cartwheel_core::{
    Address, Coupon, Customer, Order, OrderId, OrderItem, OrderStatus, ProductId, TrackingInfo,
};

/// Flat order payload as returned by `GET /api/store/orders`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderWire {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    pub total: Decimal,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_coupon_used: bool,
    #[serde(default)]
    pub coupon: Option<Coupon>,
    #[serde(default)]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub courier: Option<String>,
    #[serde(default)]
    pub tracking_url: Option<String>,
    #[serde(default)]
    pub is_guest: bool,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub guest_email: Option<String>,
    #[serde(default)]
    pub guest_phone: Option<String>,
    #[serde(default)]
    pub user: Option<UserWire>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub order_items: Vec<OrderItemWire>,
    pub created_at: DateTime<Utc>,
}

/// Linked-account summary embedded in an order.
#[derive(Debug, Deserialize)]
pub(crate) struct UserWire {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One order line on the wire; the product summary may be absent for
/// products deleted after purchase.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderItemWire {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub product: Option<ProductSummaryWire>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductSummaryWire {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<OrderWire> for Order {
    fn from(wire: OrderWire) -> Self {
        let customer = if wire.is_guest {
            Customer::Guest {
                name: wire.guest_name.unwrap_or_default(),
                email: wire.guest_email.unwrap_or_default(),
                phone: wire.guest_phone,
            }
        } else {
            Customer::Account {
                name: wire
                    .user
                    .as_ref()
                    .and_then(|user| user.name.clone())
                    .unwrap_or_default(),
                email: wire
                    .user
                    .and_then(|user| user.email)
                    .unwrap_or_default(),
            }
        };

        // Tracking fields are only meaningful as a complete unit.
        let tracking = match (wire.tracking_id, wire.courier) {
            (Some(tracking_id), Some(courier))
                if !tracking_id.is_empty() && !courier.is_empty() =>
            {
                Some(TrackingInfo {
                    tracking_id,
                    courier,
                    tracking_url: wire.tracking_url.filter(|url| !url.is_empty()),
                })
            }
            _ => None,
        };

        let coupon = if wire.is_coupon_used { wire.coupon } else { None };

        Self {
            id: wire.id,
            status: wire.status,
            total: wire.total,
            payment_method: wire.payment_method,
            is_paid: wire.is_paid,
            coupon,
            tracking,
            customer,
            address: wire.address,
            items: wire.order_items.into_iter().map(OrderItem::from).collect(),
            created_at: wire.created_at,
        }
    }
}

impl From<OrderItemWire> for OrderItem {
    fn from(wire: OrderItemWire) -> Self {
        let (summary_id, name) = wire
            .product
            .map_or((None, None), |product| (product.id, product.name));

        Self {
            product_id: wire.product_id.or(summary_id),
            name: name.unwrap_or_default(),
            quantity: wire.quantity,
            price: wire.price,
        }
    }
}
