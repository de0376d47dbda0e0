//! Shared domain types.
//!
//! - [`cart`] - Session cart contents and the persisted snapshot shape
//! - [`order`] - Order lifecycle status, tracking, and the staff panel view
//! - [`catalog`] - Products, image references, and home-grid sections
//! - [`account`] - Customer addresses and ratings
//! - [`id`] - Newtype IDs for type-safe entity references

pub mod account;
pub mod cart;
pub mod catalog;
pub mod id;
pub mod order;

pub use account::{Address, Rating};
pub use cart::{CartSnapshot, CartState};
pub use catalog::{GridSection, ImageRef, Product};
pub use id::{OrderId, ProductId};
pub use order::{
    Coupon, Customer, Order, OrderItem, OrderStatus, ParseStatusError, TrackingInfo,
};
