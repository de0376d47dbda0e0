//! Cartwheel Storefront - client-side cart and order panel library.
//!
//! # Architecture
//!
//! - The [`cart::CartSession`] owns the authoritative in-memory cart for the
//!   session. Mutations are synchronous and write through to a durable
//!   [`local_store::LocalStore`] snapshot on every change.
//! - The [`sync::SyncClient`] keeps the order service eventually consistent
//!   with local state: uploads are debounced and fire-and-forget, fetches go
//!   through a fixed-delay retry policy and replace local state wholesale
//!   unless a local mutation raced the fetch.
//! - The [`api::ApiClient`] is the authenticated JSON client for the order
//!   service. Identity (token issuance), payment, and storage all live on
//!   the other side of that HTTP boundary.
//! - The [`orders::OrderPanel`] is the staff-facing order workflow: status
//!   transitions, shipment tracking, and deletion, with the local list only
//!   ever updated from a confirmed re-fetch.
//!
//! # Example
//!
//! ```rust,ignore
//! use cartwheel_storefront::api::ApiClient;
//! use cartwheel_storefront::cart::Cart;
//! use cartwheel_storefront::config::StorefrontConfig;
//! use cartwheel_storefront::local_store::FileStore;
//!
//! let config = StorefrontConfig::from_env()?;
//! let api = ApiClient::new(&config)?;
//! let store = FileStore::new(&config.cart_cache_path);
//! let cart = Cart::new(api.clone(), Box::new(store), config.debounce_window);
//!
//! cart.hydrate_from_local();
//! cart.refresh_from_remote().await?;
//! cart.add_item("prod_123".into());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod local_store;
pub mod orders;
pub mod sync;
