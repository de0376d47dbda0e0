//! Integration tests for Cartwheel.
//!
//! The actual tests live in `tests/`:
//! - `cart_sync` - debounced uploads and server-cart hydration
//! - `retry_fetch` - the fixed-delay 429 retry policy on read paths
//! - `order_panel` - staff order workflow against a mock order service
//! - `merch_grid` - durable grid configuration round-trips
//!
//! HTTP behavior is verified against `wiremock` mock servers; the merch
//! router is exercised in-process via `tower::ServiceExt`.

#![cfg_attr(not(test), forbid(unsafe_code))]
