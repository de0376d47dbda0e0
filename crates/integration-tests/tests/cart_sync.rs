//! Integration tests for the cart sync flow using wiremock HTTP mocks.

use std::time::Duration;

use secrecy::SecretString;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cartwheel_core::ProductId;
use cartwheel_storefront::api::{ApiClient, RetryPolicy};
use cartwheel_storefront::cart::{Cart, CartSession};
use cartwheel_storefront::local_store::MemoryStore;
use cartwheel_storefront::sync::SyncClient;

/// Short quiescence window so tests run in milliseconds.
const WINDOW: Duration = Duration::from_millis(100);

fn test_api(base_url: &str) -> ApiClient {
    ApiClient::with_base_url(
        base_url,
        SecretString::from("tok_test"),
        RetryPolicy {
            attempts: 3,
            delay: Duration::from_millis(50),
        },
    )
    .expect("client construction should not fail")
}

fn test_session() -> CartSession {
    CartSession::new(Box::new(MemoryStore::new()))
}

fn pid(s: &str) -> ProductId {
    ProductId::new(s)
}

/// Poll until the mock server has seen at least `count` requests.
async fn wait_for_requests(server: &MockServer, count: usize) {
    for _ in 0..200 {
        if server.received_requests().await.unwrap_or_default().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn debounced_uploads_coalesce_into_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cart"))
        .and(header("Authorization", "Bearer tok_test"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let session = test_session();
    let sync = SyncClient::new(session.clone(), test_api(&server.uri()), WINDOW);

    // Two rapid triggers within one window: only the second survives.
    session.add_item(pid("p1"));
    sync.schedule_upload();
    session.add_item(pid("p1"));
    sync.schedule_upload();

    wait_for_requests(&server, 1).await;
    // Let any (incorrect) second upload land before counting.
    tokio::time::sleep(WINDOW * 3).await;

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1, "triggers must coalesce into one upload");

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert_eq!(
        body,
        serde_json::json!({"cart": {"p1": 2}}),
        "payload must be the state at the second trigger"
    );
}

#[tokio::test]
async fn upload_carries_current_state_at_fire_time() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let session = test_session();
    let sync = SyncClient::new(session.clone(), test_api(&server.uri()), WINDOW);

    session.add_item(pid("p1"));
    sync.schedule_upload();
    // Mutation after scheduling, without rescheduling: the timer reads the
    // state when it fires, not a snapshot from schedule time.
    session.add_item(pid("p1"));

    wait_for_requests(&server, 1).await;

    let requests = server.received_requests().await.unwrap_or_default();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert_eq!(body, serde_json::json!({"cart": {"p1": 2}}));
}

#[tokio::test]
async fn facade_mutations_schedule_uploads() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let cart = Cart::new(
        test_api(&server.uri()),
        Box::new(MemoryStore::new()),
        WINDOW,
    );

    cart.add_item(pid("p1"));
    assert!(cart.sync().has_pending_upload());

    wait_for_requests(&server, 1).await;
    assert_eq!(cart.total(), 1);
}

#[tokio::test]
async fn fetch_remote_replaces_local_state_wholesale() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("Authorization", "Bearer tok_test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cart": {"A": 2, "B": 1},
            })),
        )
        .mount(&server)
        .await;

    let session = test_session();
    let sync = SyncClient::new(session.clone(), test_api(&server.uri()), WINDOW);

    // Local-only state from before the fetch is discarded, not merged.
    session.add_item(pid("local"));

    sync.fetch_remote().await.expect("fetch should succeed");

    let items = session.items();
    assert_eq!(items.total(), 3);
    assert_eq!(items.quantity(&pid("A")), 2);
    assert_eq!(items.quantity(&pid("B")), 1);
    assert_eq!(items.quantity(&pid("local")), 0);
}

#[tokio::test]
async fn failed_fetch_leaves_local_state_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = test_session();
    let sync = SyncClient::new(session.clone(), test_api(&server.uri()), WINDOW);

    session.add_item(pid("p1"));
    let err = sync.fetch_remote().await.expect_err("fetch should fail");
    assert!(err.to_string().contains("500"));

    // Fail-safe default: trust what you have.
    assert_eq!(session.total(), 1);
    assert_eq!(session.items().quantity(&pid("p1")), 1);
}

#[tokio::test]
async fn failed_upload_is_dropped_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = test_session();
    let sync = SyncClient::new(session.clone(), test_api(&server.uri()), WINDOW);

    session.add_item(pid("p1"));
    sync.schedule_upload();

    wait_for_requests(&server, 1).await;
    tokio::time::sleep(WINDOW * 3).await;

    // Exactly one attempt; the failure never surfaces to the cart.
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
    assert_eq!(session.total(), 1);

    // The next change schedules a fresh upload as usual.
    session.add_item(pid("p2"));
    sync.schedule_upload();
    assert!(sync.has_pending_upload());
}
