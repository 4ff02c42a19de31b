// Integration tests for the watch loop against a wiremock control plane.

use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wayfind_api::catalog::ServiceSummary;
use wayfind_api::query::{Cursor, QueryOptions};
use wayfind_api::{HttpClient, WatchConfig, WatchEvent, WatchHandle, WatchState, Watcher};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HttpClient) {
    let server = MockServer::start().await;
    let client = HttpClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn services_body() -> serde_json::Value {
    json!([
        { "Name": "web", "Datacenter": "dc1", "ChecksPassing": 2,
          "ChecksWarning": 0, "ChecksCritical": 0, "Nodes": ["node-1"] }
    ])
}

fn spawn_services_watch(
    client: &HttpClient,
    config: WatchConfig,
) -> WatchHandle<Vec<ServiceSummary>> {
    let client = client.clone();
    Watcher::spawn(
        move |opts: QueryOptions| {
            let client = client.clone();
            async move { client.ui_services(&opts).await }
        },
        QueryOptions::default(),
        config,
    )
}

async fn expect_data(handle: &mut WatchHandle<Vec<ServiceSummary>>) -> Option<Cursor> {
    match handle.next().await {
        Some(WatchEvent::Data(page)) => page.meta.index,
        other => panic!("expected a data event, got: {other:?}"),
    }
}

// ── Cursor propagation ──────────────────────────────────────────────

// The first fetch carries no cursor; the cursor from response N is
// echoed as the `index` parameter of fetch N+1, together with the wait
// bound that makes the query block server-side.
#[tokio::test]
async fn test_cursor_from_response_drives_next_fetch() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/internal/ui/services"))
        .and(query_param_is_missing("index"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(services_body())
                .insert_header("X-Consul-Index", "5"),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/internal/ui/services"))
        .and(query_param("index", "5"))
        .and(query_param("wait", "300s"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(services_body())
                .insert_header("X-Consul-Index", "6"),
        )
        .expect(1..)
        .mount(&server)
        .await;

    let mut handle = spawn_services_watch(&client, WatchConfig::default());

    assert_eq!(expect_data(&mut handle).await, Cursor::new("5"));
    assert_eq!(expect_data(&mut handle).await, Cursor::new("6"));
    assert_eq!(handle.state(), WatchState::Open);

    handle.close();
    handle.closed().await;
}

// A response without a cursor header means the endpoint cannot block;
// the one result is dispatched and the subscription closes instead of
// hot-looping.
#[tokio::test]
async fn test_missing_cursor_closes_subscription() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/internal/ui/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(services_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut handle = spawn_services_watch(&client, WatchConfig::default());

    assert_eq!(expect_data(&mut handle).await, None);
    assert!(handle.next().await.is_none());
    assert_eq!(handle.state(), WatchState::Closed);
}

// ── Sequentiality ───────────────────────────────────────────────────

// Fetches never overlap: with every response held for 100ms, three
// dispatches cannot arrive in less than 300ms.
#[tokio::test]
async fn test_fetches_are_sequential() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/internal/ui/services"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(services_body())
                .insert_header("X-Consul-Index", "1")
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let mut handle = spawn_services_watch(&client, WatchConfig::default());

    let start = Instant::now();
    for _ in 0..3 {
        expect_data(&mut handle).await;
    }
    assert!(
        start.elapsed() >= Duration::from_millis(300),
        "three sequential 100ms fetches completed in {:?}",
        start.elapsed()
    );

    handle.close();
    handle.closed().await;
}

// ── Close semantics ─────────────────────────────────────────────────

// Closing while a fetch is in flight discards its result: nothing is
// dispatched after close().
#[tokio::test]
async fn test_close_suppresses_in_flight_result() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/internal/ui/services"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(services_body())
                .insert_header("X-Consul-Index", "1")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let mut handle = spawn_services_watch(&client, WatchConfig::default());

    // Let the fetch get in flight, then close before it completes.
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.close();

    assert!(handle.next().await.is_none());
    assert_eq!(handle.state(), WatchState::Closed);
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(services_body())
                .insert_header("X-Consul-Index", "1"),
        )
        .mount(&server)
        .await;

    let mut handle = spawn_services_watch(&client, WatchConfig::default());
    expect_data(&mut handle).await;

    handle.close();
    handle.close();
    handle.closed().await;
    assert_eq!(handle.state(), WatchState::Closed);
}

// ── Error handling ──────────────────────────────────────────────────

// An HTTP-status rejection is terminal: exactly one request, one error
// event, no automatic retry. A revoked token must not produce a retry
// storm of 403s.
#[tokio::test]
async fn test_permission_denied_is_terminal() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/internal/ui/services"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Permission denied"))
        .expect(1)
        .mount(&server)
        .await;

    let mut handle = spawn_services_watch(&client, WatchConfig::default());

    match handle.next().await {
        Some(WatchEvent::Error(err)) => {
            assert!(err.is_access_denied());
            assert_eq!(err.status(), Some(403));
        }
        other => panic!("expected an error event, got: {other:?}"),
    }
    assert!(handle.next().await.is_none());
    assert_eq!(handle.state(), WatchState::Closed);

    // Give a hypothetical retry time to fire; expect(1) on the mock
    // fails the test if it does.
    tokio::time::sleep(Duration::from_millis(200)).await;
}

// A transport failure keeps the subscription alive: error events are
// dispatched and fetches retry with backoff while the state reads
// Connecting.
#[tokio::test]
async fn test_transport_failure_retries() {
    // Nothing listens on the discard port; `no_proxy` keeps an ambient
    // HTTP proxy from answering on the server's behalf.
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let client = HttpClient::from_reqwest("http://127.0.0.1:1", http).unwrap();

    let config = WatchConfig {
        retry_initial: Duration::from_millis(10),
        retry_max: Duration::from_millis(40),
        ..WatchConfig::default()
    };
    let mut handle = spawn_services_watch(&client, config);

    for _ in 0..2 {
        match handle.next().await {
            Some(WatchEvent::Error(err)) => assert!(err.is_transient()),
            other => panic!("expected a transient error event, got: {other:?}"),
        }
    }
    assert_eq!(handle.state(), WatchState::Connecting);

    handle.close();
    handle.closed().await;
}

// ── Non-blocking mode ───────────────────────────────────────────────

// With blocking disabled the loop polls on an interval and never sends
// the cursor, even after responses have carried one. Every mock here
// requires the `index` parameter to be absent, so a stray cursor would
// surface as an unmatched request.
#[tokio::test]
async fn test_non_blocking_mode_omits_cursor() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/internal/ui/services"))
        .and(query_param_is_missing("index"))
        .and(query_param_is_missing("wait"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(services_body())
                .insert_header("X-Consul-Index", "9"),
        )
        .expect(2..)
        .mount(&server)
        .await;

    let config = WatchConfig {
        blocking: false,
        poll_interval: Duration::from_millis(50),
        ..WatchConfig::default()
    };
    let mut handle = spawn_services_watch(&client, config);

    assert_eq!(expect_data(&mut handle).await, Cursor::new("9"));
    assert_eq!(expect_data(&mut handle).await, Cursor::new("9"));

    handle.close();
    handle.closed().await;
}

// ── Stream adapter ──────────────────────────────────────────────────

#[tokio::test]
async fn test_into_stream_yields_events() {
    use futures_util::StreamExt;

    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(services_body())
                .insert_header("X-Consul-Index", "3"),
        )
        .mount(&server)
        .await;

    let handle = spawn_services_watch(&client, WatchConfig::default());
    let mut stream = Box::pin(handle.into_stream());

    match stream.next().await {
        Some(WatchEvent::Data(page)) => assert_eq!(page.body[0].name, "web"),
        other => panic!("expected a data event, got: {other:?}"),
    }
}
