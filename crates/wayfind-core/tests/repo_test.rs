// Integration tests for the Console and repositories against wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wayfind_api::watch::WatchState;
use wayfind_core::{Console, ConsoleConfig, CoreError};

async fn setup() -> (MockServer, Console) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/catalog/datacenters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["dc1", "dc2"])))
        .mount(&server)
        .await;

    let config = ConsoleConfig {
        server: server.uri(),
        ..ConsoleConfig::default()
    };
    let console = Console::new(config).unwrap();
    console.connect().await.unwrap();
    (server, console)
}

#[tokio::test]
async fn test_connect_resolves_local_datacenter() {
    let (_server, console) = setup().await;

    assert_eq!(console.datacenter(), "dc1");
    assert_eq!(*console.store().datacenters_snapshot(), vec!["dc1", "dc2"]);
}

#[tokio::test]
async fn test_connect_honors_configured_datacenter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/catalog/datacenters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["dc1", "dc2"])))
        .mount(&server)
        .await;

    let config = ConsoleConfig {
        server: server.uri(),
        datacenter: Some("dc2".into()),
        ..ConsoleConfig::default()
    };
    let console = Console::new(config).unwrap();
    console.connect().await.unwrap();

    assert_eq!(console.datacenter(), "dc2");
}

#[tokio::test]
async fn test_nodes_find_all_populates_store() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/internal/ui/nodes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    { "Node": "node-1", "Address": "10.0.0.1", "Datacenter": "dc1",
                      "Checks": [{ "CheckID": "serfHealth", "Name": "Serf Health Status",
                                   "Status": "passing", "Node": "node-1" }] },
                    { "Node": "node-2", "Address": "10.0.0.2", "Datacenter": "dc1",
                      "Checks": [{ "CheckID": "serfHealth", "Name": "Serf Health Status",
                                   "Status": "critical", "Node": "node-2" }] }
                ]))
                .insert_header("X-Consul-Index", "10"),
        )
        .mount(&server)
        .await;

    let nodes = console.nodes().find_all().await.unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(console.store().node_count(), 2);

    let node = console.store().node("dc1:default:default:node-1").unwrap();
    assert_eq!(node.address, "10.0.0.1");
    assert!(console.store().last_refresh().is_some());
}

#[tokio::test]
async fn test_kv_get_rejects_mismatched_echo() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/kv/config/rate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    { "Key": "config/other", "Value": "aGVsbG8=", "ModifyIndex": 5 }
                ]))
                .insert_header("X-Consul-Index", "5"),
        )
        .mount(&server)
        .await;

    let result = console.kv().get("config/rate").await;
    match result {
        Err(CoreError::ReconciliationFailed { expected, got }) => {
            assert_eq!(expected, "config/rate");
            assert_eq!(got, "config/other");
        }
        other => panic!("expected ReconciliationFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_token_listing_permission_denied() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/acl/tokens"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Permission denied"))
        .mount(&server)
        .await;

    let err = console.tokens().find_all().await.unwrap_err();
    assert!(err.is_access_denied());
}

#[tokio::test]
async fn test_acl_disabled_is_distinguished() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/acl/tokens"))
        .respond_with(ResponseTemplate::new(401).set_body_string("ACL support disabled"))
        .mount(&server)
        .await;

    let err = console.tokens().find_all().await.unwrap_err();
    assert!(matches!(err, CoreError::AclDisabled));
}

#[tokio::test]
async fn test_session_info_empty_is_not_found() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/session/info/adf4238a-882b-9ddc-4a9d-5b6758e4159e"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("X-Consul-Index", "3"),
        )
        .mount(&server)
        .await;

    let err = console
        .sessions()
        .info("adf4238a-882b-9ddc-4a9d-5b6758e4159e")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_set_blocking_closes_live_subscriptions() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/internal/ui/services"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    { "Name": "web", "Datacenter": "dc1", "Nodes": ["node-1"] }
                ]))
                .insert_header("X-Consul-Index", "7")
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&server)
        .await;

    let mut handle = console.services().watch_all();
    let _ = handle.next().await;

    console.set_blocking(false);
    handle.closed().await;
    assert_eq!(handle.state(), WatchState::Closed);

    // New repos see the flipped mode.
    assert!(!console.blocking());
}

#[tokio::test]
async fn test_watch_updates_store() {
    let (server, console) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/internal/ui/services"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([
                    { "Name": "web", "Datacenter": "dc1", "Nodes": ["node-1"],
                      "ChecksPassing": 1 }
                ]))
                .insert_header("X-Consul-Index", "7"),
        )
        .mount(&server)
        .await;

    let mut handle = console.services().watch_all();
    let _ = handle.next().await;

    assert_eq!(console.store().service_count(), 1);
    let service = console.store().service("dc1:default:default:web").unwrap();
    assert_eq!(service.checks_passing, 1);

    handle.close();
}
