// Integration tests for `HttpClient` endpoint bindings using wiremock.

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wayfind_api::query::{Cursor, QueryOptions};
use wayfind_api::{Error, HttpClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HttpClient) {
    let server = MockServer::start().await;
    let client = HttpClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_datacenters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/catalog/datacenters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["dc1", "dc2"])))
        .mount(&server)
        .await;

    let dcs = client.list_datacenters().await.unwrap();
    assert_eq!(dcs, vec!["dc1", "dc2"]);
}

#[tokio::test]
async fn test_ui_nodes_with_meta() {
    let (server, client) = setup().await;

    let body = json!([
        {
            "ID": "40e4a748-2192-161a-0510-9bf59fe950b5",
            "Node": "node-1",
            "Address": "10.0.0.1",
            "Datacenter": "dc1",
            "Checks": [
                { "Node": "node-1", "CheckID": "serfHealth", "Name": "Serf Health Status",
                  "Status": "passing" }
            ],
            "Services": [
                { "ID": "web-1", "Service": "web", "Port": 8080 }
            ]
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/v1/internal/ui/nodes"))
        .and(query_param("dc", "dc1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&body)
                .insert_header("X-Consul-Index", "12")
                .insert_header("X-Consul-KnownLeader", "true"),
        )
        .mount(&server)
        .await;

    let page = client
        .ui_nodes(&QueryOptions::datacenter("dc1"))
        .await
        .unwrap();

    assert_eq!(page.meta.index, Cursor::new("12"));
    assert!(page.meta.known_leader);
    assert_eq!(page.body.len(), 1);
    assert_eq!(page.body[0].node, "node-1");
    assert_eq!(page.body[0].checks[0].status, "passing");
    assert_eq!(page.body[0].services[0].service, "web");
}

#[tokio::test]
async fn test_health_service() {
    let (server, client) = setup().await;

    let body = json!([
        {
            "Node": { "Node": "node-1", "Address": "10.0.0.1", "Datacenter": "dc1" },
            "Service": { "ID": "web-1", "Service": "web", "Port": 8080,
                         "Tags": ["v2"], "Address": "10.0.0.1" },
            "Checks": [
                { "Node": "node-1", "CheckID": "service:web-1", "Name": "Service 'web' check",
                  "Status": "critical", "ServiceID": "web-1", "ServiceName": "web" }
            ]
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/v1/health/service/web"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&body)
                .insert_header("X-Consul-Index", "44"),
        )
        .mount(&server)
        .await;

    let page = client
        .health_service("web", false, &QueryOptions::default())
        .await
        .unwrap();

    assert_eq!(page.body.len(), 1);
    assert_eq!(page.body[0].service.id, "web-1");
    assert_eq!(page.body[0].checks[0].status, "critical");
}

#[tokio::test]
async fn test_kv_get_and_decode() {
    let (server, client) = setup().await;

    // "hello" base64-encoded
    let body = json!([
        { "Key": "greeting", "Value": "aGVsbG8=", "Flags": 42,
          "CreateIndex": 10, "ModifyIndex": 11, "LockIndex": 0 }
    ]);

    Mock::given(method("GET"))
        .and(path("/v1/kv/greeting"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&body)
                .insert_header("X-Consul-Index", "11"),
        )
        .mount(&server)
        .await;

    let page = client
        .kv_get("greeting", &QueryOptions::default())
        .await
        .unwrap();

    assert_eq!(page.body.len(), 1);
    assert_eq!(page.body[0].flags, 42);
    assert_eq!(page.body[0].decoded_value().unwrap(), b"hello");
}

#[tokio::test]
async fn test_kv_put_returns_bool() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/v1/kv/config/rate"))
        .and(query_param("flags", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .mount(&server)
        .await;

    let ok = client
        .kv_put("config/rate", b"100".to_vec(), Some(7), &QueryOptions::default())
        .await
        .unwrap();
    assert!(ok);
}

#[tokio::test]
async fn test_acl_token_create_echo() {
    let (server, client) = setup().await;

    let accessor = Uuid::new_v4();
    let secret = Uuid::new_v4();

    Mock::given(method("PUT"))
        .and(path("/v1/acl/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AccessorID": accessor,
            "SecretID": secret,
            "Description": "ci deploy token",
            "Local": false,
            "Policies": [ { "ID": Uuid::new_v4(), "Name": "deploy" } ],
            "CreateIndex": 100,
            "ModifyIndex": 100
        })))
        .mount(&server)
        .await;

    let req = wayfind_api::acl::AclToken {
        description: "ci deploy token".into(),
        ..wayfind_api::acl::AclToken::default()
    };
    let created = client
        .acl_token_create(&req, &QueryOptions::default())
        .await
        .unwrap();

    assert_eq!(created.accessor_id, Some(accessor));
    assert_eq!(created.secret_id, Some(secret));
    assert_eq!(created.policies.unwrap()[0].name.as_deref(), Some("deploy"));
}

#[tokio::test]
async fn test_token_header_is_sent() {
    let server = MockServer::start().await;
    let client = HttpClient::from_reqwest(&server.uri(), reqwest::Client::new())
        .unwrap()
        .with_token(Some(secrecy::SecretString::from("root-token")));

    Mock::given(method("GET"))
        .and(path("/v1/catalog/datacenters"))
        .and(header("X-Consul-Token", "root-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["dc1"])))
        .expect(1)
        .mount(&server)
        .await;

    let dcs = client.list_datacenters().await.unwrap();
    assert_eq!(dcs, vec!["dc1"]);
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_403_permission_denied() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Permission denied"))
        .mount(&server)
        .await;

    let result = client.acl_tokens(&QueryOptions::default()).await;

    match result {
        Err(Error::PermissionDenied { status }) => assert_eq!(status, 403),
        other => panic!("expected PermissionDenied, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_acl_disabled() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("ACL support disabled"))
        .mount(&server)
        .await;

    let result = client.acl_tokens(&QueryOptions::default()).await;

    assert!(matches!(result, Err(Error::AclDisabled)));
    assert!(result.unwrap_err().is_access_denied());
}

#[tokio::test]
async fn test_error_404_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/kv/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client.kv_get("missing", &QueryOptions::default()).await;

    match result {
        Err(Error::NotFound { ref path }) => assert_eq!(path, "/v1/kv/missing"),
        other => panic!("expected NotFound, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_500_api() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("rpc error"))
        .mount(&server)
        .await;

    let result = client.list_datacenters().await;

    match result {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "rpc error");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_deadline_overrun_is_timeout() {
    use std::time::Duration;

    use wayfind_api::transport::{TlsMode, TransportConfig};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["dc1"]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let transport = TransportConfig {
        tls: TlsMode::System,
        timeout: Duration::from_millis(100),
    };
    let client = HttpClient::new(&server.uri(), None, &transport).unwrap();

    let err = client.list_datacenters().await.unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "got: {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_status_errors_are_not_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.list_datacenters().await.unwrap_err();
    assert!(!err.is_transient());
    assert_eq!(err.status(), Some(503));
}
