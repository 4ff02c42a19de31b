//! Integration tests for the `wayfind` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! and error handling without requiring a live agent; the mock-agent
//! tests at the bottom run the binary against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `wayfind` binary with env isolation.
///
/// Clears all `WAYFIND_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn wayfind_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("wayfind");
    cmd.env("HOME", "/tmp/wayfind-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/wayfind-cli-test-nonexistent")
        .env_remove("WAYFIND_PROFILE")
        .env_remove("WAYFIND_SERVER")
        .env_remove("WAYFIND_DATACENTER")
        .env_remove("WAYFIND_NAMESPACE")
        .env_remove("WAYFIND_PARTITION")
        .env_remove("WAYFIND_TOKEN")
        .env_remove("WAYFIND_OUTPUT")
        .env_remove("WAYFIND_INSECURE")
        .env_remove("WAYFIND_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = wayfind_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Usage"),
        "Expected 'Usage' in output:\n{text}"
    );
}

#[test]
fn test_help_flag() {
    wayfind_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("catalog")
            .and(predicate::str::contains("kv"))
            .and(predicate::str::contains("acl"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    wayfind_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wayfind"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    wayfind_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    wayfind_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    wayfind_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = wayfind_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_config_show_no_config() {
    // `config show` uses load_config_or_default() so it succeeds even
    // when no config file exists; it just renders the default config.
    wayfind_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_path_prints_a_path() {
    wayfind_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_profiles_empty() {
    wayfind_cmd()
        .args(["config", "profiles"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No profiles configured"));
}

#[test]
fn test_config_use_unknown_profile() {
    let output = wayfind_cmd()
        .args(["config", "use", "staging"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("staging"),
        "Expected error naming the missing profile:\n{text}"
    );
}

#[test]
fn test_invalid_output_format() {
    let output = wayfind_cmd()
        .args(["--output", "invalid", "catalog", "datacenters"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_invalid_server_url() {
    let output = wayfind_cmd()
        .args(["--server", "not a url", "catalog", "datacenters"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("URL") || text.contains("url") || text.contains("server"),
        "Expected error about the server URL:\n{text}"
    );
}

#[test]
fn test_connection_refused_exit_code() {
    // Port 1 is never an agent; the failure must be a connection error,
    // not a parse error.
    let output = wayfind_cmd()
        .args([
            "--server",
            "http://127.0.0.1:1",
            "--timeout",
            "2",
            "catalog",
            "datacenters",
        ])
        .output()
        .unwrap();
    assert_eq!(
        output.status.code(),
        Some(7),
        "Expected the connection exit code:\n{}",
        combined_output(&output)
    );
}

#[test]
fn test_global_flags_parsing() {
    // All flags should parse; the failure is the unreachable agent.
    wayfind_cmd()
        .args([
            "--output",
            "json",
            "--verbose",
            "--insecure",
            "--timeout",
            "2",
            "--datacenter",
            "dc1",
            "--server",
            "http://127.0.0.1:1",
            "catalog",
            "nodes",
        ])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("connect")
                .or(predicate::str::contains("Connection"))
                .or(predicate::str::contains("agent")),
        );
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_catalog_subcommands_exist() {
    wayfind_cmd()
        .args(["catalog", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("datacenters")
                .and(predicate::str::contains("nodes"))
                .and(predicate::str::contains("services")),
        );
}

#[test]
fn test_kv_subcommands_exist() {
    wayfind_cmd()
        .args(["kv", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("get")
                .and(predicate::str::contains("put"))
                .and(predicate::str::contains("delete"))
                .and(predicate::str::contains("list")),
        );
}

#[test]
fn test_acl_subcommands_exist() {
    wayfind_cmd()
        .args(["acl", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("tokens")
                .and(predicate::str::contains("policies"))
                .and(predicate::str::contains("roles")),
        );
}

#[test]
fn test_config_subcommands_exist() {
    wayfind_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("profiles")),
        );
}

#[test]
fn test_watch_subcommands_exist() {
    wayfind_cmd()
        .args(["watch", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("nodes")
                .and(predicate::str::contains("services"))
                .and(predicate::str::contains("kv")),
        );
}

// ── Against a mock agent ────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_catalog_datacenters_against_mock_agent() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/catalog/datacenters"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Consul-Index", "1")
                .set_body_json(serde_json::json!(["dc1", "dc2"])),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        wayfind_cmd()
            .args(["--server", &uri, "catalog", "datacenters", "-o", "plain"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(
        output.status.success(),
        "Expected success:\n{}",
        combined_output(&output)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("dc1"), "Expected dc1 in:\n{stdout}");
    assert!(stdout.contains("dc2"), "Expected dc2 in:\n{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_permission_denied_exit_code_against_mock_agent() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/catalog/datacenters"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Consul-Index", "1")
                .set_body_json(serde_json::json!(["dc1"])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/acl/tokens"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Permission denied"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        wayfind_cmd()
            .args(["--server", &uri, "acl", "tokens", "list"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert_eq!(
        output.status.code(),
        Some(5),
        "Expected the permission exit code:\n{}",
        combined_output(&output)
    );
}
