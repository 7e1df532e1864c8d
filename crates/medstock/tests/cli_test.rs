//! Integration tests for the `medstock` CLI binary.
//!
//! Argument parsing, help output, and error handling run without a
//! server; end-to-end list and write commands run against wiremock.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use medstock_core::auth::encode_unsigned_token;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `medstock` binary with env isolation.
///
/// Clears all `MEDSTOCK_*` env vars and points the config file at
/// `config`, so tests never touch the user's real configuration.
fn medstock_cmd(config: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("medstock");
    cmd.env("MEDSTOCK_CONFIG", config)
        .env("NO_COLOR", "1")
        .env_remove("MEDSTOCK_PROFILE")
        .env_remove("MEDSTOCK_API")
        .env_remove("MEDSTOCK_TOKEN")
        .env_remove("MEDSTOCK_OUTPUT")
        .env_remove("MEDSTOCK_INSECURE")
        .env_remove("MEDSTOCK_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// A throwaway config location that does not exist yet.
fn scratch() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    (dir, config)
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so wiremock keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn names(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap_or_default().to_owned())
        .collect()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let (_dir, config) = scratch();
    let output = medstock_cmd(&config).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let (_dir, config) = scratch();
    medstock_cmd(&config).arg("--help").assert().success().stdout(
        predicate::str::contains("medical-supply inventory")
            .and(predicate::str::contains("items"))
            .and(predicate::str::contains("lot-requests"))
            .and(predicate::str::contains("categories")),
    );
}

#[test]
fn test_version_flag() {
    let (_dir, config) = scratch();
    medstock_cmd(&config)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("medstock"));
}

#[test]
fn test_completions_bash() {
    let (_dir, config) = scratch();
    medstock_cmd(&config)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Usage errors (no server needed) ─────────────────────────────────

#[test]
fn test_list_without_server_reports_missing_config() {
    let (_dir, config) = scratch();
    medstock_cmd(&config)
        .args(["items", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No server configured"));
}

#[test]
fn test_desc_requires_sort() {
    let (_dir, config) = scratch();
    medstock_cmd(&config)
        .args(["--api", "http://127.0.0.1:9", "items", "list", "--desc"])
        .assert()
        .code(2);
}

#[test]
fn test_malformed_filter_is_rejected_before_fetching() {
    let (_dir, config) = scratch();
    medstock_cmd(&config)
        .args(["--api", "http://127.0.0.1:9", "items", "list", "--filter", "nonsense"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("FIELD=VALUE"));
}

#[test]
fn test_storage_flag_only_applies_to_lots() {
    let (_dir, config) = scratch();
    medstock_cmd(&config)
        .args(["--api", "http://127.0.0.1:9", "items", "list", "--storage", "3"])
        .assert()
        .code(2);
}

#[test]
fn test_read_only_resource_refuses_create() {
    let (_dir, config) = scratch();
    medstock_cmd(&config)
        .args(["--api", "http://127.0.0.1:9", "lot-requests", "create", "--set", "x=1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("lot-requests create"));
}

#[test]
fn test_search_unsupported_resource() {
    let (_dir, config) = scratch();
    medstock_cmd(&config)
        .args(["--api", "http://127.0.0.1:9", "storages", "search", "cold"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_profile() {
    let (_dir, config) = scratch();
    medstock_cmd(&config)
        .args(["--profile", "ward-9", "items", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ward-9"));
}

// ── Auth & config (local only) ──────────────────────────────────────

#[test]
fn test_whoami_decodes_the_token() {
    let (_dir, config) = scratch();
    let token = encode_unsigned_token(&json!({
        "sub": "u-7",
        "name": "Nora Diaz",
        "role": 2,
        "storageName": "Main Pharmacy",
        "exp": 4_102_444_800_i64
    }));
    let output = medstock_cmd(&config)
        .args(["--token", token.as_str(), "-o", "json", "auth", "whoami"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let who = stdout_json(&output);
    assert_eq!(who["name"], "Nora Diaz");
    assert_eq!(who["role"], "Manager");
    assert_eq!(who["storage"], "Main Pharmacy");
    assert_eq!(who["source"], "--token");
}

#[test]
fn test_whoami_rejects_garbage_token() {
    let (_dir, config) = scratch();
    medstock_cmd(&config)
        .args(["--token", "not-a-token", "auth", "whoami"])
        .assert()
        .code(3);
}

#[test]
fn test_login_plaintext_then_show_redacts() {
    let (_dir, config) = scratch();
    let token = encode_unsigned_token(&json!({ "sub": "a-1", "role": 1 }));

    medstock_cmd(&config)
        .args([
            "--api",
            "https://inventory.example.org",
            "--token",
            token.as_str(),
            "auth",
            "login",
            "--plaintext",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Admin"));

    let raw = std::fs::read_to_string(&config).unwrap();
    assert!(raw.contains("https://inventory.example.org"));

    let output = medstock_cmd(&config)
        .args(["-o", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let shown = stdout_json(&output);
    assert_eq!(shown["default_profile"], "default");
    assert_eq!(shown["profiles"]["default"]["token"], "****");
    assert_eq!(
        shown["profiles"]["default"]["api_url"],
        "https://inventory.example.org"
    );
}

#[test]
fn test_config_set_and_use() {
    let (_dir, config) = scratch();
    medstock_cmd(&config)
        .args(["--profile", "ward", "config", "set", "api_url", "http://ward.local:8080"])
        .assert()
        .success();
    medstock_cmd(&config)
        .args(["config", "use", "ward"])
        .assert()
        .success();
    medstock_cmd(&config)
        .args(["-o", "plain", "config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ward"));
    medstock_cmd(&config)
        .args(["config", "use", "nowhere"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ward"));
}

// ── End-to-end against a mock server ────────────────────────────────

fn items() -> Value {
    json!([
        { "id": 1, "name": "Nitrile Gloves", "unit": "box", "categoryName": "PPE", "quantity": 120 },
        { "id": 2, "name": "Saline 0.9%", "unit": "bag", "categoryName": "Fluids", "quantity": 40 },
        { "id": 3, "name": "Surgical Mask", "unit": "box", "categoryName": "PPE", "quantity": 300 },
        { "id": 4, "name": "Gauze Pads", "unit": "pack", "categoryName": null, "quantity": 75 }
    ])
}

async fn item_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items()))
        .mount(&server)
        .await;
    server
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_filters_and_sorts_locally() {
    let server = item_server().await;
    let (_dir, config) = scratch();

    let mut cmd = medstock_cmd(&config);
    cmd.args([
        "--api",
        server.uri().as_str(),
        "-o",
        "json",
        "items",
        "list",
        "--filter",
        "categoryName=PPE",
        "--sort",
        "quantity",
        "--sort",
        "quantity",
    ]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        names(&stdout_json(&output)),
        vec!["Surgical Mask", "Nitrile Gloves"]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_search_is_case_insensitive() {
    let server = item_server().await;
    let (_dir, config) = scratch();

    let mut cmd = medstock_cmd(&config);
    cmd.args(["--api", server.uri().as_str(), "-o", "json", "items", "list", "--search", "  BOX "]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        names(&stdout_json(&output)),
        vec!["Nitrile Gloves", "Surgical Mask"]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_table_with_summary() {
    let server = item_server().await;
    let (_dir, config) = scratch();

    let mut cmd = medstock_cmd(&config);
    cmd.args(["--api", server.uri().as_str(), "items", "list", "--search", "box", "--summary"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Surgical Mask"));
    assert!(!stdout.contains("Saline"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Showing 2 of 4"), "stderr: {stderr}");
    assert!(stderr.contains("1 distinct categoryName"), "stderr: {stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_plain_output_lists_ids() {
    let server = item_server().await;
    let (_dir, config) = scratch();

    let mut cmd = medstock_cmd(&config);
    cmd.args(["--api", server.uri().as_str(), "-o", "plain", "items", "list", "--sort", "name"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "4\n1\n2\n3");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_token_flag_sends_bearer_header() {
    let server = MockServer::start().await;
    let token = encode_unsigned_token(&json!({ "sub": "m-1", "role": 2 }));
    Mock::given(method("GET"))
        .and(path("/api/storage"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Cold Room", "status": 1 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, config) = scratch();
    let mut cmd = medstock_cmd(&config);
    cmd.args(["--api", server.uri().as_str(), "--token", token.as_str(), "storages", "list"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cold Room"));
    assert!(stdout.contains("Approved"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (_dir, config) = scratch();
    let mut cmd = medstock_cmd(&config);
    cmd.args(["--api", server.uri().as_str(), "accounts", "list"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_missing_record_exits_not_found() {
    let server = item_server().await;
    let (_dir, config) = scratch();

    let mut cmd = medstock_cmd(&config);
    cmd.args(["--api", server.uri().as_str(), "items", "get", "99"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("items list"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_with_yes_hits_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/items/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, config) = scratch();
    let mut cmd = medstock_cmd(&config);
    cmd.args(["--api", server.uri().as_str(), "--yes", "items", "delete", "7"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_without_yes_refuses_non_interactively() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let (_dir, config) = scratch();
    let mut cmd = medstock_cmd(&config);
    cmd.args(["--api", server.uri().as_str(), "items", "delete", "7"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_search_passes_the_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/lot-request"))
        .and(wiremock::matchers::query_param("query", "gauze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 5, "lotNumber": "L-5", "itemName": "Gauze Pads", "status": 0 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, config) = scratch();
    let mut cmd = medstock_cmd(&config);
    cmd.args(["--api", server.uri().as_str(), "-o", "plain", "lot-requests", "search", "gauze"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "5");
}
