//! Integration tests for the `staylist` CLI binary.
//!
//! Argument parsing, help, completions and config handling run without a
//! store; catalog commands run against a wiremock store.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `staylist` binary with env isolation.
///
/// Clears all `STAYLIST_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn staylist_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("staylist");
    cmd.env("HOME", "/tmp/staylist-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/staylist-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("STAYLIST_URL")
        .env_remove("STAYLIST_CONFIG")
        .env_remove("STAYLIST_OUTPUT")
        .env_remove("STAYLIST_INSECURE")
        .env_remove("STAYLIST_TIMEOUT")
        .env_remove("STAYLIST_WRITE_TIMEOUT")
        .env_remove("STAYLIST_STORE__URL")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary against `server` off the async runtime and collect
/// its output.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let mut full = vec!["--url".to_owned(), server.uri()];
    full.extend(args.iter().map(|a| (*a).to_owned()));
    tokio::task::spawn_blocking(move || staylist_cmd().args(&full).output().unwrap())
        .await
        .unwrap()
}

async fn mount_list(server: &MockServer, collection: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{collection}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn stays() -> Value {
    json!([
        { "id": 1, "title": "Downtown Studio", "city": "Kazan", "type": "Apartment", "price": 300 },
        { "id": 2, "title": "Lake House", "city": "Sochi", "type": "House", "price": 900, "isFavorite": true },
        { "id": 3, "title": "Old Town Loft", "city": "Kazan", "type": "Apartment", "price": 450 },
    ])
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = staylist_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    staylist_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("catalog store")
            .and(predicate::str::contains("list"))
            .and(predicate::str::contains("toggle"))
            .and(predicate::str::contains("watch-favorites")),
    );
}

#[test]
fn test_version_flag() {
    staylist_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("staylist"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    staylist_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    staylist_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("staylist"));
}

#[test]
fn test_completions_fish() {
    staylist_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Argument errors ─────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = staylist_cmd().arg("castles").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unknown_kind_is_rejected() {
    let output = staylist_cmd().args(["list", "castles"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("accommodations"), "Expected kinds listed:\n{text}");
}

#[test]
fn test_kind_aliases_parse() {
    staylist_cmd()
        .args(["list", "experiences", "--help"])
        .assert()
        .success();
}

#[test]
fn test_toggle_requires_an_id() {
    let output = staylist_cmd().args(["toggle", "chefs"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_bad_filter_is_a_usage_error() {
    let output = staylist_cmd()
        .args(["--url", "http://127.0.0.1:9", "list", "chefs", "-f", "stars=5"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("unknown key 'stars'"));
}

#[test]
fn test_bad_url_is_a_usage_error() {
    let output = staylist_cmd()
        .args(["--url", "not a url", "list", "chefs"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honors_flag() {
    staylist_cmd()
        .args(["--config", "/tmp/elsewhere/staylist.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/elsewhere/staylist.toml"));
}

#[test]
fn test_config_init_show_and_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("nested").join("config.toml");
    let file_arg = file.to_str().unwrap();

    staylist_cmd()
        .args(["--config", file_arg, "config", "init", "--store-url", "http://catalog.test:4000"])
        .assert()
        .success();
    let written = std::fs::read_to_string(&file).unwrap();
    assert!(written.contains("[store]"));
    assert!(written.contains("http://catalog.test:4000"));

    staylist_cmd()
        .args(["--config", file_arg, "-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"url\": \"http://catalog.test:4000\""));

    let output = staylist_cmd()
        .args(["--config", file_arg, "config", "init"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("--force"));

    staylist_cmd()
        .args(["--config", file_arg, "config", "init", "--force"])
        .assert()
        .success();
    let rewritten = std::fs::read_to_string(&file).unwrap();
    assert!(rewritten.contains("http://localhost:3001"));
}

#[test]
fn test_config_init_rejects_bad_url() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");

    let output = staylist_cmd()
        .args(["--config", file.to_str().unwrap(), "config", "init", "--store-url", "::nope"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(!file.exists());
}

#[test]
fn test_zero_page_size_in_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(&file, "[pages]\nchefs = 0\n").unwrap();

    let output = staylist_cmd()
        .args(["--config", file.to_str().unwrap(), "list", "chefs"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("pages.chefs"));
}

// ── Store unavailable ───────────────────────────────────────────────

#[test]
fn test_list_against_unreachable_store_fails() {
    let output = staylist_cmd()
        .args(["--url", "http://127.0.0.1:9", "--timeout", "2", "list", "chefs"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("Could not load chefs"), "got:\n{text}");
}

// ── Catalog commands ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_json_and_plain() {
    let server = MockServer::start().await;
    mount_list(&server, "accommodations", stays()).await;

    let output = run_against(&server, &["-o", "json", "list", "accommodations"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let items: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(items.as_array().unwrap().len(), 3);
    assert_eq!(items[1]["isFavorite"], json!(true));

    let output = run_against(
        &server,
        &["-o", "plain", "list", "stays", "-s", "kazan", "-f", "maxPrice=400"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_table_and_page_bounds() {
    let server = MockServer::start().await;
    mount_list(&server, "accommodations", stays()).await;

    let output = run_against(&server, &["list", "accommodations"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Lake House"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Page 1/1 · 3 matching"));

    let output = run_against(&server, &["list", "accommodations", "--page", "2"]).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("must be between 1 and 1"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_show_missing_record_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chefs/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let output = run_against(&server, &["show", "chefs", "99"]).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_show_prints_unmodelled_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/popular/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "id": 5, "title": "Night Kayak", "price": 90, "duration": "2 hours" }),
        ))
        .mount(&server)
        .await;

    let output = run_against(&server, &["show", "popular", "5"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Night Kayak"));
    assert!(stdout.contains("2 hours"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_facets_lists_distinct_cities() {
    let server = MockServer::start().await;
    mount_list(&server, "accommodations", stays()).await;

    let output = run_against(&server, &["-o", "plain", "facets", "accommodations", "-F", "city"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Kazan\nSochi");
}

// ── Favorites ───────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_toggle_confirms() {
    let server = MockServer::start().await;
    mount_list(&server, "accommodations", stays()).await;
    Mock::given(method("PATCH"))
        .and(path("/accommodations/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "plain", "toggle", "accommodations", "1"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "accommodations/1\ttrue"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rejected_toggle_reports_rollback() {
    let server = MockServer::start().await;
    mount_list(&server, "accommodations", stays()).await;
    Mock::given(method("PATCH"))
        .and(path("/accommodations/2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let output = run_against(&server, &["toggle", "accommodations", "2"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("rolled back"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_toggle_unknown_id_is_not_found() {
    let server = MockServer::start().await;
    mount_list(&server, "accommodations", stays()).await;

    let output = run_against(&server, &["toggle", "accommodations", "42"]).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_partial_toggle_failure() {
    let server = MockServer::start().await;
    mount_list(&server, "accommodations", stays()).await;
    Mock::given(method("PATCH"))
        .and(path("/accommodations/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/accommodations/3"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "plain", "toggle", "accommodations", "1", "3"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("accommodations/1\ttrue"));
    assert!(combined_output(&output).contains("1 of 2 favorite changes were rolled back"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_favorites_across_kinds() {
    let server = MockServer::start().await;
    for collection in ["accommodations", "exclusives", "photography", "chefs", "popular"] {
        let body = match collection {
            "accommodations" => json!([{ "id": 2, "title": "Lake House", "isFavorite": true }]),
            "chefs" => json!([{ "id": "c7", "title": "Sushi Night", "isFavorite": true }]),
            _ => json!([]),
        };
        Mock::given(method("GET"))
            .and(path(format!("/{collection}")))
            .and(query_param("isFavorite", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
    }

    let output = run_against(&server, &["-o", "plain", "favorites"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("accommodations/2"));
    assert!(stdout.contains("chefs/c7"));

    let output = run_against(&server, &["-o", "plain", "favorites", "--kind", "chefs"]).await;
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "chefs/c7");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watch_favorites_stops_after_count() {
    let server = MockServer::start().await;
    mount_list(&server, "chefs", json!([{ "id": 1, "isFavorite": true }])).await;

    let output = run_against(
        &server,
        &["-o", "plain", "watch-favorites", "--interval", "1", "--count", "1"],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1");
}
