//! End-to-end tests for the fetch and scan commands that need no network.

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_fetch_without_config() {
    TestFixture::new()
        .command()
        .arg("fetch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"))
        .stderr(predicate::str::contains("PRESET_REPO_CONFIG"));
}

#[test]
fn test_fetch_invalid_config() {
    TestFixture::new()
        .with_config(configs::INVALID_YAML)
        .command()
        .arg("fetch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load"));
}

#[test]
fn test_fetch_config_from_env() {
    let fixture = TestFixture::new().with_file("conf/presets.yaml", configs::EMPTY);

    fixture
        .command()
        .env("PRESET_REPO_CONFIG", fixture.path().join("conf/presets.yaml"))
        .arg("fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("No repositories configured."));
}

#[test]
fn test_fetch_unknown_repository_name() {
    TestFixture::new()
        .with_config(configs::UNREACHABLE)
        .command()
        .args(["fetch", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown repository: missing"));
}

#[test]
fn test_fetch_unreachable_origin_names_repository() {
    TestFixture::new()
        .with_config(configs::UNREACHABLE)
        .command()
        .arg("fetch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Checkout failed for 'standards'"))
        .stderr(predicate::str::contains("1 of 1 repositories"));
}

#[test]
fn test_scan_json_reports_failed_checkout() {
    let output = TestFixture::new()
        .with_config(configs::UNREACHABLE)
        .command()
        .args(["scan", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["repositories"], serde_json::json!([]));
    assert_eq!(report["failed_checkouts"][0]["name"], "standards");
}
