//! End-to-end tests for the cache command.
//!
//! These invoke the actual CLI binary against a private cache root and
//! validate cache command behavior from a user's perspective.

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_cache_help() {
    TestFixture::new()
        .command()
        .args(["cache", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Manage the checkout cache"));
}

#[test]
fn test_cache_list_empty() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No cached checkouts found"));
}

#[test]
fn test_cache_list_json_empty() {
    TestFixture::new()
        .command()
        .args(["cache", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::diff("[]\n"));
}

#[test]
fn test_cache_list_shows_entries_and_skips_tmp() {
    let fixture = TestFixture::new();
    let cache = fixture.cache_root();
    std::fs::create_dir_all(cache.join("0123456789ab").join("main")).unwrap();
    std::fs::create_dir_all(cache.join("0123456789ab").join("tmp").join("main-deadbeef")).unwrap();

    fixture
        .command()
        .args(["cache", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0123456789ab"))
        .stdout(predicate::str::contains("main"))
        .stdout(predicate::str::contains("deadbeef").not())
        .stdout(predicate::str::contains("Total: 1 checkouts"));
}

#[test]
fn test_cache_clean_requires_all() {
    TestFixture::new()
        .command()
        .args(["cache", "clean"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires --all"))
        .stderr(predicate::str::contains("hint: Use --all"));
}

#[test]
fn test_cache_clean_dry_run_keeps_entries() {
    let fixture = TestFixture::new();
    let entry = fixture.cache_root().join("0123456789ab").join("main");
    std::fs::create_dir_all(&entry).unwrap();

    fixture
        .command()
        .args(["cache", "clean", "--all", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would delete 1 checkouts"));
    assert!(entry.exists());
}

#[test]
fn test_cache_clean_all_removes_root() {
    let fixture = TestFixture::new();
    std::fs::create_dir_all(fixture.cache_root().join("0123456789ab").join("main")).unwrap();

    fixture
        .command()
        .args(["cache", "clean", "--all"])
        .assert()
        .success();
    assert!(!fixture.cache_root().exists());
}

#[test]
fn test_cache_clean_missing_root() {
    TestFixture::new()
        .command()
        .args(["cache", "clean", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache directory does not exist"));
}

#[test]
fn test_cache_delete_removes_checkouts_of_repository() {
    let fixture = TestFixture::new().with_config(configs::UNREACHABLE);
    let origin = "file:///nonexistent/preset-repo/standards.git";
    let hash = preset_repo::path::origin_hash(origin);
    let kept = fixture.cache_root().join("ffffffffffff").join("main");
    let removed = fixture.cache_root().join(&hash).join("0123abcd");
    std::fs::create_dir_all(&kept).unwrap();
    std::fs::create_dir_all(&removed).unwrap();

    fixture
        .command()
        .args(["cache", "delete", "standards"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 1 checkouts of 'standards'"));
    assert!(!removed.exists());
    assert!(kept.exists());
}

#[test]
fn test_cache_delete_unknown_repository() {
    TestFixture::new()
        .with_config(configs::UNREACHABLE)
        .command()
        .args(["cache", "delete", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown repository: nope"));
}

#[test]
fn test_cache_root_from_flag() {
    let fixture = TestFixture::new();
    let other = fixture.path().join("elsewhere");
    std::fs::create_dir_all(other.join("0123456789ab").join("v1")).unwrap();

    fixture
        .command()
        .args(["cache", "list", "--cache-root"])
        .arg(&other)
        .assert()
        .success()
        .stdout(predicate::str::contains("v1"));
}
