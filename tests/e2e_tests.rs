//! End-to-end tests for the phpup CLI
//!
//! These tests verify:
//! - Exit codes for fatal setup conditions
//! - The no-changes and dry-run paths leave files unchanged
//! - JSON output schema
//!
//! Fixtures only declare platform packages, so no registry lookups happen.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Manifest with nothing to upgrade: platform packages are always skipped
const PLATFORM_ONLY: &str = r#"{
    "name": "acme/app",
    "require": {
        "php": ">=8.1",
        "ext-json": "*"
    }
}"#;

fn phpup() -> Command {
    Command::cargo_bin("phpup").expect("binary should build")
}

fn project(manifest: &str, with_lock: bool) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    fs::write(dir.path().join("composer.json"), manifest).unwrap();
    if with_lock {
        fs::write(dir.path().join("composer.lock"), r#"{"packages": []}"#).unwrap();
    }
    dir
}

#[test]
fn test_missing_manifest_exits_failure() {
    let dir = TempDir::new().unwrap();
    phpup()
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("composer.json not found"));
}

#[test]
fn test_unparseable_manifest_exits_failure() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("composer.json"), "{ nope").unwrap();
    phpup()
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}

#[test]
fn test_missing_lock_exits_failure_outside_dry_run() {
    let dir = project(PLATFORM_ONLY, false);
    phpup()
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("composer.lock not found"));
}

#[test]
fn test_missing_lock_is_accepted_in_dry_run() {
    let dir = project(PLATFORM_ONLY, false);
    phpup().arg(dir.path()).arg("--dry-run").assert().success();
}

#[test]
fn test_no_changes_exits_success() {
    let dir = project(PLATFORM_ONLY, true);
    phpup()
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No constraint updates required"));
}

#[test]
fn test_no_changes_leaves_manifest_untouched() {
    let dir = project(PLATFORM_ONLY, true);
    phpup().arg(dir.path()).assert().success();

    let on_disk = fs::read_to_string(dir.path().join("composer.json")).unwrap();
    assert_eq!(on_disk, PLATFORM_ONLY);
}

#[test]
fn test_dry_run_leaves_manifest_untouched() {
    let dir = project(PLATFORM_ONLY, true);
    phpup()
        .arg(dir.path())
        .arg("--dry-run")
        .arg("--verbose")
        .assert()
        .success();

    let on_disk = fs::read_to_string(dir.path().join("composer.json")).unwrap();
    assert_eq!(on_disk, PLATFORM_ONLY);
}

#[test]
fn test_verbose_lists_platform_skips() {
    let dir = project(PLATFORM_ONLY, true);
    phpup()
        .arg(dir.path())
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("php  skipped (platform package)"));
}

#[test]
fn test_json_output_schema() {
    let dir = project(PLATFORM_ONLY, true);
    let output = phpup().arg(dir.path()).arg("--json").output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["state"], "no_changes");
    assert_eq!(value["dry_run"], false);
    assert!(value["changes"].as_array().unwrap().is_empty());
    let outcomes = value["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["type"], "skip");
    assert_eq!(outcomes[0]["package"], "php");
}

#[test]
fn test_quiet_mode_prints_single_line() {
    let dir = project(PLATFORM_ONLY, true);
    let output = phpup().arg(dir.path()).arg("--quiet").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn test_help_mentions_policy_flags() {
    phpup()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--major"))
        .stdout(predicate::str::contains("--stability"))
        .stdout(predicate::str::contains("--only"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_version_flag() {
    phpup()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("phpup"));
}

#[test]
fn test_rejects_unknown_stability() {
    let dir = project(PLATFORM_ONLY, true);
    phpup()
        .arg(dir.path())
        .arg("--stability")
        .arg("experimental")
        .assert()
        .failure();
}
