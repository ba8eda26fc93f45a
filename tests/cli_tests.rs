//! End-to-end tests of the command line interface.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn steward(workspace: &Path) -> Command {
    let mut cmd = Command::cargo_bin("release_steward").unwrap();
    cmd.arg("--no-stage")
        .arg("--workspace")
        .arg(workspace)
        .env_remove("STAGING_PROFILE")
        .env_remove("STAGING_USERNAME")
        .env_remove("STAGING_PASSWORD")
        .env_remove("SIGNING_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_bump_prints_each_build_number() {
    let dir = tempfile::tempdir().unwrap();

    steward(dir.path()).args(["bump", "acme"]).assert().success().stdout("1\n");
    steward(dir.path()).args(["bump", "acme"]).assert().success().stdout("2\n");

    assert!(dir.path().join("config/versions.json").is_file());
}

#[test]
fn test_suffix_reflects_recorded_commit() {
    let dir = tempfile::tempdir().unwrap();

    steward(dir.path()).args(["bump", "acme"]).assert().success();
    steward(dir.path()).args(["suffix", "acme"]).assert().success().stdout("b1-\n");

    steward(dir.path())
        .args(["record", "acme", "commit", "abc123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded acme.commit = abc123"));
    steward(dir.path())
        .args(["record", "acme", "commit", "abc123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unchanged"));

    steward(dir.path()).args(["suffix", "acme"]).assert().success().stdout("b1-abc123\n");
}

#[test]
fn test_suffix_without_build_number_exits_with_failure() {
    let dir = tempfile::tempdir().unwrap();

    steward(dir.path())
        .args(["suffix", "acme"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("bump acme"))
        .stderr(predicate::str::contains("acme"));
}

#[test]
fn test_show_prints_ledger_json() {
    let dir = tempfile::tempdir().unwrap();

    steward(dir.path()).args(["bump", "acme"]).assert().success();
    steward(dir.path())
        .args(["record", "acme", "branch", "main"])
        .assert()
        .success();

    let output = steward(dir.path()).args(["show", "acme"]).output().unwrap();
    assert!(output.status.success());
    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record, serde_json::json!({"buildNumber": 1, "branch": "main"}));

    steward(dir.path()).args(["show", "widget"]).assert().code(1);
}

#[test]
fn test_publish_without_credentials_fails_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("acme.jar");
    std::fs::write(&artifact, b"jar").unwrap();

    steward(dir.path())
        .args(["publish", "acme", "--group", "org.acme"])
        .arg(&artifact)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing staging profile name"));

    assert!(!dir.path().join("config/versions.json").exists());
    assert!(!dir.path().join("acme.jar.asc").exists());
}

#[test]
fn test_invalid_mirror_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();

    steward(dir.path())
        .args(["mirror", "libs", "../acme", "https://example.invalid/acme.git"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid arguments"));
}
