//! End-to-end tests for the `crm-rs` binary.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Command pointed at a database inside `dir`.
#[allow(deprecated)]
fn crm_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("crm-rs").unwrap();
    cmd.env("CRM_DB_PATH", db_path(dir));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn db_path(dir: &Path) -> PathBuf {
    dir.join("data").join("CRM.db")
}

fn add_ana(dir: &Path) {
    crm_cmd(dir)
        .args([
            "add",
            "--name",
            "Ana Gomez",
            "--email",
            "ana@x.com",
            "--phone",
            "5551234",
            "--company",
            "Acme",
        ])
        .assert()
        .success()
        .stdout("Customer 1 added: Ana Gomez\n");
}

#[test]
fn test_init_creates_database() {
    let temp_dir = TempDir::new().unwrap();

    crm_cmd(temp_dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized CRM database"));

    assert!(db_path(temp_dir.path()).exists());

    crm_cmd(temp_dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already at schema v1"));
}

#[test]
fn test_add_list_edit_delete() {
    let temp_dir = TempDir::new().unwrap();
    add_ana(temp_dir.path());

    crm_cmd(temp_dir.path())
        .arg("ls")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ana Gomez").and(predicate::str::contains("ana@x.com")));

    crm_cmd(temp_dir.path())
        .args(["edit", "1", "--company", "Globex"])
        .assert()
        .success()
        .stdout("Customer 1 updated: Ana Gomez\n");

    crm_cmd(temp_dir.path())
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Company:  Globex"));

    crm_cmd(temp_dir.path())
        .args(["rm", "1"])
        .assert()
        .success()
        .stdout("Customer 1 deleted\n");

    crm_cmd(temp_dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout("No customers found.\n");
}

#[test]
fn test_db_path_flag_overrides_env() {
    let temp_dir = TempDir::new().unwrap();
    let other = temp_dir.path().join("other.db");

    crm_cmd(temp_dir.path())
        .arg("--db-path")
        .arg(&other)
        .arg("init")
        .assert()
        .success();

    assert!(other.exists());
    assert!(!db_path(temp_dir.path()).exists());
}

#[test]
fn test_invalid_field_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    crm_cmd(temp_dir.path())
        .args([
            "add",
            "--name",
            "Ana Gomez",
            "--email",
            "not-an-email",
            "--phone",
            "5551234",
            "--company",
            "Acme",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("enter a valid email address"));
}

#[test]
fn test_duplicate_email_reports_error() {
    let temp_dir = TempDir::new().unwrap();
    add_ana(temp_dir.path());

    crm_cmd(temp_dir.path())
        .args([
            "add",
            "--name",
            "Anita Perez",
            "--email",
            "ana@x.com",
            "--phone",
            "5550000",
            "--company",
            "Globex",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_json_output() {
    let temp_dir = TempDir::new().unwrap();
    add_ana(temp_dir.path());

    let output = crm_cmd(temp_dir.path())
        .args(["--format", "json", "find", "correo", "ana@x.com"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["id"], 1);
    assert_eq!(value[0]["empresa"], "Acme");
}

#[test]
fn test_json_error_goes_to_stdout() {
    let temp_dir = TempDir::new().unwrap();

    crm_cmd(temp_dir.path())
        .args(["show", "42", "--format", "json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("customer not found: 42"));
}

#[test]
fn test_unknown_find_field_is_usage_error() {
    let temp_dir = TempDir::new().unwrap();

    crm_cmd(temp_dir.path())
        .args(["find", "id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
