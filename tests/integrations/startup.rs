//! Tests of the binary's startup behaviour.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::Builder;

#[test]
fn test_missing_reference_table_is_fatal() {
    Command::cargo_bin("alertroute")
        .unwrap()
        .args([
            "--reference-table",
            "/nonexistent/reference_table.json",
            "--listen-addr",
            "127.0.0.1:0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Reference table not found"));
}

#[test]
fn test_malformed_reference_table_is_fatal() {
    let mut table = Builder::new().suffix(".json").tempfile().unwrap();
    write!(table, "{{ not json").unwrap();

    Command::cargo_bin("alertroute")
        .unwrap()
        .args(["--listen-addr", "127.0.0.1:0", "--reference-table"])
        .arg(table.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed reference table"));
}

#[test]
fn test_missing_config_file_is_fatal() {
    Command::cargo_bin("alertroute")
        .unwrap()
        .args(["--config", "/nonexistent/alertroute.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_help_lists_options() {
    Command::cargo_bin("alertroute")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--reference-table"))
        .stdout(predicate::str::contains("--listen-addr"));
}
