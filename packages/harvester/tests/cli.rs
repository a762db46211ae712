//! Binary-level tests for the `scitech-harvester` command.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("scitech")
        .join(name)
}

fn harvester() -> Command {
    Command::cargo_bin("scitech-harvester").unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    harvester()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("harvest"))
        .stdout(predicate::str::contains("normalize"));
}

#[test]
fn test_normalize_prints_document() {
    let output = harvester()
        .arg("normalize")
        .arg(fixture("record.xml"))
        .args(["--timestamp", "2013-10-02T00:00:00Z"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let document: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(document["id"]["service_id"], "1096372");
    assert_eq!(document["timestamp"], "2013-10-02T00:00:00Z");
    assert_eq!(document["contributors"][1]["full_name"], "Burchell, T. D.");
    assert_eq!(document["tags"][1], "graphite, & carbon");
    assert_eq!(
        document["properties"]["research_org"],
        "Oak Ridge National Laboratory (ORNL)"
    );
}

#[test]
fn test_normalize_missing_file_fails() {
    harvester()
        .arg("normalize")
        .arg(fixture("does_not_exist.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: IO error"));
}

#[test]
fn test_harvest_rejects_malformed_end_date() {
    // Validation happens before any request is made
    harvester()
        .args(["harvest", "--end-date", "2025-02-30"])
        .args(["--base-url", "http://127.0.0.1:9/unreachable"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date format: '2025-02-30'"));
}

#[test]
fn test_harvest_rejects_bad_param() {
    harvester()
        .args(["harvest", "--param", "no-equals-sign"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn test_harvest_reports_unreachable_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.json");

    harvester()
        .args(["harvest", "--days-back", "0", "--timeout", "2"])
        .args(["--base-url", "http://127.0.0.1:9/scitech"])
        .arg("--output")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to download result page 0"));

    assert!(!output.exists());
}
