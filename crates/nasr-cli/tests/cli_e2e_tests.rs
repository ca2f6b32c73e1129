//! End-to-end tests for the nasr binary
//!
//! These tests validate the full command workflow against small on-disk
//! distribution fixtures:
//! - parse (counts, skipped rows, JSON output)
//! - cycle (README and name-token paths)
//! - verify (checksum success and mismatch)

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

/// Pad one airport base row to the fixed-width column map
fn apt_row(site: &str, site_type: &str, id: &str, name: &str, city: &str, state: &str) -> String {
    format!(
        "{:<3}{:<11}{:<2}{:<4}{:<30}{:<26}{:<2}",
        "APT", site, site_type, id, name, city, state
    )
}

fn rmk_row(site: &str, site_type: &str, element: &str, text: &str) -> String {
    format!(
        "{:<3}{:<11}{:<2}{:<13}{}",
        "RMK", site, site_type, element, text
    )
}

/// Write a minimal fixed-width distribution directory
fn write_fixture(dir: &Path) {
    let apt = [
        apt_row("04508.1", "A", "SPI", "SPRINGFIELD MUNI", "SPRINGFIELD", "IL"),
        apt_row("19533.2", "H", "CHI9", "LAKESIDE HELI", "CHICAGO", "IL"),
        rmk_row("99999.9", "A", "A110-2", "ORPHANED REMARK"),
    ]
    .join("\r\n");
    std::fs::write(dir.join("APT.txt"), apt + "\r\n").unwrap();
    std::fs::write(
        dir.join("README.txt"),
        "AIS subscriber files effective date December 28, 2023.\r\n",
    )
    .unwrap();
}

#[test]
fn test_parse_reports_counts_and_skips() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let mut cmd = Command::cargo_bin("nasr").unwrap();
    cmd.arg("parse")
        .arg(dir.path())
        .arg("--format")
        .arg("fixed")
        .arg("--types")
        .arg("airport");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("airport: 2 records"))
        .stdout(predicate::str::contains("APT.txt=1"))
        .stdout(predicate::str::contains("effective date: 2023-12-28"));
}

#[test]
fn test_parse_json_output() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let mut cmd = Command::cargo_bin("nasr").unwrap();
    let output = cmd
        .arg("parse")
        .arg(dir.path())
        .arg("--format")
        .arg("fixed")
        .arg("--types")
        .arg("airport")
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed["cycle"], "2023-12-28");
    assert_eq!(parsed["reports"][0]["records"], 2);
    assert!(parsed["records"]["airport"].is_object());
}

#[test]
fn test_parse_missing_path_fails() {
    let mut cmd = Command::cargo_bin("nasr").unwrap();
    cmd.arg("parse").arg("/no/such/distribution");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn test_cycle_from_readme() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let mut cmd = Command::cargo_bin("nasr").unwrap();
    cmd.arg("cycle").arg(dir.path()).arg("--format").arg("fixed");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2023-12-28"));
}

#[test]
fn test_verify_checksum_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("dist.zip");
    std::fs::write(&archive, b"distribution bytes").unwrap();
    let digest = nasr_common::checksum::compute_file_checksum(
        &archive,
        nasr_common::checksum::ChecksumAlgorithm::Sha256,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("nasr").unwrap();
    cmd.arg("verify").arg(&archive).arg("--digest").arg(&digest);
    cmd.assert().success().stdout(predicate::str::contains("OK: sha256"));

    let mut cmd = Command::cargo_bin("nasr").unwrap();
    cmd.arg("verify").arg(&archive).arg("--digest").arg("deadbeef");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Checksum mismatch"));
}
