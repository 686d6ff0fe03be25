use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_looker_download_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("looker-download")
}

fn batch_command() -> Command {
    let mut cmd = Command::new(get_looker_download_bin());
    cmd.arg("download-reports")
        .args(["--host", "https://looker.example.com"])
        .args(["--username", "me", "--password", "secret"])
        .args(["--chrome-path", "/nonexistent/chrome"]);
    cmd
}

#[test]
fn test_download_reports_command_help() {
    let mut cmd = Command::new(get_looker_download_bin());
    cmd.arg("download-reports")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download multiple reports from Looker"))
        .stdout(predicate::str::contains("--input"));
}

#[test]
fn test_missing_batch_file_fails_before_launch() {
    batch_command()
        .args(["--input", "/nonexistent/reports.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read report batch"))
        .stderr(predicate::str::contains("Chrome not found").not());
}

#[test]
fn test_malformed_batch_file_fails_before_launch() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("reports.json");
    std::fs::write(&input, r#"[{"report": 1, "filter": {}}]"#).unwrap();

    batch_command()
        .arg("--input")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read report batch"))
        .stderr(predicate::str::contains("destination"));
}

#[test]
fn test_empty_batch_succeeds_without_browser() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("reports.json");
    std::fs::write(&input, "[]").unwrap();

    batch_command()
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("No reports listed"));
}

#[test]
fn test_valid_batch_reaches_browser_launch() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("reports.json");
    let destination = dir.path().join("report.csv");
    std::fs::write(
        &input,
        format!(
            r#"[{{"report": 42, "filter": {{"Year": "Current Year"}}, "destination": {}}}]"#,
            serde_json::to_string(&destination).unwrap()
        ),
    )
    .unwrap();

    batch_command()
        .arg("--input")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Chrome not found"));

    assert!(!destination.exists());
}
