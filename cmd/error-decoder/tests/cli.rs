//! Integration tests for the error-decoder binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn decoder() -> Command {
    Command::cargo_bin("error-decoder").unwrap()
}

fn fresh_id() -> String {
    zerror::Error::new(404, "USER_NOT_FOUND", "missing")
        .id()
        .to_string()
}

#[test]
fn decodes_single_id() {
    decoder()
        .arg("--no-color")
        .arg(fresh_id())
        .assert()
        .success()
        .stdout(predicate::str::contains("Function:"))
        .stdout(predicate::str::contains(format!("Process:  {}", std::process::id())));
}

#[test]
fn json_output() {
    let output = decoder().arg("--json").arg(fresh_id()).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["kind"], "full");
    assert_eq!(value["process_id"], std::process::id());
    assert!(value["raw"].is_string());
    assert!(value["human_time"].is_string());
}

#[test]
fn verbose_shows_raw_record() {
    decoder()
        .args(["--no-color", "-v"])
        .arg(fresh_id())
        .assert()
        .success()
        .stdout(predicate::str::contains("Raw:"))
        .stdout(predicate::str::contains("Timestamp (ns):"));
}

#[test]
fn invalid_id_fails() {
    decoder()
        .arg("not base64!")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot decode"));
}

#[test]
fn too_few_fields_fails() {
    // "a:b:c"
    decoder()
        .arg("YTpiOmM=")
        .assert()
        .failure()
        .stderr(predicate::str::contains("got 3"));
}

#[test]
fn missing_id_is_usage_error() {
    decoder().assert().failure();
}

#[test]
fn batch_reports_failures_and_succeeds() {
    let input = format!("{}\n\ngarbage!\n{}\n", fresh_id(), fresh_id());
    decoder()
        .args(["--batch", "--no-color"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("=== #3 ==="))
        .stdout(predicate::str::contains("cannot decode"))
        .stdout(predicate::str::contains("3 ids, 1 failed"));
}

#[test]
fn batch_with_no_input() {
    decoder()
        .args(["--batch", "--no-color"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("no ids received"));
}
