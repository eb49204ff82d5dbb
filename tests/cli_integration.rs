//! Integration tests for the `vtodo` CLI.
//!
//! Each test copies fixtures into a temp directory, runs `vtodo` as a
//! subprocess, and checks stdout, the exit status, or written files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Get the path to the built `vtodo` binary.
fn vtodo_bin() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("vtodo");
    path
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Copy a fixture into `dir`, returning the copy's file name
fn copy_fixture(dir: &Path, name: &str) -> String {
    fs::copy(fixture(name), dir.join(name)).unwrap();
    name.to_string()
}

fn write_config(dir: &Path, text: &str) {
    fs::write(dir.join("vtodo.toml"), text).unwrap();
}

/// Run `vtodo` with args, return (stdout, stderr, success).
fn run_vtodo(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(vtodo_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("VTODO_LOG")
        .output()
        .expect("failed to run vtodo");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `vtodo` expecting success, return stdout.
fn run_vtodo_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_vtodo(dir, args);
    if !success {
        panic!(
            "vtodo {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

const PARIS: &str = "[timezones]\n\"Europe/Paris\" = \"+01:00\"\n";

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[test]
fn test_show_sorted_by_due() {
    let tmp = TempDir::new().unwrap();
    let file = copy_fixture(tmp.path(), "messy.ics");
    write_config(tmp.path(), PARIS);

    let out = run_vtodo_ok(tmp.path(), &["--config", "vtodo.toml", "show", &file]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("-"));
    assert!(lines[0].ends_with("Someday  [someday@home.org]"));
    assert!(lines[1].starts_with("20240302T140000Z"));
    assert!(lines[1].contains("Laundry"));
    assert!(lines[2].starts_with("20240302T170000Z  P5  Buy groceries, milk"));
}

#[test]
fn test_show_json() {
    let tmp = TempDir::new().unwrap();
    let file = copy_fixture(tmp.path(), "canonical.ics");

    let out = run_vtodo_ok(tmp.path(), &["show", &file, "--json"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    let todos = json.as_array().unwrap();
    assert_eq!(todos.len(), 2);

    let standup = &todos[0];
    assert_eq!(standup["uid"], "standup@work.org");
    assert_eq!(standup["duration"], "PT30M");
    assert_eq!(standup["due"], "2024-03-01T09:30:00+00:00");
    assert_eq!(standup["unused"], 1);

    let taxes = &todos[1];
    assert_eq!(taxes["name"], "File taxes");
    assert_eq!(taxes["percent"], 100);
    assert_eq!(taxes["alarms"][0]["action"], "DISPLAY");
    assert_eq!(taxes["alarms"][0]["trigger"], "-P1D");
}

#[test]
fn test_show_unknown_tzid_reads_utc() {
    let tmp = TempDir::new().unwrap();
    let file = copy_fixture(tmp.path(), "messy.ics");

    let (stdout, stderr, success) = run_vtodo(tmp.path(), &["show", &file]);
    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("20240302T180000Z  P5  Buy groceries, milk"));
    assert!(stderr.contains("unknown TZID"));
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

#[test]
fn test_normalize_canonical_is_unchanged() {
    let tmp = TempDir::new().unwrap();
    let file = copy_fixture(tmp.path(), "canonical.ics");

    let out = run_vtodo_ok(tmp.path(), &["normalize", &file]);
    assert_eq!(out, fs::read_to_string(fixture("canonical.ics")).unwrap());
}

#[test]
fn test_normalize_to_file() {
    let tmp = TempDir::new().unwrap();
    let file = copy_fixture(tmp.path(), "messy.ics");
    write_config(tmp.path(), PARIS);

    let stdout = run_vtodo_ok(
        tmp.path(),
        &["-c", "vtodo.toml", "normalize", &file, "-o", "out.ics"],
    );
    assert!(stdout.is_empty());

    let written = fs::read_to_string(tmp.path().join("out.ics")).unwrap();
    assert!(written.contains("DTSTART:20240302T090000Z\r\n"));
    assert!(written.contains("BEGIN:VEVENT\r\nUID:event-1\r\n"));
    assert!(!written.contains("TZID"));

    // Unclaimed lines follow the alarm in their original order
    let alarm_end = written.find("END:VALARM").unwrap();
    let first = written.find("X-FIRST:kept").unwrap();
    let categories = written.find("CATEGORIES:errands").unwrap();
    let last = written.find("X-LAST:also kept").unwrap();
    assert!(alarm_end < first && first < categories && categories < last);
}

#[test]
fn test_normalize_aborts_on_malformed_todo() {
    let tmp = TempDir::new().unwrap();
    let file = copy_fixture(tmp.path(), "invalid.ics");

    let (_, stderr, success) = run_vtodo(tmp.path(), &["normalize", &file]);
    assert!(!success);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("PRIORITY"));
}

#[test]
fn test_normalize_skip_keeps_malformed_verbatim() {
    let tmp = TempDir::new().unwrap();
    let file = copy_fixture(tmp.path(), "invalid.ics");
    write_config(tmp.path(), "[parse]\non_error = \"skip\"\n");

    let out = run_vtodo_ok(tmp.path(), &["-c", "vtodo.toml", "normalize", &file]);
    assert!(out.contains("PRIORITY:12\r\n"));
    assert!(out.contains("SUMMARY:Nameless\r\n"));
    assert!(out.contains("UID:good@home.org\r\nCOMPLETED:"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn test_check_valid_file() {
    let tmp = TempDir::new().unwrap();
    let file = copy_fixture(tmp.path(), "canonical.ics");

    let out = run_vtodo_ok(tmp.path(), &["check", &file]);
    assert_eq!(out.trim(), "2 of 2 todos valid");
}

#[test]
fn test_check_reports_failures() {
    let tmp = TempDir::new().unwrap();
    let file = copy_fixture(tmp.path(), "invalid.ics");

    let (stdout, stderr, success) = run_vtodo(tmp.path(), &["check", &file]);
    assert!(!success);
    assert!(stdout.contains("#2 [loud@home.org]"));
    assert!(stdout.contains("#3: missing required property UID"));
    assert!(stdout.contains("1 of 3 todos valid"));
    assert!(stderr.contains("2 malformed todo(s)"));
}

#[test]
fn test_check_json() {
    let tmp = TempDir::new().unwrap();
    let file = copy_fixture(tmp.path(), "invalid.ics");

    let (stdout, _, success) = run_vtodo(tmp.path(), &["check", &file, "--json"]);
    assert!(!success);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["total"], 3);
    assert_eq!(json["valid"], 1);
    assert_eq!(json["failures"][0]["index"], 2);
    assert_eq!(json["failures"][0]["uid"], "loud@home.org");
    assert!(json["failures"][1].get("uid").is_none());
}

// ---------------------------------------------------------------------------
// overlaps
// ---------------------------------------------------------------------------

#[test]
fn test_overlaps() {
    let tmp = TempDir::new().unwrap();
    let file = copy_fixture(tmp.path(), "messy.ics");
    write_config(tmp.path(), PARIS);

    let out = run_vtodo_ok(tmp.path(), &["-c", "vtodo.toml", "overlaps", &file]);
    assert_eq!(
        out.trim(),
        "groceries@home.org (Buy groceries, milk)  ^  laundry@home.org (Laundry)"
    );

    let json = run_vtodo_ok(
        tmp.path(),
        &["-c", "vtodo.toml", "--json", "overlaps", &file],
    );
    let pairs: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(pairs[0]["first"], "groceries@home.org");
    assert_eq!(pairs[0]["second"], "laundry@home.org");
}

#[test]
fn test_overlaps_skip_policy() {
    let tmp = TempDir::new().unwrap();
    let file = copy_fixture(tmp.path(), "invalid.ics");
    write_config(tmp.path(), "[parse]\non_error = \"skip\"\n");

    let (stdout, stderr, success) =
        run_vtodo(tmp.path(), &["-c", "vtodo.toml", "overlaps", &file]);
    assert!(success);
    assert_eq!(stdout.trim(), "No overlapping todos.");
    assert!(stderr.contains("skipping malformed VTODO"));
}

// ---------------------------------------------------------------------------
// errors
// ---------------------------------------------------------------------------

#[test]
fn test_missing_file() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_vtodo(tmp.path(), &["show", "nope.ics"]);
    assert!(!success);
    assert!(stderr.contains("could not read nope.ics"));
}

#[test]
fn test_unbalanced_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("bad.ics"), "BEGIN:VTODO\r\nUID:x\r\n").unwrap();
    let (_, stderr, success) = run_vtodo(tmp.path(), &["check", "bad.ics"]);
    assert!(!success);
    assert!(stderr.contains("component VTODO is never closed"));
}

#[test]
fn test_bad_config() {
    let tmp = TempDir::new().unwrap();
    let file = copy_fixture(tmp.path(), "canonical.ics");
    write_config(tmp.path(), "[timezones]\nMars = \"later\"\n");
    let (_, stderr, success) = run_vtodo(tmp.path(), &["-c", "vtodo.toml", "show", &file]);
    assert!(!success);
    assert!(stderr.contains("bad timezone offset"));
}
