//! End-to-end tests for the `wl` binary.
//!
//! Tests the full pipeline: record file → sessions → ticket matches → output.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn wl_binary() -> String {
    env!("CARGO_BIN_EXE_wl").to_string()
}

const RECORDS: &str = r#"{"data": [
    {"start_date": "2025-01-15T09:00:00Z", "end_date": "2025-01-15T09:20:00Z",
     "duration": 1200, "project": {"title": "webapp"}, "title": "Fix login bug"},
    {"start_date": "2025-01-15T09:25:00Z", "end_date": "2025-01-15T09:50:00Z",
     "duration": 1500, "project": {"title": "webapp"}, "title": "Fix login bug",
     "notes": "Redirect loop tracked in PROJ-482"},
    {"start_date": "2025-01-15T11:00:00Z", "end_date": "2025-01-15T11:03:00Z",
     "duration": 180, "project": {"title": "docs"}, "title": "Typo"},
    {"start_date": "not a timestamp", "end_date": "2025-01-15T12:00:00Z"}
]}"#;

const TICKETS: &str = r#"{"issues": [
    {"key": "PROJ-482", "fields": {
        "summary": "Fix login redirect loop",
        "status": {"name": "In Progress"},
        "issuetype": {"name": "Bug"},
        "assignee": {"displayName": "Sam Rivera"}
    }},
    {"key": "PROJ-500", "fields": {
        "summary": "Fix login bug on mobile",
        "status": {"name": "Done"},
        "assignee": {"displayName": "Sam Rivera"}
    }},
    {"key": "PROJ-510", "fields": {
        "summary": "Billing page copy",
        "status": {"name": "To Do"}
    }}
]}"#;

/// Write the fixture files and return their paths.
fn fixtures(temp: &Path) -> (PathBuf, PathBuf) {
    let records = temp.join("records.json");
    let tickets = temp.join("tickets.json");
    std::fs::write(&records, RECORDS).unwrap();
    std::fs::write(&tickets, TICKETS).unwrap();
    (records, tickets)
}

/// Run `wl` isolated from the user's config.
fn wl(temp: &Path, args: &[&str]) -> Output {
    Command::new(wl_binary())
        .env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join(".config"))
        .args(args)
        .output()
        .expect("failed to run wl")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "wl should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_analyze_matches_open_ticket() {
    let temp = TempDir::new().unwrap();
    let (records, tickets) = fixtures(temp.path());

    let output = wl(
        temp.path(),
        &[
            "analyze",
            "--records",
            records.to_str().unwrap(),
            "--tickets",
            tickets.to_str().unwrap(),
            "--json",
        ],
    );
    let report = json_stdout(&output);

    assert_eq!(report["status"], "has_activity");
    assert_eq!(report["session_count"], 1);
    assert_eq!(report["total_work_secs"], 3000);

    // PROJ-500 would also clear the threshold but is filtered out by status
    let matched = &report["outcomes"][0]["match"];
    assert_eq!(matched["ticket_key"], "PROJ-482");
    assert!(matched["confidence"].as_f64().unwrap() > 0.3);

    assert_eq!(report["ticket_updates"][0]["ticket"], "PROJ-482");
    assert_eq!(report["worklogs"].as_array().unwrap().len(), 1);

    let warnings = report["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0]["index"], 3);
}

#[test]
fn test_analyze_without_tickets_leaves_sessions_unmatched() {
    let temp = TempDir::new().unwrap();
    let (records, _) = fixtures(temp.path());

    let output = wl(
        temp.path(),
        &["analyze", "--records", records.to_str().unwrap(), "--json"],
    );
    let report = json_stdout(&output);

    assert_eq!(report["session_count"], 1);
    assert!(report["outcomes"][0]["match"].is_null());
    assert_eq!(report["unmatched_sessions"], serde_json::json!([0]));
}

#[test]
fn test_analyze_since_filters_everything() {
    let temp = TempDir::new().unwrap();
    let (records, tickets) = fixtures(temp.path());

    let output = wl(
        temp.path(),
        &[
            "analyze",
            "--records",
            records.to_str().unwrap(),
            "--tickets",
            tickets.to_str().unwrap(),
            "--since",
            "2025-01-16T00:00:00Z",
            "--json",
        ],
    );
    let report = json_stdout(&output);

    assert_eq!(report["status"], "no_activity");
    assert_eq!(report["summary"], "No work sessions detected");
}

#[test]
fn test_sessions_respects_min_duration_override() {
    let temp = TempDir::new().unwrap();
    let (records, _) = fixtures(temp.path());

    let output = wl(
        temp.path(),
        &[
            "sessions",
            "--records",
            records.to_str().unwrap(),
            "--min-duration",
            "60",
            "--json",
        ],
    );
    let listing = json_stdout(&output);

    // The three-minute docs session survives a one-minute floor
    assert_eq!(listing["session_count"], 2);
    assert_eq!(listing["sessions"][1]["primary_project"], "docs");
}

#[test]
fn test_config_file_sets_threshold() {
    let temp = TempDir::new().unwrap();
    let (records, tickets) = fixtures(temp.path());
    let config = temp.path().join("wl.toml");
    std::fs::write(&config, "min_confidence = 1.0\n").unwrap();

    let output = wl(
        temp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "analyze",
            "--records",
            records.to_str().unwrap(),
            "--tickets",
            tickets.to_str().unwrap(),
            "--json",
        ],
    );
    let report = json_stdout(&output);

    assert!(report["outcomes"][0]["match"].is_null());
}

#[test]
fn test_human_output() {
    let temp = TempDir::new().unwrap();
    let (records, tickets) = fixtures(temp.path());

    let output = wl(
        temp.path(),
        &[
            "analyze",
            "--records",
            records.to_str().unwrap(),
            "--tickets",
            tickets.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Match: PROJ-482"));
    assert!(stdout.contains("SKIPPED RECORDS"));
}

#[test]
fn test_missing_records_file_fails() {
    let temp = TempDir::new().unwrap();

    let output = wl(
        temp.path(),
        &["analyze", "--records", "/nonexistent/records.json"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
}

#[test]
fn test_huge_gap_keeps_everything_in_one_session() {
    let temp = TempDir::new().unwrap();
    let (records, _) = fixtures(temp.path());

    let output = wl(
        temp.path(),
        &[
            "sessions",
            "--records",
            records.to_str().unwrap(),
            "--max-gap",
            "999999999999999999",
            "--json",
        ],
    );
    let listing = json_stdout(&output);

    assert_eq!(listing["session_count"], 1);
    assert_eq!(listing["sessions"][0]["total_duration_secs"], 2 * 3600 + 3 * 60);
}

#[test]
fn test_negative_gap_is_rejected() {
    let temp = TempDir::new().unwrap();
    let (records, _) = fixtures(temp.path());

    let output = wl(
        temp.path(),
        &["sessions", "--records", records.to_str().unwrap(), "--max-gap=-5"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("max_gap_minutes cannot be negative"));
}
