//! Integration tests for repotally CLI

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::tempdir;

fn run_repotally(args: &[&str]) -> (String, String, bool) {
    let mut cmd_args = vec!["run", "-p", "repotally", "--"];
    cmd_args.extend(args);

    let output = Command::new("cargo")
        .args(&cmd_args)
        .current_dir(env!("CARGO_MANIFEST_DIR").to_string() + "/..")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn files_with_suffix(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.to_string_lossy().ends_with(suffix))
        .collect()
}

/// Analyze the fixture catalog offline and return the payload path.
fn write_payload(dir: &Path) -> String {
    let catalog = fixture("catalog.json");
    let out = dir.to_string_lossy().to_string();
    let (_, stderr, success) = run_repotally(&[
        "analyze",
        "octo",
        "--catalog",
        &catalog,
        "--sample",
        "0",
        "--no-html",
        "--output-dir",
        &out,
    ]);
    assert!(success, "analyze failed: {}", stderr);
    let payloads = files_with_suffix(dir, ".json");
    assert_eq!(payloads.len(), 1);
    payloads[0].to_string_lossy().to_string()
}

#[test]
fn test_cli_help() {
    let (stdout, _, success) = run_repotally(&["--help"]);

    assert!(success);
    assert!(stdout.contains("repotally"));
    assert!(stdout.contains("--sample"));
    assert!(stdout.contains("--last-days"));
    assert!(stdout.contains("--output"));
    assert!(stdout.contains("view"));
}

#[test]
fn test_cli_version() {
    let (stdout, _, success) = run_repotally(&["--version"]);

    assert!(success);
    assert!(stdout.contains("repotally"));
}

#[test]
fn test_analyze_writes_data_and_report() {
    let dir = tempdir().unwrap();
    let catalog = fixture("catalog.json");
    let out = dir.path().to_string_lossy().to_string();

    let (stdout, stderr, success) = run_repotally(&[
        "octo",
        "--catalog",
        &catalog,
        "--sample",
        "0",
        "--output-dir",
        &out,
    ]);

    assert!(success, "stderr: {}", stderr);
    assert!(stdout.contains("Overview"));
    assert!(stdout.contains("Repositories"));
    assert!(stdout.contains("Languages"));
    assert!(stdout.contains("Created per year"));
    assert!(stdout.contains("Recent months"));
    assert!(stdout.contains("Recently created"));
    assert!(stdout.contains("Oldest"));
    assert!(stdout.contains("Saved"));
    // Progress goes to stderr, keeping stdout clean
    assert!(stderr.contains("fetched 10 repositories"));

    let data = files_with_suffix(dir.path(), ".json");
    let html = files_with_suffix(dir.path(), ".html");
    assert_eq!(data.len(), 1);
    assert_eq!(html.len(), 1);
    assert!(data[0]
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("github_data_octo_"));
    assert!(fs::read_to_string(&html[0])
        .unwrap()
        .contains("const REPOS = ["));
}

#[test]
fn test_analyze_json_output() {
    let dir = tempdir().unwrap();
    let catalog = fixture("catalog.json");
    let out = dir.path().to_string_lossy().to_string();

    let (stdout, _, success) = run_repotally(&[
        "analyze",
        "octo",
        "--catalog",
        &catalog,
        "--sample",
        "0",
        "--no-html",
        "--output-dir",
        &out,
        "--output",
        "json",
    ]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(parsed["username"], "octo");
    assert_eq!(parsed["stats"]["total"], 10);
    assert_eq!(parsed["stats"]["public"], 6);
    assert_eq!(parsed["stats"]["private"], 4);
    assert_eq!(parsed["stats"]["lines"]["total_lines"], 0);
    assert_eq!(parsed["repos"].as_array().unwrap().len(), 10);
    assert!(files_with_suffix(dir.path(), ".html").is_empty());
}

#[test]
fn test_catalog_run_skips_sampling_by_default() {
    let dir = tempdir().unwrap();
    let catalog = fixture("catalog.json");
    let out = dir.path().to_string_lossy().to_string();

    let (stdout, stderr, success) = run_repotally(&[
        "octo",
        "--catalog",
        &catalog,
        "--no-html",
        "--output-dir",
        &out,
        "--output",
        "json",
    ]);

    assert!(success, "stderr: {}", stderr);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(parsed["stats"]["total"], 10);
    assert_eq!(parsed["stats"]["lines"]["total_lines"], 0);
    assert!(!stderr.contains("estimating lines"));
}

#[test]
fn test_analyze_with_date_range() {
    let dir = tempdir().unwrap();
    let catalog = fixture("catalog.json");
    let out = dir.path().to_string_lossy().to_string();

    let (stdout, _, success) = run_repotally(&[
        "analyze",
        "octo",
        "--catalog",
        &catalog,
        "--sample",
        "0",
        "--no-html",
        "--output-dir",
        &out,
        "--start-date",
        "2024-01-01",
        "--output",
        "json",
    ]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    assert_eq!(parsed["stats"]["total"], 5);
    assert_eq!(parsed["date_filter"], "from 2024-01-01");
}

#[test]
fn test_analyze_empty_date_window_fails() {
    let dir = tempdir().unwrap();
    let catalog = fixture("catalog.json");
    let out = dir.path().to_string_lossy().to_string();

    let (_, stderr, success) = run_repotally(&[
        "octo",
        "--catalog",
        &catalog,
        "--sample",
        "0",
        "--output-dir",
        &out,
        "--end-date",
        "2000-01-01",
    ]);

    assert!(!success);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("no repositories matched the date filter"));
}

#[test]
fn test_invalid_date_is_rejected() {
    let catalog = fixture("catalog.json");
    let (_, stderr, success) = run_repotally(&[
        "octo",
        "--catalog",
        &catalog,
        "--sample",
        "0",
        "--start-date",
        "2024-13-45",
    ]);

    assert!(!success);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("2024-13-45"));
}

#[test]
fn test_missing_catalog_file() {
    let (_, stderr, success) = run_repotally(&[
        "octo",
        "--catalog",
        "/nonexistent/catalog.json",
        "--sample",
        "0",
    ]);

    assert!(!success);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_view_table_output() {
    let dir = tempdir().unwrap();
    let payload = write_payload(dir.path());

    let (stdout, _, success) = run_repotally(&["view", &payload]);

    assert!(success);
    assert!(stdout.contains("Summary"));
    assert!(stdout.contains("Showing all 10"));
    assert!(stdout.contains("Timeline"));
    assert!(stdout.contains("By size"));
    assert!(stdout.contains("By language"));
    assert!(stdout.contains("Page 1 / 1"));
}

#[test]
fn test_view_filter_by_language() {
    let dir = tempdir().unwrap();
    let payload = write_payload(dir.path());

    let (stdout, _, success) = run_repotally(&[
        "view",
        &payload,
        "--language",
        "Rust",
        "--view",
        "language",
    ]);

    assert!(success);
    assert!(stdout.contains("Showing 4 of 10"));
    assert!(stdout.contains("Rust (4)"));
    assert!(!stdout.contains("Python"));
}

#[test]
fn test_view_paging() {
    let dir = tempdir().unwrap();
    let payload = write_payload(dir.path());

    let (stdout, _, success) = run_repotally(&[
        "view",
        &payload,
        "--view",
        "timeline",
        "--page-size",
        "3",
        "--page",
        "2",
    ]);

    assert!(success);
    assert!(stdout.contains("Page 2 / 4"));
    assert!(stdout.contains("< 1 [2] 3 4 >"));
}

#[test]
fn test_view_out_of_range_page_keeps_first() {
    let dir = tempdir().unwrap();
    let payload = write_payload(dir.path());

    let (stdout, stderr, success) = run_repotally(&[
        "view",
        &payload,
        "--view",
        "timeline",
        "--page-size",
        "3",
        "--page",
        "9",
    ]);

    assert!(success);
    assert!(stdout.contains("Page 1 / 4"));
    assert!(stderr.contains("out of range"));
}

#[test]
fn test_view_json_output() {
    let dir = tempdir().unwrap();
    let payload = write_payload(dir.path());

    let (stdout, _, success) = run_repotally(&[
        "view",
        &payload,
        "--visibility",
        "private",
        "--output",
        "json",
    ]);

    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Invalid JSON output");
    let tables = parsed.as_array().unwrap();
    assert_eq!(tables.len(), 4);
    assert_eq!(tables[0]["title"], "Summary");
    assert_eq!(tables[0]["rows"][0]["values"][0], "4");
    assert!(tables[1].get("headers").is_some());
    assert!(tables[1]["footer"].get("label").is_some());
}

#[test]
fn test_view_missing_payload() {
    let (_, stderr, success) = run_repotally(&["view", "/nonexistent/payload.json"]);

    assert!(!success);
    assert!(stderr.contains("Error:"));
}
