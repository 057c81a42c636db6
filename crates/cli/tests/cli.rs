// Copyright 2025 mdpreview-bench Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, UNIX_EPOCH};
use tempfile::TempDir;

const USAGE: &str = "Usage: bench-compare [<before.json> <after.json>]";

fn document(layer: &str, fixtures: &[(&str, f64)]) -> String {
    let results: Vec<serde_json::Value> = fixtures
        .iter()
        .map(|(name, median)| {
            serde_json::json!({
                "fixture": name,
                "cold": {"median": 999.0},
                "warm": {"t2_roundtrip": {"n": 10, "median": median, "p95": median * 1.5}}
            })
        })
        .collect();
    serde_json::json!({
        "meta": {"layer": layer, "timestamp": "2024-01-01T00:00:00", "bench_runs": 10},
        "results": results,
    })
    .to_string()
}

fn write(dir: &Path, name: &str, contents: &str, secs: u64) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
    path
}

fn bench_compare(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bench-compare"))
        .args(args)
        .output()
        .expect("run bench-compare")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn cli_reports_regression() {
    let dir = TempDir::new().unwrap();
    let before = write(dir.path(), "before.json", &document("js", &[("roundtrip", 100.0)]), 1);
    let after = write(dir.path(), "after.json", &document("js", &[("roundtrip", 120.0)]), 2);

    let output = bench_compare(&[before.to_str().unwrap(), after.to_str().unwrap()]);
    assert!(output.status.success());

    let text = stdout(&output);
    let row = text.lines().find(|l| l.contains("roundtrip")).unwrap();
    assert!(row.contains("100.0ms"));
    assert!(row.contains("120.0ms"));
    assert!(row.contains("▲20.0% (+20.0ms)"));
    assert!(row.contains("REGR"));
    assert!(!text.contains('\u{1b}'), "piped output must not be coloured");
    assert!(text.contains("Regressions: 1  Improvements: 0"));
}

#[test]
fn cli_reports_improvement() {
    let dir = TempDir::new().unwrap();
    let before = write(dir.path(), "before.json", &document("js", &[("roundtrip", 100.0)]), 1);
    let after = write(dir.path(), "after.json", &document("js", &[("roundtrip", 80.0)]), 2);

    let output = bench_compare(&[before.to_str().unwrap(), after.to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("▼20.0% (-20.0ms)"));
    assert!(text.contains("IMPR"));
    assert!(text.contains("Regressions: 0  Improvements: 1"));
}

#[test]
fn cli_reports_missing_fixtures() {
    let dir = TempDir::new().unwrap();
    let before = write(dir.path(), "before.json", &document("js", &[("a", 10.0)]), 1);
    let after = write(dir.path(), "after.json", &document("js", &[("b", 10.0)]), 2);

    let output = bench_compare(&[before.to_str().unwrap(), after.to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert_eq!(text.matches("(missing)").count(), 2);
    assert!(text.contains("Regressions: 0  Improvements: 0"));
}

#[test]
fn cli_layer_mismatch_warns_but_succeeds() {
    let dir = TempDir::new().unwrap();
    let before = write(dir.path(), "before.json", &document("js", &[("a", 10.0)]), 1);
    let after = write(dir.path(), "after.json", &document("swift", &[("a", 10.0)]), 2);

    let output = bench_compare(&[before.to_str().unwrap(), after.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Warning: comparing different layers (js vs swift)"));
}

#[test]
fn cli_three_arguments_is_usage_error() {
    let output = bench_compare(&["a.json", "b.json", "c.json"]);
    assert!(!output.status.success());
    let text = stdout(&output);
    assert_eq!(text.trim_end(), USAGE);
    assert!(!text.contains("Regressions"));
}

#[test]
fn cli_single_argument_is_usage_error() {
    let output = bench_compare(&["a.json"]);
    assert!(!output.status.success());
    assert_eq!(stdout(&output).trim_end(), USAGE);
}

#[test]
fn cli_auto_selects_two_most_recent() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "js-bench-2025-01-01.json", &document("js", &[("a", 1.0)]), 1_000);
    write(dir.path(), "js-bench-2025-01-02.json", &document("js", &[("a", 100.0)]), 2_000);
    write(dir.path(), "js-bench-2025-01-03.json", &document("js", &[("a", 104.0)]), 3_000);
    write(dir.path(), "js-bench-latest.json", &document("js", &[("a", 104.0)]), 4_000);

    let output = bench_compare(&["--results-dir", dir.path().to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Auto-selected: comparing last two results"));
    assert!(text.contains("Before: js-bench-2025-01-02.json"));
    assert!(text.contains("After:  js-bench-2025-01-03.json"));
    assert!(text.contains("SAME"));
}

#[test]
fn cli_default_results_dir_does_not_follow_working_directory() {
    let cwd = TempDir::new().unwrap();
    let results = cwd.path().join("benchmark/results");
    fs::create_dir_all(&results).unwrap();
    write(&results, "js-bench-cwd-1.json", &document("js", &[("cwd", 1.0)]), 1_000);
    write(&results, "js-bench-cwd-2.json", &document("js", &[("cwd", 2.0)]), 2_000);

    let output = Command::new(env!("CARGO_BIN_EXE_bench-compare"))
        .current_dir(cwd.path())
        .output()
        .expect("run bench-compare");

    let text = stdout(&output);
    assert!(!text.contains("js-bench-cwd"), "picked up results from the working directory:\n{text}");
    if !output.status.success() {
        let searched = mdpreview_bench::io::default_results_dir();
        assert!(text.contains(&searched.display().to_string()), "{text}");
    }
}

#[test]
fn cli_auto_mode_needs_two_results() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "js-bench-2025-01-01.json", &document("js", &[("a", 1.0)]), 1_000);

    let output = bench_compare(&["--results-dir", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Need at least 2 result files to compare"));
    assert!(text.contains(USAGE));
}

#[test]
fn cli_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let before = write(dir.path(), "before.json", &document("js", &[("a", 1.0)]), 1);
    let missing = dir.path().join("missing.json");

    let output = bench_compare(&[before.to_str().unwrap(), missing.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: Failed to read"));
}

#[test]
fn cli_malformed_document_fails_before_printing() {
    let dir = TempDir::new().unwrap();
    let before = write(dir.path(), "before.json", &document("js", &[("a", 1.0)]), 1);
    let broken = write(
        dir.path(),
        "broken.json",
        r#"{"meta": {"layer": "js"}, "results": []}"#,
        2,
    );

    let output = bench_compare(&[before.to_str().unwrap(), broken.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Malformed result document"));
    assert!(stderr.contains("timestamp"));
}

#[test]
fn cli_markdown_and_json_formats() {
    let dir = TempDir::new().unwrap();
    let before = write(dir.path(), "before.json", &document("js", &[("a", 100.0)]), 1);
    let after = write(dir.path(), "after.json", &document("js", &[("a", 150.0)]), 2);
    let paths = [before.to_str().unwrap(), after.to_str().unwrap()];

    let markdown = bench_compare(&[paths[0], paths[1], "--format", "markdown"]);
    assert!(markdown.status.success());
    let md = stdout(&markdown);
    assert!(md.contains("| a | 100.0ms | 150.0ms | ▲50.0% (+50.0ms) | REGR |"));

    let json = bench_compare(&[paths[0], paths[1], "--format", "json", "--stat", "p95"]);
    assert!(json.status.success());
    let value: serde_json::Value = serde_json::from_slice(&json.stdout).unwrap();
    assert_eq!(value["statistic"], "p95");
    assert_eq!(value["rows"][0]["before_ms"], 150.0);
    assert_eq!(value["regressions"], 1);
}

#[test]
fn cli_does_not_panic_on_broken_pipe() {
    let dir = TempDir::new().unwrap();
    let before = write(dir.path(), "before.json", &document("js", &[("a", 100.0)]), 1);
    let after = write(dir.path(), "after.json", &document("js", &[("a", 150.0)]), 2);

    let mut child = Command::new(env!("CARGO_BIN_EXE_bench-compare"))
        .arg(&before)
        .arg(&after)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn bench-compare");

    // Closing the read end forces stdout writes to fail with BrokenPipe.
    drop(child.stdout.take());

    let output = child.wait_with_output().expect("wait for bench-compare");
    assert!(
        output.status.success(),
        "expected success even when stdout is closed\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
}
