//! End-to-end tests driving the `mtag` binary.
//!
//! Each test points the database at a fresh temp dir and runs the full
//! flow: log focus → categorize → tag → inspect the day → untag.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn mtag_binary() -> String {
    env!("CARGO_BIN_EXE_mtag").to_string()
}

fn mtag(home: &Path, args: &[&str]) -> Command {
    let mut command = Command::new(mtag_binary());
    command
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("MTAG_DATABASE_PATH", home.join("data/mtag.db"))
        .env_remove("RUST_LOG")
        .args(args);
    command
}

fn run_ok(home: &Path, args: &[&str]) -> String {
    let output = mtag(home, args).output().expect("failed to run mtag");
    assert_success(&output, args);
    String::from_utf8(output.stdout).unwrap()
}

fn assert_success(output: &Output, args: &[&str]) {
    assert!(
        output.status.success(),
        "mtag {} should succeed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_log_merges_repeated_focus() {
    let temp = TempDir::new().unwrap();

    run_ok(
        temp.path(),
        &["log", "--app", "term", "--title", "vim", "--at", "2024-03-05T09:00:00"],
    );
    let second = run_ok(
        temp.path(),
        &["log", "--app", "term", "--title", "vim", "--at", "2024-03-05T09:00:03"],
    );
    assert!(second.contains("Extended term => vim to 09:00:03"), "{second}");

    let status = run_ok(temp.path(), &["status"]);
    assert!(status.contains("Logged entries: 1"), "{status}");
    assert!(temp.path().join("data/mtag.db").exists());
}

#[test]
fn test_tag_day_and_untag_flow() {
    let temp = TempDir::new().unwrap();
    let home = temp.path();

    run_ok(home, &["categories", "add", "Work"]);
    run_ok(home, &["categories", "add", "Coding", "--parent", "work"]);

    let tagged = run_ok(
        home,
        &[
            "tag", "--date", "2024-03-05", "--from", "09:00", "--to", "10:30", "--category",
            "Coding",
        ],
    );
    assert!(tagged.contains("Tagged 09:00:00 - 10:30:00 as Coding (1h 30m)"), "{tagged}");

    // Overlapping drag is clamped to the start of the existing entry.
    let clamped = run_ok(
        home,
        &[
            "tag", "--date", "2024-03-05", "--from", "08:30", "--to", "09:15", "--category",
            "Work",
        ],
    );
    assert!(clamped.contains("Tagged 08:30:00 - 09:00:00 as Work (30m)"), "{clamped}");

    let report = run_ok(home, &["day", "--date", "2024-03-05"]);
    assert!(report.contains("Summary:"), "{report}");
    assert!(report.contains("Coding  1h 30m"), "{report}");
    assert!(report.contains("Work    30m"), "{report}");

    let removed = run_ok(home, &["untag", "--date", "2024-03-05", "--at", "09:45"]);
    assert!(removed.contains("Removed 09:00:00 - 10:30:00 (Coding)"), "{removed}");

    let status = run_ok(home, &["status"]);
    assert!(status.contains("Tagged entries: 1"), "{status}");
    assert!(status.contains("Categories: 2"), "{status}");
}

#[test]
fn test_tag_prompts_for_category_on_stdin() {
    let temp = TempDir::new().unwrap();
    let args = ["tag", "--date", "2024-03-05", "--from", "14:00", "--to", "15:00"];

    let mut child = mtag(temp.path(), &args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn mtag");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"Reading\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert_success(&output, &args);

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("as Reading (1h 0m)"), "{stdout}");
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Category: "), "{stderr}");

    let categories = run_ok(temp.path(), &["categories", "list"]);
    assert!(categories.starts_with("Reading  #"), "{categories}");
}

#[test]
fn test_day_json_output() {
    let temp = TempDir::new().unwrap();

    run_ok(
        temp.path(),
        &["log", "--app", "firefox", "--title", "Docs", "--at", "2024-03-05T13:00:00"],
    );
    let output = run_ok(temp.path(), &["day", "--date", "2024-03-05", "--json"]);

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["logged_entries"][0]["window"]["title"], "Docs");
    assert!(value["summary"].as_array().unwrap().is_empty());
}

#[test]
fn test_invalid_time_fails() {
    let temp = TempDir::new().unwrap();

    let output = mtag(
        temp.path(),
        &["tag", "--from", "9am", "--to", "10:00", "--category", "Work"],
    )
    .output()
    .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Invalid time: 9am"), "{stderr}");
}
