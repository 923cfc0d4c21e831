//! Basic CLI E2E tests.
//!
//! Each test drives the built binary against its own temporary data dir.

use std::path::Path;
use std::process::Command;

const WEEK: &str = "2026-W42";

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_lifeplan"))
        .args(args)
        .env("LIFEPLAN_DATA_DIR", data_dir)
        .env_remove("LIFEPLAN_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

/// Last whitespace-separated token of the first line, e.g. a created ID.
fn created_id(stdout: &str) -> String {
    stdout
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().last())
        .expect("no id in output")
        .to_string()
}

#[test]
fn test_goal_template_generate_flow() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path();

    let id = created_id(&run_ok(
        data,
        &["goal", "add", "Learn cello", "--category", "passion", "--horizon", "near-term"],
    ));
    run_ok(
        data,
        &[
            "template", "add", &id, "--key", "practice", "--label", "Practice", "--minutes", "60",
            "--day", "mon", "--start", "09:00",
        ],
    );

    let stdout = run_ok(data, &["plan", "generate", "--week", WEEK]);
    assert!(stdout.contains("1 desired, 0 kept, 1 placed, 0 dropped"), "{stdout}");
    let stdout = run_ok(data, &["plan", "generate", "--week", WEEK]);
    assert!(stdout.contains("1 desired, 1 kept, 0 placed, 0 dropped"), "{stdout}");

    let shown = run_ok(data, &["plan", "show", "--week", WEEK, "--json"]);
    let occurrences: serde_json::Value = serde_json::from_str(&shown).unwrap();
    let occurrences = occurrences.as_array().unwrap();
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0]["start"], "09:00");
    assert_eq!(occurrences[0]["fixed"], true);
    assert_eq!(occurrences[0]["source"], "goal");

    let slot = run_ok(data, &["plan", "slot", "mon", "09:00", "30", "--week", WEEK]);
    assert_eq!(slot.trim(), "10:00");

    let board = run_ok(data, &["board", "show", "--json"]);
    let board: serde_json::Value = serde_json::from_str(&board).unwrap();
    assert_eq!(board[0]["tier"], "active");
    assert_eq!(board[0]["partition"]["horizon"], "near-term");

    let stdout = run_ok(data, &["goal", "delete", &id]);
    assert!(stdout.contains("Deleted 1 goal(s)"));
    let shown = run_ok(data, &["plan", "show", "--week", WEEK, "--json"]);
    assert_eq!(shown.trim(), "[]");
}

#[test]
fn test_unknown_goal_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["goal", "child", "missing", "Orphan"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "{stderr}");
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path();

    assert_eq!(run_ok(data, &["config", "get", "planner.snap_minutes"]).trim(), "15");
    run_ok(data, &["config", "set", "planner.snap_minutes", "30"]);
    assert_eq!(run_ok(data, &["config", "get", "planner.snap_minutes"]).trim(), "30");

    let (_, stderr, code) = run_cli(data, &["config", "set", "planner.snap_minutes", "7"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("planner.snap_minutes"), "{stderr}");
    assert!(data.join("config.toml").exists());
}

#[test]
fn test_system_schedule_appends() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path();

    let id = created_id(&run_ok(
        data,
        &[
            "system", "add", "Chores", "--key", "laundry", "--label", "Laundry", "--minutes", "45",
            "--times", "2", "--days", "sat,sun",
        ],
    ));
    let stdout = run_ok(data, &["schedule", "system", &id, "--week", WEEK]);
    assert!(stdout.contains("Scheduled 2 occurrence(s)"), "{stdout}");
    run_ok(data, &["schedule", "system", &id, "--week", WEEK]);

    let shown = run_ok(data, &["plan", "show", "--week", WEEK, "--json"]);
    let occurrences: serde_json::Value = serde_json::from_str(&shown).unwrap();
    assert_eq!(occurrences.as_array().unwrap().len(), 4);

    // regeneration leaves manual occurrences alone
    run_ok(data, &["plan", "generate", "--week", WEEK]);
    let again = run_ok(data, &["plan", "show", "--week", WEEK, "--json"]);
    assert_eq!(shown, again);
}

#[test]
fn test_pure_play_booking() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path();

    let id = created_id(&run_ok(data, &["play", "add", "Lazy river", "--minutes", "90"]));
    let stdout = run_ok(data, &["play", "tokens"]);
    assert!(stdout.starts_with("3/3 tokens left"), "{stdout}");

    run_ok(data, &["play", "book", &id, "sat", "14:00", "--week", WEEK]);
    let (_, stderr, code) = run_cli(data, &["play", "book", &id, "sat", "15:00", "--week", WEEK]);
    assert_eq!(code, 1);
    assert!(stderr.contains("already taken"), "{stderr}");

    let stdout = run_ok(data, &["play", "tokens"]);
    assert!(stdout.starts_with("2/3 tokens left"), "{stdout}");
}
