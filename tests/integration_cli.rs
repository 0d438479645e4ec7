//! Integration tests exercising CLI commands end-to-end.
//!
//! These tests invoke the real `orrery` binary to verify command output
//! and the snapshot left on disk.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;
use orrery::graph::{Point, Status};
use orrery::parser::load_graph;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn orrery_binary() -> PathBuf {
    let mut path = std::env::current_exe().expect("could not get current exe path");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("orrery");
    assert!(
        path.exists(),
        "orrery binary not found at {:?}. Run `cargo build` first.",
        path
    );
    path
}

fn orrery_cmd(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(orrery_binary())
        .arg("--dir")
        .arg(dir)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .unwrap_or_else(|e| panic!("Failed to run orrery {:?}: {}", args, e))
}

fn orrery_ok(dir: &Path, args: &[&str]) -> String {
    let output = orrery_cmd(dir, args);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    assert!(
        output.status.success(),
        "orrery {:?} failed.\nstdout: {}\nstderr: {}",
        args,
        stdout,
        stderr
    );
    stdout
}

fn orrery_fail(dir: &Path, args: &[&str]) -> String {
    let output = orrery_cmd(dir, args);
    assert!(
        !output.status.success(),
        "orrery {:?} unexpectedly succeeded",
        args
    );
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn orrery_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let stdout = orrery_ok(dir, &full);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("bad JSON {}: {}", e, stdout))
}

/// Initialized project with a diamond a -> {b, c} -> d
fn diamond_project() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(".orrery");
    orrery_ok(&dir, &["init"]);
    orrery_ok(&dir, &["add", "Start", "--id", "a"]);
    orrery_ok(&dir, &["add", "Left", "--id", "b", "--after", "a"]);
    orrery_ok(&dir, &["add", "Right", "--id", "c", "--after", "a"]);
    orrery_ok(&dir, &["add", "Finish", "--id", "d", "--after", "b,c"]);
    (tmp, dir)
}

fn effective(status: &serde_json::Value, id: &str) -> String {
    status["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"] == id)
        .unwrap_or_else(|| panic!("task {} missing", id))["effective"]
        .as_str()
        .unwrap()
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_commands_require_init() {
    let tmp = TempDir::new().unwrap();
    let stderr = orrery_fail(&tmp.path().join(".orrery"), &["status"]);
    assert!(stderr.contains("not initialized"), "stderr: {}", stderr);
}

#[test]
fn test_add_builds_graph_on_disk() {
    let (_tmp, dir) = diamond_project();
    let graph = load_graph(dir.join("graph.jsonl")).unwrap();
    assert_eq!(graph.len(), 4);
    assert_eq!(graph.edges().len(), 4);
    assert!(graph.has_edge("c", "d"));
}

#[test]
fn test_status_follows_completion() {
    let (_tmp, dir) = diamond_project();

    let status = orrery_json(&dir, &["status"]);
    assert_eq!(effective(&status, "a"), "available");
    assert_eq!(effective(&status, "b"), "locked");
    assert_eq!(effective(&status, "d"), "locked");

    let status = orrery_json(&dir, &["status", "--focus", "a"]);
    assert_eq!(effective(&status, "a"), "in_progress");
    let unlocks: Vec<&str> = status["unlocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(unlocks, vec!["b", "c"]);
}

#[test]
fn test_layout_dag_json() {
    let (_tmp, dir) = diamond_project();
    let out = orrery_json(&dir, &["layout", "--strategy", "dag"]);

    assert_eq!(out["strategy"], "dag");
    assert_eq!(out["positions"].as_array().unwrap().len(), 4);
    assert_eq!(out["columns"].as_array().unwrap().len(), 3);
    assert_eq!(out["crossings"], 0);
}

#[test]
fn test_pin_overrides_layout_until_unpinned() {
    let (_tmp, dir) = diamond_project();
    orrery_ok(&dir, &["pin", "b", "-120.5", "77"]);

    for strategy in ["dag", "force"] {
        let out = orrery_json(&dir, &["layout", "--strategy", strategy]);
        let b = out["positions"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == "b")
            .unwrap()
            .clone();
        assert_eq!(b["x"], -120.5);
        assert_eq!(b["y"], 77.0);
        assert_eq!(b["pinned"], true);
    }

    orrery_ok(&dir, &["unpin", "b"]);
    let graph = load_graph(dir.join("graph.jsonl")).unwrap();
    assert!(graph.get_task("b").unwrap().position.is_none());
}

#[test]
fn test_link_unlink_and_remove() {
    let (_tmp, dir) = diamond_project();
    orrery_fail(&dir, &["link", "a", "a"]);
    orrery_fail(&dir, &["link", "a", "b"]);
    orrery_ok(&dir, &["unlink", "a", "b"]);
    orrery_ok(&dir, &["remove", "c"]);

    let graph = load_graph(dir.join("graph.jsonl")).unwrap();
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.edges().len(), 1);
    assert!(graph.has_edge("b", "d"));
}

#[test]
fn test_check_reports_cycle_as_warning() {
    let (_tmp, dir) = diamond_project();
    let output = orrery_cmd(&dir, &["link", "d", "a"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cycle"));

    let out = orrery_json(&dir, &["check"]);
    assert_eq!(out["ok"], true);
    assert_eq!(out["cycles"].as_array().unwrap().len(), 1);

    let human = orrery_cmd(&dir, &["check"]);
    assert!(human.status.success());
    let stderr = String::from_utf8_lossy(&human.stderr);
    assert!(stderr.contains("cycle group: "), "stderr: {}", stderr);
    assert!(!stderr.contains("->"), "stderr: {}", stderr);

    // Layout still places every task
    let layout = orrery_json(&dir, &["layout"]);
    assert_eq!(layout["positions"].as_array().unwrap().len(), 4);
}

#[test]
fn test_simulate_drag_stick_persists() {
    let (_tmp, dir) = diamond_project();
    let out = orrery_json(&dir, &["simulate", "--drag", "d", "--to", "-300,250", "--stick"]);
    assert_eq!(out["settled"], true);

    let graph = load_graph(dir.join("graph.jsonl")).unwrap();
    assert_eq!(
        graph.get_task("d").unwrap().position,
        Some(Point::new(-300.0, 250.0))
    );
}

#[test]
fn test_simulate_without_stick_leaves_snapshot_alone() {
    let (_tmp, dir) = diamond_project();
    orrery_ok(&dir, &["simulate", "--drag", "d", "--to", "10,10"]);
    let graph = load_graph(dir.join("graph.jsonl")).unwrap();
    assert!(graph.tasks().iter().all(|t| t.position.is_none()));
}

#[test]
fn test_legacy_snapshot_loads_through_cli() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(".orrery");
    orrery_ok(&dir, &["init"]);
    std::fs::write(
        dir.join("graph.jsonl"),
        concat!(
            r#"{"kind":"experiment","id":"e1","name":"Old","status":"concluded","inquiryIds":["q"]}"#,
            "\n",
            r#"{"kind":"experiment","id":"e2","name":"Next","status":"designed"}"#,
            "\n",
            r#"{"from":"e1","to":"e2"}"#,
            "\n",
        ),
    )
    .unwrap();

    let status = orrery_json(&dir, &["status"]);
    assert_eq!(effective(&status, "e1"), "completed");
    assert_eq!(effective(&status, "e2"), "available");

    // Any write re-saves in the canonical schema
    orrery_ok(&dir, &["pin", "e2", "1", "2"]);
    let graph = load_graph(dir.join("graph.jsonl")).unwrap();
    assert_eq!(graph.get_task("e1").unwrap().status, Status::Completed);
    let raw = std::fs::read_to_string(dir.join("graph.jsonl")).unwrap();
    assert!(!raw.contains("experiment"));
    assert!(raw.contains(r#""kind":"edge""#));
}
