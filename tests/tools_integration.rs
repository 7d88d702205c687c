//! Integration tests for the built-in tools
//!
//! These tests run built-in tools through the full pipeline using the
//! passthrough planner, so each command is a fenced JSON plan:
//! - File tools act on a temporary directory
//! - Timers report immediately and post a notice when they fire
//! - Stop-all cancels timers that have not fired yet

use std::sync::Arc;
use std::time::Duration;

use deskhand::command::sink::{self, ResultStream};
use deskhand::command::{Orchestrator, Report, ReportKind};
use deskhand::core::config::WorkerConfig;
use deskhand::llm::PassthroughPlanner;
use deskhand::tools::builtin;
use deskhand::worker::WorkerManager;
use serde_json::{json, Value};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

fn start() -> (Orchestrator, ResultStream, WorkerManager) {
    let workers = WorkerManager::new();
    let (sink, stream) = sink::channel();
    let config = WorkerConfig {
        poll_interval_ms: 10,
        ..WorkerConfig::default()
    };
    let orchestrator = Orchestrator::spawn(
        PassthroughPlanner,
        Arc::new(builtin::registry()),
        workers.clone(),
        sink,
        &config,
    )
    .unwrap();
    (orchestrator, stream, workers)
}

fn call(name: &str, arguments: Value) -> String {
    let plan = json!({"tool_calls": [{"name": name, "arguments": arguments}]});
    format!("```json\n{}\n```", plan)
}

fn next(stream: &ResultStream) -> Report {
    stream.recv_timeout(WAIT).expect("report")
}

/// Wait for invocation workers to exit after posting their outcome
fn settle(workers: &WorkerManager, expected: usize) {
    let deadline = std::time::Instant::now() + WAIT;
    while workers.active_count() != expected && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(workers.active_count(), expected);
}

// ============================================================================
// File Tools
// ============================================================================

/// Integration test: create, copy, rename and delete in sequence
#[test]
fn test_file_workflow() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().display().to_string();
    let (orchestrator, stream, workers) = start();

    orchestrator.submit(call("create_folder", json!({"folder_path": format!("{}/reports", root)})));
    assert_eq!(next(&stream).kind(), ReportKind::Succeeded);

    orchestrator.submit(call(
        "create_file",
        json!({"file_path": format!("{}/reports/q1.txt", root), "content": "revenue"}),
    ));
    assert_eq!(next(&stream).kind(), ReportKind::Succeeded);

    orchestrator.submit(call(
        "copy_file",
        json!({"source": format!("{}/reports/q1.txt", root), "destination": root}),
    ));
    assert_eq!(next(&stream).kind(), ReportKind::Succeeded);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("q1.txt")).unwrap(),
        "revenue"
    );

    orchestrator.submit(call(
        "rename_file",
        json!({"old_path": format!("{}/q1.txt", root), "new_name": "q1-copy.txt"}),
    ));
    assert_eq!(next(&stream).kind(), ReportKind::Succeeded);
    assert!(dir.path().join("q1-copy.txt").exists());

    orchestrator.submit(call("delete_file", json!({"file_path": format!("{}/q1-copy.txt", root)})));
    assert_eq!(next(&stream).kind(), ReportKind::Succeeded);
    assert!(!dir.path().join("q1-copy.txt").exists());

    orchestrator.shutdown();
    workers.stop_all();
}

/// Integration test: deleting a missing file is an execution error
#[test]
fn test_io_errors_become_outcomes() {
    let dir = TempDir::new().unwrap();
    let (orchestrator, stream, _workers) = start();

    let missing = dir.path().join("missing.txt").display().to_string();
    orchestrator.submit(call("delete_file", json!({"file_path": missing})));

    let report = next(&stream);
    assert_eq!(report.kind(), ReportKind::ToolExecutionError);
    assert!(report.to_string().starts_with("Tool delete_file failed: IO error"));

    orchestrator.shutdown();
}

/// Integration test: search posts its results before the outcome
#[test]
fn test_search_posts_notice() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("notes.md"), "").unwrap();
    std::fs::write(dir.path().join("todo.md"), "").unwrap();
    std::fs::write(dir.path().join("data.csv"), "").unwrap();
    let (orchestrator, stream, _workers) = start();

    orchestrator.submit(call(
        "search_files",
        json!({"directory": dir.path().display().to_string(), "pattern": "*.md"}),
    ));

    match next(&stream) {
        Report::Notice { title, message } => {
            assert_eq!(title, "Search");
            assert!(message.starts_with("Found 2 file(s) matching '*.md'"));
        }
        other => panic!("expected search notice, got {:?}", other),
    }
    assert_eq!(next(&stream).kind(), ReportKind::Succeeded);

    orchestrator.shutdown();
}

// ============================================================================
// Timers
// ============================================================================

/// Integration test: a timer succeeds at once and fires later
#[test]
fn test_timer_fires_notice() {
    let (orchestrator, stream, workers) = start();

    orchestrator.submit(call("set_timer", json!({"duration": "1s", "message": "tea is ready"})));

    assert_eq!(next(&stream).kind(), ReportKind::Succeeded);
    let notice = next(&stream);
    assert_eq!(notice.kind(), ReportKind::Notice);
    assert_eq!(notice.to_string(), "[Timer Complete] tea is ready");

    orchestrator.shutdown();
    assert!(workers.stop_all().is_clean());
}

/// Integration test: stop-all cancels a pending timer without a notice
#[test]
fn test_stop_all_cancels_pending_timer() {
    let (orchestrator, stream, workers) = start();

    orchestrator.submit(call("set_timer", json!({"duration": "10m"})));
    assert_eq!(next(&stream).kind(), ReportKind::Succeeded);
    settle(&workers, 1);

    let report = workers.stop_all();
    assert_eq!(report.joined, 1);
    assert_eq!(workers.active_count(), 0);
    assert!(stream.recv_timeout(Duration::from_millis(200)).is_none());

    orchestrator.shutdown();
}

/// Integration test: unparseable durations are rejected by the tool
#[test]
fn test_bad_duration_is_an_error() {
    let (orchestrator, stream, workers) = start();

    orchestrator.submit(call("set_timer", json!({"duration": "soon"})));

    let report = next(&stream);
    assert_eq!(report.kind(), ReportKind::ToolExecutionError);
    settle(&workers, 0);

    orchestrator.shutdown();
}
