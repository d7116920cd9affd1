#![allow(dead_code)]
use annoprod::models::{Phase, Task, TaskHistoryEvent, TaskStatus};
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

pub fn annoprod() -> Command {
    let mut cmd = cargo_bin_cmd!("annoprod");
    cmd.env("NO_COLOR", "1").env_remove("ANNOPROD_LOG");
    cmd
}

pub fn dt(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).expect("valid RFC 3339 timestamp")
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

/// One event; `received_index` is set by `received`.
pub fn ev(
    task_id: &str,
    history_id: &str,
    at: &str,
    phase: Phase,
    status: TaskStatus,
    account: Option<&str>,
) -> TaskHistoryEvent {
    TaskHistoryEvent::new("p1", task_id, history_id, dt(at), phase, status, account)
}

/// Number events in the order given, as if received from the platform.
pub fn received(events: Vec<TaskHistoryEvent>) -> Vec<TaskHistoryEvent> {
    events
        .into_iter()
        .enumerate()
        .map(|(i, mut e)| {
            e.received_index = i;
            e
        })
        .collect()
}

pub fn task(task_id: &str, phase: Phase, status: TaskStatus) -> Task {
    Task {
        phase,
        status,
        input_data_count: 1,
        annotation_count: 10,
        ..Task::new("p1", task_id)
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Events of a task annotated by A (45 min) and B (15 min), inspected by C
/// and accepted by D on 2024-01-05.
pub fn shared_task_events(task_id: &str) -> Vec<TaskHistoryEvent> {
    use Phase::*;
    use TaskStatus::*;
    vec![
        ev(task_id, "h1", "2024-01-02T09:00:00+09:00", Annotation, Working, Some("A")),
        ev(task_id, "h2", "2024-01-02T09:45:00+09:00", Annotation, Break, Some("A")),
        ev(task_id, "h3", "2024-01-03T10:00:00+09:00", Annotation, Working, Some("B")),
        ev(task_id, "h4", "2024-01-03T10:15:00+09:00", Annotation, Complete, Some("B")),
        ev(task_id, "h5", "2024-01-04T11:00:00+09:00", Inspection, Working, Some("C")),
        ev(task_id, "h6", "2024-01-04T11:30:00+09:00", Inspection, Complete, Some("C")),
        ev(task_id, "h7", "2024-01-05T13:00:00+09:00", Acceptance, Working, Some("D")),
        ev(task_id, "h8", "2024-01-05T13:06:00+09:00", Acceptance, Complete, Some("D")),
    ]
}

// -----------------------------
// Project directories on disk
// -----------------------------

pub fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).expect("serialize")).expect("write json");
}

pub fn task_json(task_id: &str, phase: &str, status: &str) -> Value {
    json!({
        "project_id": "p1",
        "task_id": task_id,
        "phase": phase,
        "phase_stage": 1,
        "status": status,
        "input_data_id_list": ["i1", "i2"],
        "annotation_count": 20,
        "metadata": {"batch": "b1", "priority": 3}
    })
}

pub fn event_json(
    task_id: &str,
    history_id: &str,
    at: &str,
    phase: &str,
    status: &str,
    account: &str,
) -> Value {
    json!({
        "project_id": "p1",
        "task_id": task_id,
        "task_history_id": history_id,
        "created_datetime": at,
        "phase": phase,
        "phase_stage": 1,
        "status": status,
        "account_id": account
    })
}

/// A complete project directory named `name` under `root`.
pub fn write_project(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("create project dir");

    write_json(
        &dir.join("task.json"),
        &json!([
            task_json("t1", "acceptance", "complete"),
            task_json("t2", "annotation", "working"),
        ]),
    );
    write_json(
        &dir.join("task_history_event.json"),
        &json!([
            event_json("t1", "h1", "2024-01-02T09:00:00+09:00", "annotation", "working", "A"),
            event_json("t1", "h2", "2024-01-02T09:45:00+09:00", "annotation", "break", "A"),
            event_json("t1", "h3", "2024-01-03T10:00:00+09:00", "annotation", "working", "B"),
            event_json("t1", "h4", "2024-01-03T10:15:00+09:00", "annotation", "complete", "B"),
            event_json("t1", "h5", "2024-01-05T13:00:00+09:00", "acceptance", "working", "D"),
            event_json("t1", "h6", "2024-01-05T13:30:00+09:00", "acceptance", "complete", "D"),
            event_json("t2", "h7", "2024-01-04T09:00:00+09:00", "annotation", "working", "A"),
        ]),
    );
    write_json(
        &dir.join("inspection_comment.json"),
        &json!([
            {
                "task_id": "t1",
                "comment_id": "c1",
                "phase": "inspection",
                "account_id": "C",
                "comment_type": "inspection",
                "status": "resolved",
                "is_root": true
            }
        ]),
    );
    write_json(
        &dir.join("member.json"),
        &json!([
            {"account_id": "A", "user_id": "alice", "username": "Alice"},
            {"account_id": "B", "user_id": "bob", "username": "Bob"}
        ]),
    );

    dir
}
