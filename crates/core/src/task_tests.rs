// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    pending = { TaskStatus::Pending, "pending" },
    in_progress = { TaskStatus::InProgress, "in_progress" },
    completed = { TaskStatus::Completed, "completed" },
    failed = { TaskStatus::Failed, "failed" },
)]
fn status_serializes_lowercase(status: TaskStatus, expected: &str) {
    let json = serde_json::to_string(&status).unwrap();
    assert_eq!(json, format!("\"{expected}\""));
    assert_eq!(status.to_string(), expected);

    let parsed: TaskStatus = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, status);
}

#[test]
fn terminal_states() {
    assert!(!TaskStatus::Pending.is_terminal());
    assert!(!TaskStatus::InProgress.is_terminal());
    assert!(TaskStatus::Completed.is_terminal());
    assert!(TaskStatus::Failed.is_terminal());
}

#[test]
fn new_task_is_pending_and_unassigned() {
    let task = BoardTask::new("ab12cd34", "write docs", vec![], 5, 100.0);
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.assigned_to, None);
    assert_eq!(task.priority, 5);
    assert_eq!(task.created_at, 100.0);
    assert_eq!(task.claimed_at, None);
    assert_eq!(task.completed_at, None);
}

#[test]
fn task_round_trips_with_disk_field_names() {
    let task = BoardTask::new("deadbeef", "x", vec!["ab12cd34".into()], -1, 3.5);
    let value = serde_json::to_value(&task).unwrap();

    assert_eq!(value["id"], "deadbeef");
    assert_eq!(value["status"], "pending");
    assert_eq!(value["assigned_to"], serde_json::Value::Null);
    assert_eq!(value["depends_on"][0], "ab12cd34");
    assert_eq!(value["priority"], -1);
    assert_eq!(value["created_at"], 3.5);

    let parsed: BoardTask = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, task);
}
