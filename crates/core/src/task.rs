// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work item types for the shared task board.
//!
//! The serialized field names and status strings here are the on-disk
//! contract of `taskboard.json`; changing them breaks every process sharing
//! a board file.

use crate::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a task on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting for a claim (and for its dependencies to complete)
    Pending,
    /// Claimed by exactly one agent
    InProgress,
    /// Finished successfully
    Completed,
    /// Finished with an error stored in `result`
    Failed,
}

impl TaskStatus {
    /// Completed or Failed; terminal states set `completed_at`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A single work item on the task board.
///
/// Invariant: `assigned_to` is non-null exactly when `status` is InProgress,
/// and exactly one of Completed/Failed sets `completed_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardTask {
    /// 8 hex characters, unique on the board
    pub id: String,
    pub description: String,
    pub status: TaskStatus,
    pub assigned_to: Option<AgentId>,
    pub depends_on: Vec<String>,
    /// Completion result, or the error text for a Failed task
    pub result: Option<String>,
    /// Higher priority is claimed earlier
    pub priority: i64,
    /// Seconds since epoch
    pub created_at: f64,
    pub claimed_at: Option<f64>,
    pub completed_at: Option<f64>,
}

impl BoardTask {
    /// Create a fresh Pending task.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        depends_on: Vec<String>,
        priority: i64,
        created_at: f64,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            status: TaskStatus::Pending,
            assigned_to: None,
            depends_on,
            result: None,
            priority,
            created_at,
            claimed_at: None,
            completed_at: None,
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
