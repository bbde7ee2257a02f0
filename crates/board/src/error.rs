// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Board and journal error types.

use ap_core::TaskStatus;
use thiserror::Error;

/// Errors from task-board and journal operations.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("task {id} is {status}, cannot {op}")]
    InvalidTransition {
        id: String,
        status: TaskStatus,
        op: &'static str,
    },

    #[error("board io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("board serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
