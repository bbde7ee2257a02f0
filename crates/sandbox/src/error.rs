// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from workspace validation and sandbox lifecycle operations.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("workspace rejected: {}: {reason}", path.display())]
    WorkspaceRejected { path: PathBuf, reason: String },

    #[error("no container runtime found (tried docker, podman)")]
    RuntimeUnavailable,

    #[error("sandbox start failed: {0}")]
    StartFailed(String),

    #[error("sandbox is not running")]
    NotRunning,

    #[error("sandbox io error: {0}")]
    Io(#[from] std::io::Error),
}
