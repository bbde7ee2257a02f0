// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool error types.
//!
//! Agent failures never surface here: they are folded into terminal
//! [`AgentResult`](ap_core::AgentResult)s. This type covers the pool's own
//! plumbing (shared state setup, logging).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error(transparent)]
    Board(#[from] ap_board::BoardError),

    #[error(transparent)]
    Sandbox(#[from] ap_sandbox::SandboxError),

    #[error("pool io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logging init failed: {0}")]
    Logging(String),
}
