// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent runtime contract.
//!
//! The runtime is the external black box that turns a prompt into a
//! response, possibly issuing shell commands through the sandbox and
//! coordination calls through the server handle. The pool only schedules
//! it, cancels it at the timeout boundary, and interprets its reply.

use crate::coordination::CoordinationServer;
use ap_core::AgentId;
use ap_sandbox::Sandbox;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// One runtime invocation: prompt, identity, and the resources the session
/// may use. The sandbox is shared behind a lock so the runner can still
/// tear it down after a cancelled invocation.
#[derive(Debug)]
pub struct RuntimeInvocation {
    pub agent_id: AgentId,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub model: String,
    /// Execution environment for the session's shell commands
    pub sandbox: Arc<Mutex<Sandbox>>,
    /// Team-mode coordination surface; None for independent agents
    pub coordination: Option<Arc<CoordinationServer>>,
    /// Wall-clock budget the runner also enforces from outside
    pub timeout: Duration,
}

/// How the runtime reports its own outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeStatus {
    Ok,
    Error,
    Timeout,
}

/// What the runtime hands back.
#[derive(Debug, Clone)]
pub struct RuntimeReply {
    pub status: RuntimeStatus,
    pub response: String,
    pub error: Option<String>,
    /// Names of the tools invoked during the session
    pub tool_names: Vec<String>,
    pub tokens_used: Option<u64>,
}

impl RuntimeReply {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            status: RuntimeStatus::Ok,
            response: response.into(),
            error: None,
            tool_names: Vec::new(),
            tokens_used: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: RuntimeStatus::Error,
            response: String::new(),
            error: Some(message.into()),
            tool_names: Vec::new(),
            tokens_used: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.tool_names = tools;
        self
    }

    pub fn with_tokens(mut self, tokens: u64) -> Self {
        self.tokens_used = Some(tokens);
        self
    }
}

/// External language-model agent runtime.
///
/// Implementations must be cancellation-safe at await points: the runner
/// drops the invocation future when the wall-clock budget expires.
#[async_trait]
pub trait AgentRuntime: Send + Sync + 'static {
    async fn run(&self, invocation: RuntimeInvocation) -> RuntimeReply;
}
