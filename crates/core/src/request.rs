// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent session request.

use crate::agent::AgentId;
use crate::config::SandboxKind;
use std::path::PathBuf;
use std::time::Duration;

/// One requested agent session.
///
/// Immutable once submitted; every `None` field falls back to the pool
/// configuration. Consumed exactly once by the pool.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    /// Assigned by the pool at submit time when the caller leaves it unset
    pub agent_id: Option<AgentId>,
    pub prompt: String,
    pub model: Option<String>,
    pub sandbox: Option<SandboxKind>,
    pub system_prompt: Option<String>,
    /// Wall-clock budget for the whole session
    pub timeout: Option<Duration>,
    pub workspace: Option<PathBuf>,
}

impl AgentRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            agent_id: None,
            prompt: prompt.into(),
            model: None,
            sandbox: None,
            system_prompt: None,
            timeout: None,
            workspace: None,
        }
    }

    pub fn with_agent_id(mut self, id: impl Into<AgentId>) -> Self {
        self.agent_id = Some(id.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_sandbox(mut self, kind: SandboxKind) -> Self {
        self.sandbox = Some(kind);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }
}

impl From<&str> for AgentRequest {
    fn from(prompt: &str) -> Self {
        Self::new(prompt)
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
