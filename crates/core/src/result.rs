// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal result of one agent session.

use crate::agent::{AgentId, AgentStatus};
use serde::Serialize;

/// One result per executed [`AgentRequest`](crate::AgentRequest).
///
/// `duration_secs` covers the full lifecycle including sandbox teardown.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResult {
    pub agent_id: AgentId,
    pub status: AgentStatus,
    pub response: String,
    pub error: Option<String>,
    /// Model the runtime was invoked with
    pub model: String,
    /// Names of the tools the runtime reported invoking
    pub tools_used: Vec<String>,
    pub duration_secs: f64,
    pub tokens_used: Option<u64>,
}

impl AgentResult {
    /// Result for a session whose runtime returned normally.
    pub fn completed(agent_id: AgentId, model: impl Into<String>, response: String) -> Self {
        Self {
            agent_id,
            status: AgentStatus::Completed,
            response,
            error: None,
            model: model.into(),
            tools_used: Vec::new(),
            duration_secs: 0.0,
            tokens_used: None,
        }
    }

    /// Result for a session that failed before or during the runtime call.
    pub fn error(agent_id: AgentId, model: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            agent_id,
            status: AgentStatus::Error,
            response: String::new(),
            error: Some(error.into()),
            model: model.into(),
            tools_used: Vec::new(),
            duration_secs: 0.0,
            tokens_used: None,
        }
    }

    /// Result for a session that exceeded its wall-clock budget.
    pub fn timeout(agent_id: AgentId, model: impl Into<String>, budget_secs: f64) -> Self {
        Self {
            agent_id,
            status: AgentStatus::Timeout,
            response: String::new(),
            error: Some(format!("agent timed out after {budget_secs}s")),
            model: model.into(),
            tools_used: Vec::new(),
            duration_secs: 0.0,
            tokens_used: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == AgentStatus::Completed
    }
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
