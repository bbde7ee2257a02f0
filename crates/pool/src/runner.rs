// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-agent lifecycle driver.
//!
//! The lifecycle is validate → sandbox → bus → coordination → runtime →
//! teardown. Failure at any step still tears down whatever earlier steps
//! acquired, in reverse order, and every outcome folds into a terminal
//! AgentResult. The runtime runs on its own task so a panicking runtime
//! implementation cannot skip teardown.

use crate::bus::MessageBus;
use crate::coordination::CoordinationServer;
use crate::runtime::{AgentRuntime, RuntimeInvocation, RuntimeReply, RuntimeStatus};
use ap_board::TaskBoard;
use ap_core::{AgentId, AgentRequest, AgentResult, PoolConfig};
use ap_sandbox::{validate_workspace, Sandbox};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Shared-state paths wired into team-mode agents.
#[derive(Debug, Clone)]
pub(crate) struct TeamContext {
    pub board_dir: PathBuf,
    pub journal_dir: PathBuf,
    pub stale_timeout: Option<Duration>,
}

/// Everything one agent session needs from the pool.
pub(crate) struct AgentRunner<R> {
    pub runtime: Arc<R>,
    pub bus: Arc<MessageBus>,
    pub config: Arc<PoolConfig>,
    pub team: Option<TeamContext>,
}

impl<R: AgentRuntime> AgentRunner<R> {
    /// Drive one request to a terminal result. Never errors, never panics;
    /// duration covers the full lifecycle including teardown.
    pub(crate) async fn run(&self, agent_id: AgentId, request: AgentRequest) -> AgentResult {
        let started = Instant::now();
        let mut result = self.run_lifecycle(&agent_id, &request).await;
        result.duration_secs = started.elapsed().as_secs_f64();
        tracing::info!(
            agent = %agent_id,
            status = %result.status,
            duration_secs = result.duration_secs,
            "agent session finished"
        );
        result
    }

    async fn run_lifecycle(&self, agent_id: &AgentId, request: &AgentRequest) -> AgentResult {
        let model =
            request.model.clone().unwrap_or_else(|| self.config.default_model.clone());

        // 1. Validate the workspace before any resource exists.
        let workspace = request.workspace.clone().unwrap_or_else(|| self.config.workspace.clone());
        let workspace =
            match validate_workspace(&workspace, self.config.workspace_root.as_deref()) {
                Ok(workspace) => workspace,
                Err(e) => return AgentResult::error(agent_id.clone(), model, e.to_string()),
            };

        // 2. Create and start the sandbox.
        let kind = request.sandbox.unwrap_or(self.config.default_sandbox);
        let mut sandbox =
            match Sandbox::new(kind, agent_id.as_str(), &workspace, &self.config.container) {
                Ok(sandbox) => sandbox,
                Err(e) => return AgentResult::error(agent_id.clone(), model, e.to_string()),
            };
        if let Err(e) = sandbox.start().await {
            sandbox.stop().await;
            return AgentResult::error(agent_id.clone(), model, e.to_string());
        }
        let sandbox = Arc::new(Mutex::new(sandbox));

        // 3. Register on the in-process bus.
        self.bus.register(agent_id);

        // 4. Team mode: bind a coordination server to this agent.
        let coordination = match &self.team {
            None => None,
            Some(team) => match CoordinationServer::new(
                agent_id.clone(),
                &team.board_dir,
                &team.journal_dir,
                team.stale_timeout,
            ) {
                Ok(server) => Some(Arc::new(server)),
                Err(e) => {
                    self.bus.unregister(agent_id);
                    sandbox.lock().await.stop().await;
                    return AgentResult::error(agent_id.clone(), model, e.to_string());
                }
            },
        };

        // 5-7. Invoke the runtime under the wall-clock budget.
        let timeout = request.timeout.unwrap_or(self.config.timeout);
        let invocation = RuntimeInvocation {
            agent_id: agent_id.clone(),
            prompt: request.prompt.clone(),
            system_prompt: request.system_prompt.clone(),
            model: model.clone(),
            sandbox: sandbox.clone(),
            coordination,
            timeout,
        };
        tracing::info!(agent = %agent_id, model = %model, sandbox = ?kind, "agent session started");

        let runtime = self.runtime.clone();
        let invocation_task = tokio::spawn(async move { runtime.run(invocation).await });
        let abort = invocation_task.abort_handle();
        let result = match tokio::time::timeout(timeout, invocation_task).await {
            Ok(Ok(reply)) => reply_to_result(agent_id, &model, reply),
            Ok(Err(join_error)) => {
                tracing::error!(agent = %agent_id, error = %join_error, "agent runtime crashed");
                AgentResult::error(
                    agent_id.clone(),
                    model.clone(),
                    format!("agent runtime crashed: {join_error}"),
                )
            }
            Err(_elapsed) => {
                // Best-effort cancellation; sandbox teardown below reaps
                // anything the runtime left running.
                abort.abort();
                tracing::warn!(agent = %agent_id, timeout_secs = timeout.as_secs_f64(), "agent timed out");
                AgentResult::timeout(agent_id.clone(), model.clone(), timeout.as_secs_f64())
            }
        };

        // 8. Teardown in reverse order of acquisition.
        self.bus.unregister(agent_id);
        if let Some(team) = &self.team {
            self.release_claims(team, agent_id);
        }
        sandbox.lock().await.stop().await;

        result
    }

    /// Any tasks still claimed by this agent go back to Pending.
    fn release_claims(&self, team: &TeamContext, agent_id: &AgentId) {
        let released = TaskBoard::open(&team.board_dir)
            .and_then(|mut board| board.release_agent_tasks(agent_id));
        if let Err(e) = released {
            tracing::warn!(agent = %agent_id, error = %e, "failed to release agent tasks");
        }
    }
}

fn reply_to_result(agent_id: &AgentId, model: &str, reply: RuntimeReply) -> AgentResult {
    let mut result = match reply.status {
        RuntimeStatus::Ok => AgentResult::completed(agent_id.clone(), model, reply.response),
        RuntimeStatus::Error => AgentResult::error(
            agent_id.clone(),
            model,
            reply.error.unwrap_or_else(|| "agent runtime reported an error".to_string()),
        ),
        RuntimeStatus::Timeout => {
            let mut result = AgentResult::timeout(agent_id.clone(), model, 0.0);
            result.error = Some(
                reply.error.unwrap_or_else(|| "agent runtime reported a timeout".to_string()),
            );
            result.response = reply.response;
            result
        }
    };
    result.tools_used = reply.tool_names;
    result.tokens_used = reply.tokens_used;
    result
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
