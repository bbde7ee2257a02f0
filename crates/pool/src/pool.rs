// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded concurrent agent pool.
//!
//! Requests queue at submit time and only start executing inside `run`,
//! gated by a semaphore clamped to [`MAX_AGENTS`](ap_core::MAX_AGENTS).
//! Results always come back in submission order, one per request; agent
//! failures are folded into results, never raised. Team mode prepares a
//! shared state directory holding the task board and message journal, torn
//! down again when `run` returns.

use crate::bus::MessageBus;
use crate::error::PoolError;
use crate::runner::{AgentRunner, TeamContext};
use crate::runtime::AgentRuntime;
use ap_board::{MessageJournal, TaskBoard};
use ap_core::{AgentId, AgentRequest, AgentResult, PoolConfig};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Disambiguates auto-created state directories within one process.
static POOL_SEQ: AtomicU32 = AtomicU32::new(0);

/// Lifecycle notifications delivered through the optional event handler.
#[derive(Debug, Clone)]
pub enum PoolEvent {
    /// An agent session acquired a slot and is starting.
    AgentStarted { agent_id: AgentId },
    /// An agent session finished; `result` is the serialized AgentResult.
    AgentComplete { agent_id: AgentId, result: serde_json::Value },
}

type EventHandler = Arc<dyn Fn(&PoolEvent) + Send + Sync>;

struct TeamState {
    state_dir: PathBuf,
    /// We created the directory, so teardown removes it.
    created: bool,
    /// Pool-owned handle used by `add_tasks`.
    board: TaskBoard,
}

/// Bounded pool of agent sessions over one runtime.
pub struct AgentPool<R: AgentRuntime> {
    config: Arc<PoolConfig>,
    runtime: Arc<R>,
    bus: Arc<MessageBus>,
    requests: Vec<(AgentId, AgentRequest)>,
    next_agent: u32,
    team: Option<TeamState>,
    stop: Arc<AtomicBool>,
    events: Option<EventHandler>,
}

impl<R: AgentRuntime> AgentPool<R> {
    pub fn new(config: PoolConfig, runtime: impl Into<Arc<R>>) -> Self {
        Self {
            config: Arc::new(config),
            runtime: runtime.into(),
            bus: Arc::new(MessageBus::new()),
            requests: Vec::new(),
            next_agent: 0,
            team: None,
            stop: Arc::new(AtomicBool::new(false)),
            events: None,
        }
    }

    /// Attach a lifecycle event callback.
    pub fn with_event_handler(
        mut self,
        handler: impl Fn(&PoolEvent) + Send + Sync + 'static,
    ) -> Self {
        self.events = Some(Arc::new(handler));
        self
    }

    /// The in-process bus shared by this pool's agents.
    pub fn message_bus(&self) -> Arc<MessageBus> {
        self.bus.clone()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Enqueue a request without starting it; returns the agent id,
    /// assigning `agent-{n}` when the request carries none.
    pub fn submit(&mut self, request: AgentRequest) -> AgentId {
        let agent_id = request.agent_id.clone().unwrap_or_else(|| {
            self.next_agent += 1;
            AgentId::new(format!("agent-{}", self.next_agent))
        });
        tracing::debug!(agent = %agent_id, "request submitted");
        self.requests.push((agent_id.clone(), request));
        agent_id
    }

    /// Seed the shared board with one task per description (team mode).
    pub fn add_tasks<S: AsRef<str>>(&mut self, descriptions: &[S]) -> Result<Vec<String>, PoolError> {
        self.ensure_team()?;
        let mut ids = Vec::with_capacity(descriptions.len());
        if let Some(team) = self.team.as_mut() {
            for description in descriptions {
                ids.push(team.board.add(description.as_ref(), &[], 0)?);
            }
        }
        Ok(ids)
    }

    /// Advisory stop: no further agents start; in-flight ones finish.
    pub fn request_stop(&self) {
        tracing::info!("pool stop requested");
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Execute every submitted request, at most `max_agents` at a time.
    /// Results are in submission order; shared state is torn down before
    /// returning, even when every agent failed.
    pub async fn run(&mut self) -> Vec<AgentResult> {
        let bound = self.config.effective_max_agents();
        let semaphore = Arc::new(Semaphore::new(bound));
        let team_ctx = self.team.as_ref().map(|team| TeamContext {
            board_dir: team.state_dir.clone(),
            journal_dir: team.state_dir.clone(),
            stale_timeout: self.config.stale_timeout,
        });
        tracing::info!(
            agents = self.requests.len(),
            bound,
            team = team_ctx.is_some(),
            "pool run starting"
        );

        let mut handles = Vec::with_capacity(self.requests.len());
        for (agent_id, request) in self.requests.drain(..) {
            let runner = AgentRunner {
                runtime: self.runtime.clone(),
                bus: self.bus.clone(),
                config: self.config.clone(),
                team: team_ctx.clone(),
            };
            let semaphore = semaphore.clone();
            let stop = self.stop.clone();
            let events = self.events.clone();
            let task_id = agent_id.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    // The semaphore is never closed while handles are live.
                    Err(_closed) => {
                        return AgentResult::error(
                            task_id,
                            runner.config.default_model.clone(),
                            "pool scheduler closed",
                        )
                    }
                };
                if stop.load(Ordering::SeqCst) {
                    tracing::info!(agent = %task_id, "not starting agent: stop requested");
                    return AgentResult::error(
                        task_id,
                        runner.config.default_model.clone(),
                        "pool stop requested before start",
                    );
                }

                emit(&events, &PoolEvent::AgentStarted { agent_id: task_id.clone() });
                let result = runner.run(task_id.clone(), request).await;
                emit(
                    &events,
                    &PoolEvent::AgentComplete {
                        agent_id: task_id,
                        result: serde_json::to_value(&result)
                            .unwrap_or(serde_json::Value::Null),
                    },
                );
                result
            });
            handles.push((agent_id, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (agent_id, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!(agent = %agent_id, error = %e, "agent task aborted");
                    results.push(AgentResult::error(
                        agent_id,
                        self.config.default_model.clone(),
                        format!("agent task aborted: {e}"),
                    ));
                }
            }
        }

        self.teardown();
        results
    }

    /// Team-mode convenience: one lead plus `num_workers` workers against
    /// the shared board, then `run`.
    pub async fn run_team(
        &mut self,
        lead_prompt: &str,
        worker_prompt: &str,
        num_workers: usize,
    ) -> Result<Vec<AgentResult>, PoolError> {
        self.ensure_team()?;
        self.submit(AgentRequest::new(lead_prompt).with_agent_id("lead"));
        for i in 1..=num_workers {
            self.submit(AgentRequest::new(worker_prompt).with_agent_id(format!("worker-{i}")));
        }
        Ok(self.run().await)
    }

    /// Prepare the shared state directory, board, and journal once.
    fn ensure_team(&mut self) -> Result<(), PoolError> {
        if self.team.is_some() {
            return Ok(());
        }
        let (state_dir, created) = match &self.config.state_dir {
            Some(dir) => (dir.clone(), false),
            None => {
                let dir = std::env::temp_dir().join(format!(
                    "agentpool-{}-{}",
                    std::process::id(),
                    POOL_SEQ.fetch_add(1, Ordering::Relaxed)
                ));
                (dir, true)
            }
        };
        std::fs::create_dir_all(&state_dir)?;

        let mut board = TaskBoard::open(&state_dir)?;
        if let Some(stale) = self.config.stale_timeout {
            board = board.with_stale_timeout(stale);
        }
        // Creating the journal up front keeps first use cheap and marks the
        // directory as fully prepared.
        MessageJournal::open(&state_dir)?;

        tracing::info!(state_dir = %state_dir.display(), "team state prepared");
        self.team = Some(TeamState { state_dir, created, board });
        Ok(())
    }

    /// Reverse of preparation: drop the board, remove an auto-created state
    /// directory, clear the bus.
    fn teardown(&mut self) {
        if let Some(team) = self.team.take() {
            if team.created {
                if let Err(e) = std::fs::remove_dir_all(&team.state_dir) {
                    tracing::warn!(
                        state_dir = %team.state_dir.display(),
                        error = %e,
                        "failed to remove team state dir"
                    );
                }
            }
        }
        self.bus.clear();
        tracing::debug!("pool torn down");
    }
}

fn emit(handler: &Option<EventHandler>, event: &PoolEvent) {
    if let Some(handler) = handler {
        handler(event);
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
