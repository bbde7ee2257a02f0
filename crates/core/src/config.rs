// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool and container configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Hard upper bound on concurrently running agents, regardless of
/// configuration.
pub const MAX_AGENTS: usize = 8;

/// Which execution environment an agent's shell commands run in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SandboxKind {
    /// Subprocess on the host, confined to the workspace directory
    #[default]
    Host,
    /// Detached container with the workspace bind-mounted
    Container,
}

/// Container backend configuration.
///
/// Limits are passed to the runtime CLI verbatim (`--memory`, `--cpus`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Container image
    pub image: String,
    /// Memory cap, e.g. "512m"
    pub memory_limit: String,
    /// CPU cap, e.g. "1" or "0.5"
    pub cpu_limit: String,
    /// Network mode; None means the runtime's default bridge
    pub network: Option<String>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            image: "alpine:3.20".to_string(),
            memory_limit: "512m".to_string(),
            cpu_limit: "1".to_string(),
            network: None,
        }
    }
}

/// Caller-facing pool configuration.
///
/// `max_agents` is clamped to [`MAX_AGENTS`] wherever the pool reads it;
/// per-request overrides exist for model, sandbox kind, timeout, and system
/// prompt.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Concurrent-agent bound (clamped to 1..=MAX_AGENTS)
    pub max_agents: usize,
    /// Model passed to the runtime when a request omits one
    pub default_model: String,
    /// Sandbox kind used when a request omits one
    pub default_sandbox: SandboxKind,
    /// Default per-agent wall-clock timeout
    pub timeout: Duration,
    /// env-filter directive for operational logging
    pub log_level: String,
    /// Optional JSON-lines operational log path
    pub log_file: Option<PathBuf>,
    /// Workspace directory agents run against when a request omits one
    pub workspace: PathBuf,
    /// If set, every workspace must lie within this root
    pub workspace_root: Option<PathBuf>,
    /// Directory for the shared board and journal in team mode.
    /// None: the pool creates (and later removes) one under the temp dir.
    pub state_dir: Option<PathBuf>,
    /// InProgress tasks older than this are swept back to Pending on claim
    pub stale_timeout: Option<Duration>,
    pub container: ContainerConfig,
}

impl PoolConfig {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self { workspace: workspace.into(), ..Self::default() }
    }

    /// Set the concurrency bound, clamped to 1..=MAX_AGENTS.
    pub fn with_max_agents(mut self, n: usize) -> Self {
        self.max_agents = n.clamp(1, MAX_AGENTS);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn with_sandbox(mut self, kind: SandboxKind) -> Self {
        self.default_sandbox = kind;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    pub fn with_stale_timeout(mut self, timeout: Duration) -> Self {
        self.stale_timeout = Some(timeout);
        self
    }

    pub fn with_container(mut self, container: ContainerConfig) -> Self {
        self.container = container;
        self
    }

    /// Effective concurrency bound after clamping.
    pub fn effective_max_agents(&self) -> usize {
        self.max_agents.clamp(1, MAX_AGENTS)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_agents: 4,
            default_model: "default".to_string(),
            default_sandbox: SandboxKind::Host,
            timeout: Duration::from_secs(300),
            log_level: "info".to_string(),
            log_file: None,
            workspace: PathBuf::from("."),
            workspace_root: None,
            state_dir: None,
            stale_timeout: None,
            container: ContainerConfig::default(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
