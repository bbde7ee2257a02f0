// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container sandbox driven through the docker/podman CLI.
//!
//! The container is a long-lived `sleep infinity` process with the
//! workspace bind-mounted at /workspace; each exec is a `<runtime> exec`
//! host subprocess. Command timeouts kill only the exec process, never the
//! container itself.

use crate::subprocess::run_with_timeout;
use crate::{ExecResult, SandboxError, SandboxState};
use ap_core::ContainerConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

const START_TIMEOUT: Duration = Duration::from_secs(120);
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const STOP_TIMEOUT: Duration = Duration::from_secs(30);

/// Detected container runtime, probed in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRuntime {
    Docker,
    Podman,
}

impl ContainerRuntime {
    fn bin(self) -> &'static str {
        match self {
            ContainerRuntime::Docker => "docker",
            ContainerRuntime::Podman => "podman",
        }
    }
}

/// Probe for docker, then podman.
fn detect_runtime() -> Result<ContainerRuntime, SandboxError> {
    for runtime in [ContainerRuntime::Docker, ContainerRuntime::Podman] {
        let probe = std::process::Command::new(runtime.bin())
            .arg("--version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status();
        if matches!(probe, Ok(status) if status.success()) {
            return Ok(runtime);
        }
    }
    Err(SandboxError::RuntimeUnavailable)
}

/// Container name for one agent: pid-scoped so concurrent pools on the same
/// host never collide.
fn container_name(agent_name: &str) -> String {
    format!("agentpool-{}-{}", agent_name, std::process::id())
}

/// `run` arguments for a fresh detached container.
fn run_args(name: &str, workspace: &Path, config: &ContainerConfig) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        name.to_string(),
        "-v".to_string(),
        format!("{}:/workspace", workspace.display()),
        "-w".to_string(),
        "/workspace".to_string(),
        "--memory".to_string(),
        config.memory_limit.clone(),
        "--cpus".to_string(),
        config.cpu_limit.clone(),
        "--security-opt".to_string(),
        "no-new-privileges".to_string(),
    ];
    if let Some(network) = &config.network {
        args.push("--network".to_string());
        args.push(network.clone());
    }
    args.push(config.image.clone());
    args.push("sleep".to_string());
    args.push("infinity".to_string());
    args
}

/// Sandbox backed by a persistent container.
#[derive(Debug)]
pub struct ContainerSandbox {
    name: String,
    workspace: PathBuf,
    config: ContainerConfig,
    runtime: ContainerRuntime,
    state: SandboxState,
}

impl ContainerSandbox {
    /// Probe for a runtime and prepare a sandbox named after the agent.
    pub fn new(
        agent_name: &str,
        workspace: impl Into<PathBuf>,
        config: ContainerConfig,
    ) -> Result<Self, SandboxError> {
        let runtime = detect_runtime()?;
        Ok(Self {
            name: container_name(agent_name),
            workspace: workspace.into(),
            config,
            runtime,
            state: SandboxState::Prepared,
        })
    }

    /// Reuse a healthy container under our name, or launch a fresh one.
    pub async fn start(&mut self) -> Result<(), SandboxError> {
        if self.state == SandboxState::Stopped {
            return Err(SandboxError::NotRunning);
        }
        std::fs::create_dir_all(&self.workspace)?;

        if self.is_running().await? {
            tracing::info!(container = %self.name, "reusing running container");
            self.state = SandboxState::Running;
            return Ok(());
        }

        let mut cmd = Command::new(self.runtime.bin());
        cmd.args(run_args(&self.name, &self.workspace, &self.config));
        let result = run_with_timeout(cmd, START_TIMEOUT).await?;
        if !result.ok() {
            return Err(SandboxError::StartFailed(result.stderr.trim().to_string()));
        }

        tracing::info!(container = %self.name, image = %self.config.image, "container started");
        self.state = SandboxState::Running;
        Ok(())
    }

    /// Run `sh -c <command>` inside the container.
    ///
    /// The timeout applies to the exec subprocess only; the container keeps
    /// running so later commands still see prior filesystem state.
    pub async fn exec(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecResult, SandboxError> {
        if self.state != SandboxState::Running {
            return Err(SandboxError::NotRunning);
        }
        let mut cmd = Command::new(self.runtime.bin());
        cmd.args(["exec", &self.name, "sh", "-c", command]);
        run_with_timeout(cmd, timeout).await
    }

    /// Force-remove the container. Idempotent; failures are logged.
    pub async fn stop(&mut self) {
        if self.state == SandboxState::Stopped {
            return;
        }
        let mut cmd = Command::new(self.runtime.bin());
        cmd.args(["rm", "-f", &self.name]);
        match run_with_timeout(cmd, STOP_TIMEOUT).await {
            Ok(result) if !result.ok() => {
                tracing::warn!(container = %self.name, stderr = %result.stderr.trim(), "container removal failed");
            }
            Err(e) => {
                tracing::warn!(container = %self.name, error = %e, "container removal failed");
            }
            Ok(_) => {}
        }
        self.state = SandboxState::Stopped;
    }

    async fn is_running(&self) -> Result<bool, SandboxError> {
        let mut cmd = Command::new(self.runtime.bin());
        cmd.args(["inspect", "-f", "{{.State.Running}}", &self.name]);
        let result = run_with_timeout(cmd, PROBE_TIMEOUT).await?;
        Ok(result.ok() && result.stdout.trim() == "true")
    }

    pub fn container(&self) -> &str {
        &self.name
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn state(&self) -> SandboxState {
        self.state
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
