// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host-local sandbox: a shell subprocess per command, confined to the
//! workspace directory by working directory only.

use crate::subprocess::{run_with_timeout, shell_command};
use crate::{ExecResult, SandboxError, SandboxState};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sandbox that runs commands directly on the host.
#[derive(Debug)]
pub struct HostSandbox {
    name: String,
    workspace: PathBuf,
    state: SandboxState,
}

impl HostSandbox {
    pub fn new(name: impl Into<String>, workspace: impl Into<PathBuf>) -> Self {
        Self { name: name.into(), workspace: workspace.into(), state: SandboxState::Prepared }
    }

    /// Ensure the workspace directory exists and mark the sandbox running.
    pub async fn start(&mut self) -> Result<(), SandboxError> {
        if self.state == SandboxState::Stopped {
            return Err(SandboxError::NotRunning);
        }
        std::fs::create_dir_all(&self.workspace)?;
        self.state = SandboxState::Running;
        tracing::debug!(sandbox = %self.name, workspace = %self.workspace.display(), "host sandbox started");
        Ok(())
    }

    /// Run `sh -c <command>` in the workspace with a wall-clock timeout.
    pub async fn exec(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecResult, SandboxError> {
        if self.state != SandboxState::Running {
            return Err(SandboxError::NotRunning);
        }
        run_with_timeout(shell_command(command, &self.workspace), timeout).await
    }

    /// No resources to release; flips the state to Stopped.
    pub async fn stop(&mut self) {
        self.state = SandboxState::Stopped;
    }

    pub fn name(&self) -> &str {
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
#[path = "host_tests.rs"]
mod tests;
