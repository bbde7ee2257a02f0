// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! ap-sandbox: execution environments for agent shell commands.
//!
//! A sandbox is either a host subprocess confined to a workspace directory
//! or a persistent container with the workspace bind-mounted. Both share
//! the same three-operation contract: start, exec with a timeout, stop.

pub mod container;
pub mod error;
pub mod host;
mod subprocess;
pub mod validate;

pub use container::ContainerSandbox;
pub use error::SandboxError;
pub use host::HostSandbox;
pub use validate::validate_workspace;

use ap_core::{ContainerConfig, SandboxKind};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Exit code reported when a command exceeds its timeout, matching the
/// shell convention of `timeout(1)`.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Output of one command executed inside a sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecResult {
    pub fn ok(&self) -> bool {
        self.exit_code == 0
    }

    pub(crate) fn timed_out(timeout: Duration) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("command timed out after {}s", timeout.as_secs_f64()),
            exit_code: TIMEOUT_EXIT_CODE,
        }
    }
}

/// Lifecycle state of a sandbox. Stopped is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SandboxState {
    Prepared,
    Running,
    Stopped,
}

/// Tagged execution backend; dispatch is a match.
#[derive(Debug)]
pub enum Sandbox {
    Host(HostSandbox),
    Container(ContainerSandbox),
}

impl Sandbox {
    /// Build a sandbox of the requested kind for `name` against `workspace`.
    ///
    /// Container construction probes for a runtime and fails with
    /// [`SandboxError::RuntimeUnavailable`] when neither docker nor podman
    /// is present.
    pub fn new(
        kind: SandboxKind,
        name: &str,
        workspace: &Path,
        container: &ContainerConfig,
    ) -> Result<Self, SandboxError> {
        match kind {
            SandboxKind::Host => Ok(Sandbox::Host(HostSandbox::new(name, workspace))),
            SandboxKind::Container => Ok(Sandbox::Container(ContainerSandbox::new(
                name,
                workspace,
                container.clone(),
            )?)),
        }
    }

    pub async fn start(&mut self) -> Result<(), SandboxError> {
        match self {
            Sandbox::Host(s) => s.start().await,
            Sandbox::Container(s) => s.start().await,
        }
    }

    pub async fn exec(
        &mut self,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecResult, SandboxError> {
        match self {
            Sandbox::Host(s) => s.exec(command, timeout).await,
            Sandbox::Container(s) => s.exec(command, timeout).await,
        }
    }

    /// Tear down the sandbox. Idempotent and best-effort: teardown problems
    /// are logged, never raised.
    pub async fn stop(&mut self) {
        match self {
            Sandbox::Host(s) => s.stop().await,
            Sandbox::Container(s) => s.stop().await,
        }
    }

    pub fn kind(&self) -> SandboxKind {
        match self {
            Sandbox::Host(_) => SandboxKind::Host,
            Sandbox::Container(_) => SandboxKind::Container,
        }
    }

    pub fn workspace(&self) -> &Path {
        match self {
            Sandbox::Host(s) => s.workspace(),
            Sandbox::Container(s) => s.workspace(),
        }
    }

    pub fn state(&self) -> SandboxState {
        match self {
            Sandbox::Host(s) => s.state(),
            Sandbox::Container(s) => s.state(),
        }
    }
}
