// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with timeout and kill.

use crate::{ExecResult, SandboxError};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Run `cmd` to completion or until `timeout` elapses.
///
/// On timeout the child is killed (kill_on_drop) and the result carries
/// [`TIMEOUT_EXIT_CODE`](crate::TIMEOUT_EXIT_CODE) with a timeout note in
/// stderr. A command killed by a signal reports exit code -1.
pub(crate) async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
) -> Result<ExecResult, SandboxError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn()?;
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => {
            let output = output?;
            Ok(ExecResult {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code().unwrap_or(-1),
            })
        }
        Err(_elapsed) => Ok(ExecResult::timed_out(timeout)),
    }
}

/// `sh -c <command>` with the command as a single argv element, never
/// interpolated into shell text.
pub(crate) fn shell_command(command: &str, cwd: &std::path::Path) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command).current_dir(cwd);
    cmd
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
