// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace path validation.
//!
//! Runs before any sandbox is created: resolves the candidate to a
//! canonical absolute path and rejects system locations. The workspace may
//! not exist yet; canonicalization goes through the deepest existing
//! ancestor so symlinked parents (macOS `/var` → `/private/var`, `/tmp` →
//! `/private/tmp`) are still resolved.

use crate::error::SandboxError;
use std::path::{Path, PathBuf};

/// System prefixes a workspace may never live under.
const BLOCKED_PREFIXES: &[&str] = &[
    "/etc", "/usr", "/bin", "/sbin", "/boot", "/dev", "/proc", "/sys", "/root", "/var",
];

/// Per-user temp areas exempt from the `/var` block.
const VAR_EXEMPTIONS: &[&str] = &["/var/folders", "/var/tmp"];

/// Validate `path` as a workspace, returning its canonical form.
///
/// When `allowed_root` is set the canonical path must additionally lie
/// within it.
pub fn validate_workspace(
    path: &Path,
    allowed_root: Option<&Path>,
) -> Result<PathBuf, SandboxError> {
    let canonical = canonicalize_lenient(path)
        .map_err(|e| rejected(path, format!("cannot resolve path: {e}")))?;

    if canonical == Path::new("/") {
        return Err(rejected(path, "filesystem root is not a workspace".to_string()));
    }

    // Compare against the prefix lists with any macOS /private veneer
    // stripped, so /var and /private/var are treated alike.
    let normalized = strip_private(&canonical);
    let exempt = VAR_EXEMPTIONS.iter().any(|p| normalized.starts_with(p));
    if !exempt {
        if let Some(blocked) = BLOCKED_PREFIXES.iter().find(|p| normalized.starts_with(p)) {
            return Err(rejected(path, format!("under blocked prefix {blocked}")));
        }
    }

    if let Some(root) = allowed_root {
        let root = canonicalize_lenient(root)
            .map_err(|e| rejected(path, format!("cannot resolve allowed root: {e}")))?;
        if !canonical.starts_with(&root) {
            return Err(rejected(
                path,
                format!("outside allowed root {}", root.display()),
            ));
        }
    }

    Ok(canonical)
}

fn rejected(path: &Path, reason: String) -> SandboxError {
    tracing::warn!(path = %path.display(), reason, "workspace rejected");
    SandboxError::WorkspaceRejected { path: path.to_path_buf(), reason }
}

fn strip_private(path: &Path) -> PathBuf {
    match path.strip_prefix("/private") {
        Ok(rest) => Path::new("/").join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Canonicalize through the deepest existing ancestor, re-appending the
/// non-existing tail components unchanged.
fn canonicalize_lenient(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;

    let mut existing = absolute.as_path();
    let mut tail: Vec<std::ffi::OsString> = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing.canonicalize()?;
    for name in tail.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
