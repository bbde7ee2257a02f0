// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace validator specs.

use ap_sandbox::validate_workspace;
use std::path::Path;

#[test]
fn blocked_system_paths() {
    for path in ["/etc/passwd", "/", "/root", "/var/log"] {
        assert!(
            validate_workspace(Path::new(path), None).is_err(),
            "{path} should be rejected"
        );
    }
}

#[test]
fn allowed_temp_paths() {
    for path in ["/tmp/x", "/var/folders/a/b", "/var/tmp/y"] {
        assert!(
            validate_workspace(Path::new(path), None).is_ok(),
            "{path} should be accepted"
        );
    }
}

#[test]
fn workspace_root_is_a_hard_boundary() {
    let root = tempfile::tempdir().unwrap();
    let inside = root.path().join("proj");
    let outside = tempfile::tempdir().unwrap();

    assert!(validate_workspace(&inside, Some(root.path())).is_ok());
    assert!(validate_workspace(outside.path(), Some(root.path())).is_err());
}
