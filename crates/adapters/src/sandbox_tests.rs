// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

use super::*;
use lumenflow_core::SandboxConfig;

fn profile() -> SandboxProfile {
    SandboxProfile {
        project_root: PathBuf::from("/proj"),
        worktree_path: PathBuf::from("/proj/.worktrees/wu-1"),
        wu_id: "WU-1".to_string(),
        extra_writable_roots: vec![PathBuf::from("/tmp/extra")],
    }
}

#[test]
fn resolve_writable_roots_includes_worktree_and_extra_roots() {
    let config = SandboxConfig::default();
    let roots = resolve_writable_roots(&profile(), &config);
    assert!(roots.contains(&PathBuf::from("/proj/.worktrees/wu-1")));
    assert!(roots.contains(&PathBuf::from("/tmp/extra")));
}

#[test]
fn resolve_writable_roots_excludes_anything_under_a_deny_root() {
    let config = SandboxConfig {
        deny_writable_roots: vec![PathBuf::from("/tmp")],
        ..SandboxConfig::default()
    };
    let roots = resolve_writable_roots(&profile(), &config);
    assert!(!roots.contains(&PathBuf::from("/tmp/extra")));
    assert!(roots.contains(&PathBuf::from("/proj/.worktrees/wu-1")));
}

#[test]
fn resolve_writable_roots_dedups_overlapping_config_and_profile_roots() {
    let config = SandboxConfig {
        extra_writable_roots: vec![PathBuf::from("/tmp/extra")],
        ..SandboxConfig::default()
    };
    let roots = resolve_writable_roots(&profile(), &config);
    assert_eq!(roots.iter().filter(|r| *r == &PathBuf::from("/tmp/extra")).count(), 1);
}

#[tokio::test]
async fn unsupported_backend_fails_closed_without_fallback() {
    let request = SandboxRequest {
        profile: profile(),
        command: vec!["true".to_string()],
        allow_unsandboxed_fallback: false,
    };
    let result = UnsupportedBackend.run(&request, &SandboxConfig::default()).await.unwrap();
    assert!(result.fail_closed);
    assert!(!result.enforced);
    assert!(result.invocation.is_none());
}

#[tokio::test]
async fn unsupported_backend_runs_unsandboxed_with_warning_when_fallback_allowed() {
    let request = SandboxRequest {
        profile: profile(),
        command: vec!["true".to_string()],
        allow_unsandboxed_fallback: true,
    };
    let result = UnsupportedBackend.run(&request, &SandboxConfig::default()).await.unwrap();
    assert!(!result.fail_closed);
    assert!(!result.enforced);
    assert!(result.warning.is_some());
}

#[tokio::test]
async fn windows_backend_reports_unavailable_and_respects_fallback_flag() {
    assert!(!WindowsBackend.is_available().await);
    let request = SandboxRequest {
        profile: profile(),
        command: vec!["whoami".to_string()],
        allow_unsandboxed_fallback: false,
    };
    let result = WindowsBackend.run(&request, &SandboxConfig::default()).await.unwrap();
    assert!(result.fail_closed);
    assert_eq!(result.backend_id, "appcontainer");
}
