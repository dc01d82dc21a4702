// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Sandbox backend contract (§4.10): invoke an arbitrary command under the
//! best sandboxing the host platform supports, failing closed when none is
//! available unless the caller explicitly allows an unsandboxed fallback.
//!
//! LumenFlow never runs user workloads itself — it only invokes them
//! through this interface (§1). The kernel decides *what* to run; this
//! crate decides *how* to contain it.

use async_trait::async_trait;
use lumenflow_core::SandboxConfig;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("no sandbox backend available on this platform and unsandboxed fallback was not allowed: {reason}")]
    FailClosed { reason: String },
    #[error("failed to spawn sandboxed command: {0}")]
    Spawn(#[from] std::io::Error),
}

/// §4.10 `profile`.
#[derive(Debug, Clone)]
pub struct SandboxProfile {
    pub project_root: PathBuf,
    pub worktree_path: PathBuf,
    pub wu_id: String,
    pub extra_writable_roots: Vec<PathBuf>,
}

/// §4.10 request.
#[derive(Debug, Clone)]
pub struct SandboxRequest {
    pub profile: SandboxProfile,
    pub command: Vec<String>,
    pub allow_unsandboxed_fallback: bool,
}

/// §4.10 response. `invocation` is the argv that was actually exec'd
/// (wrapped in the sandboxing tool's own argv when `enforced`); absent
/// when the request fails closed.
#[derive(Debug, Clone, Default)]
pub struct SandboxResult {
    pub backend_id: String,
    pub enforced: bool,
    pub fail_closed: bool,
    pub invocation: Option<Vec<String>>,
    pub reason: Option<String>,
    pub warning: Option<String>,
}

/// Union of `extra_writable_roots` (profile + config) minus anything
/// inside a configured deny-root (§4.10). Comparison is case-insensitive
/// only on Windows; exact elsewhere.
pub fn resolve_writable_roots(profile: &SandboxProfile, config: &SandboxConfig) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = vec![profile.worktree_path.clone()];
    roots.extend(profile.extra_writable_roots.iter().cloned());
    roots.extend(config.extra_writable_roots.iter().cloned());

    roots.retain(|root| !config.deny_writable_roots.iter().any(|deny| path_contains(deny, root)));
    roots.sort();
    roots.dedup();
    roots
}

#[cfg(not(target_os = "windows"))]
fn path_contains(ancestor: &Path, path: &Path) -> bool {
    path.starts_with(ancestor)
}

#[cfg(target_os = "windows")]
fn path_contains(ancestor: &Path, path: &Path) -> bool {
    let a = ancestor.to_string_lossy().to_lowercase();
    let p = path.to_string_lossy().to_lowercase();
    Path::new(&p).starts_with(Path::new(&a))
}

#[async_trait]
pub trait SandboxBackend: Send + Sync + 'static {
    /// Stable identifier reported in `SandboxResult::backend_id` (`bwrap`,
    /// `sandbox-exec`, `appcontainer`, `unsupported`, ...).
    fn backend_id(&self) -> &'static str;

    /// Whether this backend's enforcing tool is actually present on the
    /// host (e.g. `bwrap` on the PATH).
    async fn is_available(&self) -> bool;

    /// Runs `request.command` under this backend's containment, or falls
    /// back/fails-closed per `request.allow_unsandboxed_fallback`.
    async fn run(&self, request: &SandboxRequest, config: &SandboxConfig) -> Result<SandboxResult, SandboxError>;
}

async fn run_unsandboxed(command: &[String]) -> Result<(), SandboxError> {
    let Some((program, args)) = command.split_first() else {
        return Ok(());
    };
    let status = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .status()
        .await?;
    if !status.success() {
        tracing::warn!(code = ?status.code(), "unsandboxed command exited non-zero");
    }
    Ok(())
}

fn fallback_or_fail_closed(
    backend_id: &'static str,
    request: &SandboxRequest,
    missing: &str,
) -> Result<SandboxResult, SandboxError> {
    if request.allow_unsandboxed_fallback {
        Ok(SandboxResult {
            backend_id: backend_id.to_string(),
            enforced: false,
            fail_closed: false,
            invocation: Some(request.command.clone()),
            reason: None,
            warning: Some(format!("{missing} not found; running unsandboxed")),
        })
    } else {
        Ok(SandboxResult {
            backend_id: backend_id.to_string(),
            enforced: false,
            fail_closed: true,
            invocation: None,
            reason: Some(format!("{missing} not found and unsandboxed fallback was not allowed")),
            warning: None,
        })
    }
}

/// Linux: `bwrap` (bubblewrap), read-only-bind the whole filesystem and
/// bind-mount the worktree plus any resolved writable roots read-write.
pub struct LinuxBackend;

#[async_trait]
impl SandboxBackend for LinuxBackend {
    fn backend_id(&self) -> &'static str {
        "bwrap"
    }

    async fn is_available(&self) -> bool {
        which("bwrap")
    }

    async fn run(&self, request: &SandboxRequest, config: &SandboxConfig) -> Result<SandboxResult, SandboxError> {
        if !self.is_available().await {
            return fallback_or_fail_closed(self.backend_id(), request, "bwrap");
        }

        let writable_roots = resolve_writable_roots(&request.profile, config);
        let mut argv = vec!["bwrap".to_string(), "--ro-bind".to_string(), "/".to_string(), "/".to_string()];
        for root in &writable_roots {
            let p = root.to_string_lossy().to_string();
            argv.push("--bind".to_string());
            argv.push(p.clone());
            argv.push(p);
        }
        argv.push("--".to_string());
        argv.extend(request.command.iter().cloned());

        let status = tokio::process::Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .status()
            .await?;
        if !status.success() {
            tracing::warn!(code = ?status.code(), "sandboxed command exited non-zero");
        }

        Ok(SandboxResult {
            backend_id: self.backend_id().to_string(),
            enforced: true,
            fail_closed: false,
            invocation: Some(argv),
            reason: None,
            warning: None,
        })
    }
}

/// macOS: generate a `sandbox-exec` profile granting write access to the
/// worktree and resolved extra roots, read-only elsewhere.
pub struct MacBackend;

impl MacBackend {
    fn build_profile(writable_roots: &[PathBuf]) -> String {
        let mut profile = String::from("(version 1)\n(allow default)\n(deny file-write*)\n");
        for root in writable_roots {
            profile.push_str(&format!(
                "(allow file-write* (subpath \"{}\"))\n",
                root.to_string_lossy().replace('"', "\\\"")
            ));
        }
        profile
    }
}

#[async_trait]
impl SandboxBackend for MacBackend {
    fn backend_id(&self) -> &'static str {
        "sandbox-exec"
    }

    async fn is_available(&self) -> bool {
        which("sandbox-exec")
    }

    async fn run(&self, request: &SandboxRequest, config: &SandboxConfig) -> Result<SandboxResult, SandboxError> {
        if !self.is_available().await {
            return fallback_or_fail_closed(self.backend_id(), request, "sandbox-exec");
        }

        let writable_roots = resolve_writable_roots(&request.profile, config);
        let profile = Self::build_profile(&writable_roots);

        let mut argv = vec!["sandbox-exec".to_string(), "-p".to_string(), profile];
        argv.extend(request.command.iter().cloned());

        let status = tokio::process::Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .status()
            .await?;
        if !status.success() {
            tracing::warn!(code = ?status.code(), "sandboxed command exited non-zero");
        }

        Ok(SandboxResult {
            backend_id: self.backend_id().to_string(),
            enforced: true,
            fail_closed: false,
            invocation: Some(argv),
            reason: None,
            warning: None,
        })
    }
}

/// Windows: AppContainer-backed isolation, best-effort. Without a real
/// AppContainer token broker available, this backend currently always
/// reports unavailable and defers to fallback/fail-closed.
pub struct WindowsBackend;

#[async_trait]
impl SandboxBackend for WindowsBackend {
    fn backend_id(&self) -> &'static str {
        "appcontainer"
    }

    async fn is_available(&self) -> bool {
        false
    }

    async fn run(&self, request: &SandboxRequest, _config: &SandboxConfig) -> Result<SandboxResult, SandboxError> {
        fallback_or_fail_closed(self.backend_id(), request, "AppContainer broker")
    }
}

/// Any platform without a modeled backend: always fails closed unless the
/// caller explicitly allows unsandboxed execution.
pub struct UnsupportedBackend;

#[async_trait]
impl SandboxBackend for UnsupportedBackend {
    fn backend_id(&self) -> &'static str {
        "unsupported"
    }

    async fn is_available(&self) -> bool {
        false
    }

    async fn run(&self, request: &SandboxRequest, _config: &SandboxConfig) -> Result<SandboxResult, SandboxError> {
        if request.allow_unsandboxed_fallback {
            run_unsandboxed(&request.command).await?;
            Ok(SandboxResult {
                backend_id: self.backend_id().to_string(),
                enforced: false,
                fail_closed: false,
                invocation: Some(request.command.clone()),
                reason: None,
                warning: Some("no sandbox backend for this platform; running unsandboxed".to_string()),
            })
        } else {
            Ok(SandboxResult {
                backend_id: self.backend_id().to_string(),
                enforced: false,
                fail_closed: true,
                invocation: None,
                reason: Some("no sandbox backend for this platform".to_string()),
                warning: None,
            })
        }
    }
}

/// Picks the backend for the host platform (§4.10): `LinuxBackend` on
/// Linux, `MacBackend` on macOS, `WindowsBackend` on Windows, and
/// `UnsupportedBackend` everywhere else.
pub fn default_backend() -> Box<dyn SandboxBackend> {
    #[cfg(target_os = "linux")]
    {
        Box::new(LinuxBackend)
    }
    #[cfg(target_os = "macos")]
    {
        Box::new(MacBackend)
    }
    #[cfg(target_os = "windows")]
    {
        Box::new(WindowsBackend)
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        Box::new(UnsupportedBackend)
    }
}

fn which(binary: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(binary).is_file()))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "sandbox_tests.rs"]
mod tests;
