// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Documentation generator interface (§1 "documentation generators...
//! treated as external collaborators"; §6).
//!
//! LumenFlow does not render docs itself — this is a narrow seam so a
//! worktree's post-merge hook can ask *something* to regenerate derived
//! documentation without the kernel knowing what tool that is.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocGeneratorError {
    #[error("doc generator command failed: {0}")]
    CommandFailed(String),
    #[error("failed to spawn doc generator: {0}")]
    Spawn(#[from] std::io::Error),
}

#[async_trait]
pub trait DocGenerator: Send + Sync + 'static {
    /// Regenerates derived documentation for `repo_root`, returning the
    /// paths it touched (for the worktree layer's append-only conflict
    /// resolver, which treats regenerable docs as always-theirs, §4.9).
    async fn regenerate(&self, repo_root: &Path) -> Result<Vec<String>, DocGeneratorError>;
}

/// Shells out to a configured command (e.g. a project's own `make docs`)
/// and reports success/failure without parsing its output.
pub struct CommandDocGenerator {
    pub command: Vec<String>,
}

#[async_trait]
impl DocGenerator for CommandDocGenerator {
    async fn regenerate(&self, repo_root: &Path) -> Result<Vec<String>, DocGeneratorError> {
        let Some((program, args)) = self.command.split_first() else {
            return Ok(Vec::new());
        };
        let output = tokio::process::Command::new(program).args(args).current_dir(repo_root).output().await?;
        if !output.status.success() {
            return Err(DocGeneratorError::CommandFailed(String::from_utf8_lossy(&output.stderr).trim().to_string()));
        }
        Ok(Vec::new())
    }
}

/// No-op generator for workspaces that don't configure one; `regenerate`
/// is then simply skipped.
pub struct NoopDocGenerator;

#[async_trait]
impl DocGenerator for NoopDocGenerator {
    async fn regenerate(&self, _repo_root: &Path) -> Result<Vec<String>, DocGeneratorError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
#[path = "doc_generator_tests.rs"]
mod tests;
