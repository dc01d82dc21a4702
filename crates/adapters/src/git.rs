// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Narrow git adapter interface (§1 "the underlying VCS, invoked through
//! a narrow git adapter interface"; §6 "Subprocess contract").
//!
//! The kernel never shells out to `git` directly — every call goes
//! through this trait so `lumenflow-worktree` can be tested against a
//! fake without a real repository on disk.

use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("git {args:?} exited with {status}: {stderr}")]
    CommandFailed { args: Vec<String>, status: i32, stderr: String },
    #[error("failed to spawn git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git output was not valid UTF-8")]
    NotUtf8,
}

/// VCS operations the kernel needs (§6): worktree list/add/remove, branch
/// exists/create/delete, checkout, merge `ff-only`, rebase, fetch, pull
/// `--rebase`, push/push-refspec, `raw` for diagnostics, plus read-only
/// queries (current branch, status, diff, show-at-ref).
#[async_trait]
pub trait GitAdapter: Send + Sync + 'static {
    async fn current_branch(&self, repo: &Path) -> Result<String, GitError>;
    async fn status_porcelain(&self, repo: &Path) -> Result<String, GitError>;
    async fn diff_against(&self, repo: &Path, base: &str) -> Result<String, GitError>;
    async fn show_at_ref(&self, repo: &Path, rev: &str, path: &str) -> Result<String, GitError>;

    async fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, GitError>;
    async fn create_branch(&self, repo: &Path, branch: &str, from: &str) -> Result<(), GitError>;
    async fn delete_branch(&self, repo: &Path, branch: &str) -> Result<(), GitError>;
    async fn checkout(&self, repo: &Path, branch: &str) -> Result<(), GitError>;

    async fn worktree_add(&self, repo: &Path, path: &Path, branch: &str) -> Result<(), GitError>;
    async fn worktree_remove(&self, repo: &Path, path: &Path) -> Result<(), GitError>;
    async fn worktree_list(&self, repo: &Path) -> Result<Vec<String>, GitError>;

    async fn fetch(&self, repo: &Path, remote: &str) -> Result<(), GitError>;
    async fn pull_rebase(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), GitError>;
    async fn merge_ff_only(&self, repo: &Path, branch: &str) -> Result<(), GitError>;
    async fn rebase(&self, repo: &Path, onto: &str) -> Result<(), GitError>;
    async fn rebase_abort(&self, repo: &Path) -> Result<(), GitError>;

    async fn push(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), GitError>;
    async fn push_force_with_lease(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), GitError>;

    /// Escape hatch for diagnostics not covered above (§6 "`raw` for
    /// diagnostics"); never used by orchestration logic itself.
    async fn raw(&self, repo: &Path, args: &[&str]) -> Result<String, GitError>;

    /// Whether `status_porcelain` reports no pending changes.
    async fn is_clean(&self, repo: &Path) -> Result<bool, GitError> {
        Ok(self.status_porcelain(repo).await?.trim().is_empty())
    }

    /// Whether `ancestor` is an ancestor of (or equal to) `descendant`
    /// (`git merge-base --is-ancestor`) — used to tell "main is simply
    /// stale" from "main and the branch have truly diverged" (§4.9).
    async fn is_ancestor(&self, repo: &Path, ancestor: &str, descendant: &str) -> Result<bool, GitError>;
}

/// CLI-backed `GitAdapter`, shelling out to the system `git` binary via
/// `tokio::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliGitAdapter;

impl CliGitAdapter {
    async fn run(&self, repo: &Path, args: &[&str]) -> Result<String, GitError> {
        let output: Output = tokio::process::Command::new("git").current_dir(repo).args(args).output().await?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                args: args.iter().map(|s| s.to_string()).collect(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        String::from_utf8(output.stdout).map(|s| s.trim().to_string()).map_err(|_| GitError::NotUtf8)
    }
}

#[async_trait]
impl GitAdapter for CliGitAdapter {
    async fn current_branch(&self, repo: &Path) -> Result<String, GitError> {
        self.run(repo, &["rev-parse", "--abbrev-ref", "HEAD"]).await
    }

    async fn status_porcelain(&self, repo: &Path) -> Result<String, GitError> {
        self.run(repo, &["status", "--porcelain"]).await
    }

    async fn diff_against(&self, repo: &Path, base: &str) -> Result<String, GitError> {
        self.run(repo, &["diff", base]).await
    }

    async fn show_at_ref(&self, repo: &Path, rev: &str, path: &str) -> Result<String, GitError> {
        self.run(repo, &["show", &format!("{rev}:{path}")]).await
    }

    async fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool, GitError> {
        match self.run(repo, &["rev-parse", "--verify", "--quiet", branch]).await {
            Ok(_) => Ok(true),
            Err(GitError::CommandFailed { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_branch(&self, repo: &Path, branch: &str, from: &str) -> Result<(), GitError> {
        self.run(repo, &["branch", branch, from]).await.map(|_| ())
    }

    async fn delete_branch(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        self.run(repo, &["branch", "-D", branch]).await.map(|_| ())
    }

    async fn checkout(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        self.run(repo, &["checkout", branch]).await.map(|_| ())
    }

    async fn worktree_add(&self, repo: &Path, path: &Path, branch: &str) -> Result<(), GitError> {
        let path_str = path.to_string_lossy();
        self.run(repo, &["worktree", "add", &path_str, branch]).await.map(|_| ())
    }

    async fn worktree_remove(&self, repo: &Path, path: &Path) -> Result<(), GitError> {
        let path_str = path.to_string_lossy();
        self.run(repo, &["worktree", "remove", "--force", &path_str]).await.map(|_| ())
    }

    async fn worktree_list(&self, repo: &Path) -> Result<Vec<String>, GitError> {
        let out = self.run(repo, &["worktree", "list", "--porcelain"]).await?;
        Ok(out.lines().filter_map(|l| l.strip_prefix("worktree ")).map(str::to_string).collect())
    }

    async fn fetch(&self, repo: &Path, remote: &str) -> Result<(), GitError> {
        self.run(repo, &["fetch", remote]).await.map(|_| ())
    }

    async fn pull_rebase(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run(repo, &["pull", "--rebase", remote, branch]).await.map(|_| ())
    }

    async fn merge_ff_only(&self, repo: &Path, branch: &str) -> Result<(), GitError> {
        self.run(repo, &["merge", "--ff-only", branch]).await.map(|_| ())
    }

    async fn rebase(&self, repo: &Path, onto: &str) -> Result<(), GitError> {
        self.run(repo, &["rebase", onto]).await.map(|_| ())
    }

    async fn rebase_abort(&self, repo: &Path) -> Result<(), GitError> {
        self.run(repo, &["rebase", "--abort"]).await.map(|_| ())
    }

    async fn push(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run(repo, &["push", remote, branch]).await.map(|_| ())
    }

    async fn push_force_with_lease(&self, repo: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run(repo, &["push", "--force-with-lease", remote, branch]).await.map(|_| ())
    }

    async fn raw(&self, repo: &Path, args: &[&str]) -> Result<String, GitError> {
        self.run(repo, args).await
    }

    async fn is_ancestor(&self, repo: &Path, ancestor: &str, descendant: &str) -> Result<bool, GitError> {
        let status = tokio::process::Command::new("git")
            .current_dir(repo)
            .args(["merge-base", "--is-ancestor", ancestor, descendant])
            .status()
            .await?;
        match status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(GitError::CommandFailed {
                args: vec!["merge-base".to_string(), "--is-ancestor".to_string(), ancestor.to_string(), descendant.to_string()],
                status: status.code().unwrap_or(-1),
                stderr: String::new(),
            }),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
