// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Preflight (§4.9 step 1): ensure the worktree is clean, the branch
//! exists, the remote is known, and `origin/main` is freshly fetched
//! before any rebase/merge attempt begins.

use crate::error::WorktreeError;
use lumenflow_adapters::GitAdapter;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct PreflightReport {
    pub clean: bool,
    pub branch_exists: bool,
    pub fetched: bool,
}

/// Runs the preflight checks and fetches `remote`. Returns an error
/// naming the first unmet condition rather than a bag of booleans the
/// caller has to re-check, since every subsequent step depends on all of
/// them holding.
pub async fn preflight(
    git: &dyn GitAdapter,
    repo: &Path,
    remote: &str,
    branch: &str,
) -> Result<PreflightReport, WorktreeError> {
    let clean = git.is_clean(repo).await?;
    if !clean {
        return Err(WorktreeError::PreflightFailed { reason: format!("worktree for {branch} has uncommitted changes") });
    }

    let branch_exists = git.branch_exists(repo, branch).await?;
    if !branch_exists {
        return Err(WorktreeError::PreflightFailed { reason: format!("branch {branch} does not exist") });
    }

    git.fetch(repo, remote).await?;

    Ok(PreflightReport { clean, branch_exists, fetched: true })
}

#[cfg(test)]
#[path = "preflight_tests.rs"]
mod tests;
