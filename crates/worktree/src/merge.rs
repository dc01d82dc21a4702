// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Auto-rebase and fast-forward-only merge with backoff (§4.9 steps 2-3).
//!
//! Rebase conflicts are only auto-resolved when every conflicted path is
//! one of the declared append-only files; anything else aborts the
//! rebase and surfaces the conflict for a human.

use crate::conflict_resolver::{
    assert_no_conflict_artifacts_in_index, parse_unmerged_paths, resolve_status_or_backlog_conflict,
    union_event_log,
};
use crate::error::WorktreeError;
use lumenflow_adapters::GitAdapter;
use std::path::Path;
use std::time::Duration;

/// Paths treated as append-only for automatic conflict resolution
/// (§4.9): the event log is unioned by identity, the board and backlog
/// always take theirs since both are regenerated from the event log
/// right after the merge.
#[derive(Debug, Clone)]
pub struct AppendOnlyFiles {
    pub event_log: String,
    pub status_board: String,
    pub backlog: String,
}

impl AppendOnlyFiles {
    fn is_event_log(&self, path: &str) -> bool {
        path == self.event_log
    }

    fn is_theirs_preferred(&self, path: &str) -> bool {
        path == self.status_board || path == self.backlog
    }
}

/// Backoff policy for the fast-forward-only merge retry loop.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self { max_attempts: 5, base_delay: Duration::from_millis(200) }
    }
}

/// Rebases `repo`'s current branch onto `onto`, auto-resolving conflicts
/// confined to `append_only` files. Aborts and returns
/// `ConflictResolutionRefused` if any conflicted path isn't covered, or
/// if an append-only file's content on either side isn't schema-valid.
pub async fn auto_rebase(
    git: &dyn GitAdapter,
    repo: &Path,
    onto: &str,
    append_only: &AppendOnlyFiles,
) -> Result<(), WorktreeError> {
    if git.rebase(repo, onto).await.is_ok() {
        return Ok(());
    }

    let porcelain = git.status_porcelain(repo).await?;
    let unmerged = parse_unmerged_paths(&porcelain);
    if unmerged.is_empty() {
        // Rebase failed for a reason other than a content conflict.
        git.rebase_abort(repo).await?;
        return Err(WorktreeError::ConflictResolutionRefused {
            reason: "rebase failed with no unmerged paths reported".to_string(),
        });
    }

    for path in &unmerged {
        if let Err(e) = resolve_one_conflict(git, repo, path, append_only).await {
            git.rebase_abort(repo).await?;
            return Err(e);
        }
    }

    if let Err(e) = git.raw(repo, &["rebase", "--continue"]).await {
        git.rebase_abort(repo).await?;
        return Err(e.into());
    }

    let porcelain = git.status_porcelain(repo).await?;
    assert_no_conflict_artifacts_in_index(&parse_unmerged_paths(&porcelain))
}

async fn resolve_one_conflict(
    git: &dyn GitAdapter,
    repo: &Path,
    path: &str,
    append_only: &AppendOnlyFiles,
) -> Result<(), WorktreeError> {
    if append_only.is_event_log(path) {
        let ours = git.show_at_ref(repo, ":2", path).await.unwrap_or_default();
        let theirs = git.show_at_ref(repo, ":3", path).await.unwrap_or_default();
        let merged = union_event_log(&ours, &theirs, |v| {
            v.get("id").and_then(|x| x.as_str()).unwrap_or_default().to_string()
        })?;
        write_and_stage(git, repo, path, &merged).await
    } else if append_only.is_theirs_preferred(path) {
        let theirs = git.show_at_ref(repo, ":3", path).await.unwrap_or_default();
        let resolved = resolve_status_or_backlog_conflict(&theirs);
        write_and_stage(git, repo, path, &resolved).await
    } else {
        Err(WorktreeError::ConflictResolutionRefused {
            reason: format!("{path} is not an append-only file; refusing to auto-resolve"),
        })
    }
}

async fn write_and_stage(git: &dyn GitAdapter, repo: &Path, path: &str, content: &str) -> Result<(), WorktreeError> {
    let full_path = repo.join(path);
    std::fs::write(&full_path, content).map_err(|e| WorktreeError::Io { path: full_path, source: e })?;
    git.raw(repo, &["add", path]).await?;
    Ok(())
}

/// Outcome of a successful fast-forward-only merge attempt.
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub attempts: u32,
}

/// Merges `branch` into the current branch fast-forward-only, retrying
/// with exponential backoff and an intervening `auto_rebase` on
/// failure (§4.9 step 3). On exhaustion, reports whether `onto` is
/// already an ancestor of `branch` to distinguish "main was simply
/// stale" from "main and the branch have truly diverged".
pub async fn merge_ff_only_with_backoff(
    git: &dyn GitAdapter,
    repo: &Path,
    remote: &str,
    onto: &str,
    branch: &str,
    append_only: &AppendOnlyFiles,
    policy: BackoffPolicy,
) -> Result<MergeReport, WorktreeError> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match git.merge_ff_only(repo, branch).await {
            Ok(()) => return Ok(MergeReport { attempts }),
            Err(_) if attempts >= policy.max_attempts => {
                let main_is_ancestor = git.is_ancestor(repo, onto, branch).await.unwrap_or(false);
                return Err(WorktreeError::MergeRetriesExhausted { attempts, main_is_ancestor });
            }
            Err(_) => {
                git.fetch(repo, remote).await?;
                auto_rebase(git, repo, onto, append_only).await?;
                tokio::time::sleep(policy.base_delay * attempts).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
