// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! The `complete` worktree/merge sequence (§4.9): preflight, auto-rebase,
//! fast-forward-only merge with backoff, artifact cleanup, docs
//! regeneration, push `--force-with-lease` — in that order.

use crate::artifact_cleanup::{clean_stray_artifacts, find_stray_artifacts};
use crate::docs::{docs_need_regeneration, regenerate_docs};
use crate::error::WorktreeError;
use crate::merge::{auto_rebase, merge_ff_only_with_backoff, AppendOnlyFiles, BackoffPolicy, MergeReport};
use crate::preflight::{preflight, PreflightReport};
use lumenflow_adapters::{DocGenerator, GitAdapter};
use std::path::Path;

/// Everything `complete_worktree` needs to know about the workspace's
/// conventions; built once per workspace config, not per call.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub remote: String,
    pub main_branch: String,
    pub wu_dir: String,
    pub doc_source_prefixes: Vec<String>,
    pub append_only: AppendOnlyFiles,
    pub backoff: BackoffPolicy,
}

/// What happened during a `complete_worktree` call, for the caller to
/// log or surface to the operator.
#[derive(Debug, Clone)]
pub struct CompletionReport {
    pub preflight: PreflightReport,
    pub merge: MergeReport,
    pub strays_cleaned: Vec<String>,
    pub docs_regenerated: Vec<String>,
    pub pushed: bool,
}

/// Runs the full §4.9 sequence for `branch` (the WU's own branch) onto
/// `config.main_branch`, identified as `own_wu_id` for artifact-cleanup
/// purposes.
pub async fn complete_worktree(
    git: &dyn GitAdapter,
    docs: &dyn DocGenerator,
    repo: &Path,
    branch: &str,
    own_wu_id: &str,
    config: &CompletionConfig,
) -> Result<CompletionReport, WorktreeError> {
    let preflight_report = preflight(git, repo, &config.remote, branch).await?;

    auto_rebase(git, repo, &config.main_branch, &config.append_only).await?;

    let merge_report = merge_ff_only_with_backoff(
        git,
        repo,
        &config.remote,
        &config.main_branch,
        branch,
        &config.append_only,
        config.backoff,
    )
    .await?;

    let changed = git.diff_against(repo, &config.main_branch).await?;
    let changed_paths: Vec<String> = changed.lines().map(str::to_string).collect();

    let strays = find_stray_artifacts(&changed_paths, &config.wu_dir, own_wu_id);
    if !strays.is_empty() {
        clean_stray_artifacts(git, repo, &config.main_branch, &strays).await?;
    }

    let docs_regenerated = if docs_need_regeneration(&changed_paths, &config.doc_source_prefixes) {
        regenerate_docs(docs, git, repo).await?
    } else {
        Vec::new()
    };

    git.push_force_with_lease(repo, &config.remote, branch).await?;

    Ok(CompletionReport {
        preflight: preflight_report,
        merge: merge_report,
        strays_cleaned: strays.into_iter().map(|s| s.path).collect(),
        docs_regenerated,
        pushed: true,
    })
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
