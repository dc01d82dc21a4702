// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Artifact cleanup (§4.9 step 4): a conflicted rebase can pull in
//! another WU's stamp file or board line that has no business on this
//! branch. Detect and remove those before pushing, in one commit.

use crate::error::WorktreeError;
use lumenflow_adapters::GitAdapter;
use std::path::Path;

/// A stray artifact found in the diff against `base` that belongs to a
/// WU other than the one this branch is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrayArtifact {
    pub path: String,
    pub wu_id: String,
}

/// Scans `diff --stat`-equivalent paths touched since `base` for stamp
/// files (`<id>.stamp.json`) or WU yaml files (`<id>.yaml`) belonging to
/// a WU other than `own_wu_id`, under `wu_dir` (relative to the repo
/// root).
pub fn find_stray_artifacts(changed_paths: &[String], wu_dir: &str, own_wu_id: &str) -> Vec<StrayArtifact> {
    changed_paths
        .iter()
        .filter_map(|path| {
            let rel = path.strip_prefix(wu_dir)?.trim_start_matches('/');
            let id = rel.strip_suffix(".stamp.json").or_else(|| rel.strip_suffix(".yaml"))?;
            if id == own_wu_id {
                None
            } else {
                Some(StrayArtifact { path: path.clone(), wu_id: id.to_string() })
            }
        })
        .collect()
}

/// Removes the stray artifacts from the worktree and stages the
/// removal, restoring them to whatever `base` had (or deleting them if
/// `base` didn't have them either) so they don't ride along on this
/// branch's push.
pub async fn clean_stray_artifacts(
    git: &dyn GitAdapter,
    repo: &Path,
    base: &str,
    strays: &[StrayArtifact],
) -> Result<(), WorktreeError> {
    for stray in strays {
        match git.show_at_ref(repo, base, &stray.path).await {
            Ok(original) => {
                let full_path = repo.join(&stray.path);
                std::fs::write(&full_path, original).map_err(|e| WorktreeError::Io { path: full_path, source: e })?;
            }
            Err(_) => {
                let full_path = repo.join(&stray.path);
                let _ = std::fs::remove_file(&full_path);
            }
        }
        git.raw(repo, &["add", &stray.path]).await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "artifact_cleanup_tests.rs"]
mod tests;
