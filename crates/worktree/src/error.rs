// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Worktree/merge orchestrator errors (§4.9, §7).

use lumenflow_adapters::{DocGeneratorError, GitError};
use lumenflow_core::{ErrorKind, LumenError};

#[derive(Debug, thiserror::Error)]
pub enum WorktreeError {
    #[error("preflight failed: {reason}")]
    PreflightFailed { reason: String },

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    DocGenerator(#[from] DocGeneratorError),

    #[error("merge retries exhausted ({attempts} attempts); main_is_ancestor={main_is_ancestor}")]
    MergeRetriesExhausted { attempts: u32, main_is_ancestor: bool },

    #[error("conflict resolver refuses: {reason}")]
    ConflictResolutionRefused { reason: String },

    #[error("unmerged paths remain in the index after conflict resolution: {paths:?}")]
    UnresolvedConflictArtifacts { paths: Vec<String> },

    #[error("failed to read/write {path}: {source}")]
    Io { path: std::path::PathBuf, #[source] source: std::io::Error },
}

impl LumenError for WorktreeError {
    fn kind(&self) -> ErrorKind {
        match self {
            WorktreeError::PreflightFailed { .. } => ErrorKind::State,
            WorktreeError::Git(_) => ErrorKind::External,
            WorktreeError::DocGenerator(_) => ErrorKind::External,
            WorktreeError::MergeRetriesExhausted { .. } => ErrorKind::MergeConflict,
            WorktreeError::ConflictResolutionRefused { .. } => ErrorKind::MergeConflict,
            WorktreeError::UnresolvedConflictArtifacts { .. } => ErrorKind::MergeConflict,
            WorktreeError::Io { .. } => ErrorKind::Io,
        }
    }

    fn fix_hint(&self) -> Option<String> {
        match self {
            WorktreeError::MergeRetriesExhausted { main_is_ancestor: false, .. } => {
                Some("main and the branch have truly diverged; rebase manually and retry".to_string())
            }
            WorktreeError::MergeRetriesExhausted { main_is_ancestor: true, .. } => {
                Some("main was simply stale; fetch and retry".to_string())
            }
            WorktreeError::ConflictResolutionRefused { .. } => {
                Some("resolve the conflicting append-only file manually, then retry".to_string())
            }
            _ => None,
        }
    }
}
