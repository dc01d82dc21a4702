// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! In-memory `GitAdapter` for tests in other crates (`lumenflow-worktree`)
//! that need to drive merge/rebase/push flows without a real repository.

use super::{GitAdapter, GitError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct FakeGitAdapter {
    pub calls: Mutex<Vec<String>>,
    pub branches: Mutex<HashMap<String, bool>>,
    pub clean: Mutex<bool>,
    pub current_branch: Mutex<String>,
    pub fail_merge: Mutex<bool>,
    pub worktrees: Mutex<Vec<PathBuf>>,
    pub ancestor: Mutex<bool>,
    /// When non-empty, `rebase` fails once and `status_porcelain` reports
    /// these paths as unmerged (`UU <path>`) until they're cleared.
    pub conflicted_paths: Mutex<Vec<String>>,
    /// Canned `show_at_ref` responses keyed by `"{rev}:{path}"`.
    pub show_at_ref_responses: Mutex<HashMap<String, String>>,
    /// `"{rev}:{path}"` keys that should fail as if the path didn't
    /// exist at that ref, instead of returning an empty string.
    pub show_at_ref_missing: Mutex<std::collections::HashSet<String>>,
    /// Canned `diff_against` output, one path per line.
    pub diff_against_response: Mutex<String>,
}

impl FakeGitAdapter {
    pub fn new() -> Self {
        Self {
            clean: Mutex::new(true),
            current_branch: Mutex::new("main".to_string()),
            ancestor: Mutex::new(true),
            ..Default::default()
        }
    }

    pub fn set_show_at_ref(&self, rev: &str, path: &str, content: impl Into<String>) {
        self.show_at_ref_responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(format!("{rev}:{path}"), content.into());
    }

    pub fn set_show_at_ref_missing(&self, rev: &str, path: &str) {
        self.show_at_ref_missing.lock().unwrap_or_else(|e| e.into_inner()).insert(format!("{rev}:{path}"));
    }

    /// Clears the simulated rebase conflict, as if `rebase --continue`
    /// had succeeded.
    pub fn clear_conflicts(&self) {
        self.conflicted_paths.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call.into());
    }
}

#[async_trait]
impl GitAdapter for FakeGitAdapter {
    async fn current_branch(&self, _repo: &Path) -> Result<String, GitError> {
        self.log("current_branch");
        Ok(self.current_branch.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn status_porcelain(&self, _repo: &Path) -> Result<String, GitError> {
        self.log("status_porcelain");
        let conflicted = self.conflicted_paths.lock().unwrap_or_else(|e| e.into_inner());
        if !conflicted.is_empty() {
            return Ok(conflicted.iter().map(|p| format!("UU {p}\n")).collect());
        }
        drop(conflicted);
        if *self.clean.lock().unwrap_or_else(|e| e.into_inner()) {
            Ok(String::new())
        } else {
            Ok(" M dirty.txt\n".to_string())
        }
    }

    async fn diff_against(&self, _repo: &Path, base: &str) -> Result<String, GitError> {
        self.log(format!("diff_against:{base}"));
        Ok(self.diff_against_response.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn show_at_ref(&self, _repo: &Path, rev: &str, path: &str) -> Result<String, GitError> {
        self.log(format!("show_at_ref:{rev}:{path}"));
        let key = format!("{rev}:{path}");
        if self.show_at_ref_missing.lock().unwrap_or_else(|e| e.into_inner()).contains(&key) {
            return Err(GitError::CommandFailed {
                args: vec!["show".to_string(), format!("{rev}:{path}")],
                status: 128,
                stderr: "fatal: path does not exist".to_string(),
            });
        }
        Ok(self.show_at_ref_responses.lock().unwrap_or_else(|e| e.into_inner()).get(&key).cloned().unwrap_or_default())
    }

    async fn branch_exists(&self, _repo: &Path, branch: &str) -> Result<bool, GitError> {
        self.log(format!("branch_exists:{branch}"));
        Ok(self.branches.lock().unwrap_or_else(|e| e.into_inner()).get(branch).copied().unwrap_or(false))
    }

    async fn create_branch(&self, _repo: &Path, branch: &str, _from: &str) -> Result<(), GitError> {
        self.log(format!("create_branch:{branch}"));
        self.branches.lock().unwrap_or_else(|e| e.into_inner()).insert(branch.to_string(), true);
        Ok(())
    }

    async fn delete_branch(&self, _repo: &Path, branch: &str) -> Result<(), GitError> {
        self.log(format!("delete_branch:{branch}"));
        self.branches.lock().unwrap_or_else(|e| e.into_inner()).remove(branch);
        Ok(())
    }

    async fn checkout(&self, _repo: &Path, branch: &str) -> Result<(), GitError> {
        self.log(format!("checkout:{branch}"));
        *self.current_branch.lock().unwrap_or_else(|e| e.into_inner()) = branch.to_string();
        Ok(())
    }

    async fn worktree_add(&self, _repo: &Path, path: &Path, branch: &str) -> Result<(), GitError> {
        self.log(format!("worktree_add:{}:{branch}", path.display()));
        self.worktrees.lock().unwrap_or_else(|e| e.into_inner()).push(path.to_path_buf());
        Ok(())
    }

    async fn worktree_remove(&self, _repo: &Path, path: &Path) -> Result<(), GitError> {
        self.log(format!("worktree_remove:{}", path.display()));
        self.worktrees.lock().unwrap_or_else(|e| e.into_inner()).retain(|p| p != path);
        Ok(())
    }

    async fn worktree_list(&self, _repo: &Path) -> Result<Vec<String>, GitError> {
        self.log("worktree_list");
        Ok(self
            .worktrees
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|p| p.display().to_string())
            .collect())
    }

    async fn fetch(&self, _repo: &Path, remote: &str) -> Result<(), GitError> {
        self.log(format!("fetch:{remote}"));
        Ok(())
    }

    async fn pull_rebase(&self, _repo: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
        self.log(format!("pull_rebase:{remote}:{branch}"));
        Ok(())
    }

    async fn merge_ff_only(&self, _repo: &Path, branch: &str) -> Result<(), GitError> {
        self.log(format!("merge_ff_only:{branch}"));
        if *self.fail_merge.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(GitError::CommandFailed {
                args: vec!["merge".to_string(), "--ff-only".to_string(), branch.to_string()],
                status: 1,
                stderr: "not possible to fast-forward".to_string(),
            });
        }
        Ok(())
    }

    async fn rebase(&self, _repo: &Path, onto: &str) -> Result<(), GitError> {
        self.log(format!("rebase:{onto}"));
        if !self.conflicted_paths.lock().unwrap_or_else(|e| e.into_inner()).is_empty() {
            return Err(GitError::CommandFailed {
                args: vec!["rebase".to_string(), onto.to_string()],
                status: 1,
                stderr: "CONFLICT".to_string(),
            });
        }
        Ok(())
    }

    async fn rebase_abort(&self, _repo: &Path) -> Result<(), GitError> {
        self.log("rebase_abort");
        Ok(())
    }

    async fn push(&self, _repo: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
        self.log(format!("push:{remote}:{branch}"));
        Ok(())
    }

    async fn push_force_with_lease(&self, _repo: &Path, remote: &str, branch: &str) -> Result<(), GitError> {
        self.log(format!("push_force_with_lease:{remote}:{branch}"));
        Ok(())
    }

    async fn raw(&self, _repo: &Path, args: &[&str]) -> Result<String, GitError> {
        self.log(format!("raw:{}", args.join(" ")));
        if args == ["rebase", "--continue"] {
            self.clear_conflicts();
        }
        Ok(String::new())
    }

    async fn is_ancestor(&self, _repo: &Path, ancestor: &str, descendant: &str) -> Result<bool, GitError> {
        self.log(format!("is_ancestor:{ancestor}:{descendant}"));
        Ok(*self.ancestor.lock().unwrap_or_else(|e| e.into_inner()))
    }
}
