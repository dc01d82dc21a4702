// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Workspace handle (§5, §6): a process-local bundle of every storage
//! collaborator plus the cooperative mutex that serializes writers
//! within this process. Cross-process safety is not this type's job —
//! that comes from append-only atomic writes and git's own ref locking
//! (§5), enforced by `lumenflow-worktree` at merge time.

use lumenflow_core::{Clock, SystemClock, WorkspaceConfig};
use lumenflow_storage::{DelegationRegistry, EventLog, MemoryStore, RelationshipStore, SignalStore};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::KernelError;

/// On-disk layout under the workspace root (§6 "file path conventions").
/// Kept as plain joins rather than a config section of its own since
/// none of these names are user-configurable (unlike `Directories`,
/// which governs the WU/board/docs layout).
pub struct StatePaths {
    pub state_dir: PathBuf,
    pub memory_dir: PathBuf,
    pub recovery_dir: PathBuf,
}

impl StatePaths {
    fn under(root: &Path) -> Self {
        let lumenflow = root.join(".lumenflow");
        Self {
            state_dir: lumenflow.join("state"),
            memory_dir: lumenflow.join("memory"),
            recovery_dir: lumenflow.join("recovery"),
        }
    }
}

/// Everything a kernel command needs: the normalised config, every
/// storage handle opened at its configured path, and a single
/// process-wide mutex serializing state-mutating commands (§5
/// "cooperative workspace mutex" — concurrent readers are fine,
/// concurrent writers are not, since the event log and board file
/// aren't internally synchronized against each other).
pub struct Workspace<C: Clock = SystemClock> {
    pub root: PathBuf,
    pub config: WorkspaceConfig,
    pub clock: C,
    pub event_log: EventLog,
    pub delegations: DelegationRegistry,
    pub signals: SignalStore,
    pub memory: MemoryStore,
    pub relationships: RelationshipStore,
    pub paths: StatePaths,
    lock: Mutex<()>,
}

impl Workspace<SystemClock> {
    /// Opens a workspace rooted at `root`, loading its config (or
    /// defaulting, per §9, if no config file exists yet) and wiring up
    /// every storage handle at its conventional path.
    pub fn open(root: impl Into<PathBuf>) -> Result<(Self, Vec<lumenflow_core::ConfigWarning>), KernelError> {
        Self::open_with_clock(root, SystemClock)
    }
}

impl<C: Clock> Workspace<C> {
    pub fn open_with_clock(
        root: impl Into<PathBuf>,
        clock: C,
    ) -> Result<(Self, Vec<lumenflow_core::ConfigWarning>), KernelError> {
        let root = root.into();
        let config_path = root.join(".lumenflow").join("config.yaml");
        let (config, warnings) = lumenflow_core::config::load(&config_path)?;
        let paths = StatePaths::under(&root);

        let event_log = EventLog::new(
            paths.state_dir.join("wu-events.jsonl"),
            paths.state_dir.join("wu-events.snapshot.json"),
        );
        let delegations = DelegationRegistry::open(&paths.state_dir)?;
        let signals = SignalStore::open(&paths.memory_dir);
        let memory = MemoryStore::open(&paths.memory_dir);
        let relationships = RelationshipStore::open(&paths.memory_dir);

        Ok((
            Self {
                root,
                config,
                clock,
                event_log,
                delegations,
                signals,
                memory,
                relationships,
                paths,
                lock: Mutex::new(()),
            },
            warnings,
        ))
    }

    pub fn wu_dir(&self) -> &Path {
        &self.config.directories.wu_dir
    }

    /// Resolves a config-relative path (WU dir, board files, docs
    /// prefixes) against the workspace root.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// Acquires the cooperative workspace mutex for the duration of a
    /// state-mutating command (§5). Readers (`generate_context`,
    /// `query_ready_nodes`) don't need this — only commands that append
    /// to the event log, delegation registry, or rewrite the board/stamp
    /// files.
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
