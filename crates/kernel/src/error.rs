// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Kernel-facing errors (§7): the union of every collaborator's error
//! type, exposed as one enum so a CLI host can map `kind()` to an exit
//! code without knowing which crate raised it (§6 "Exit codes").

use lumenflow_core::{ConfigError, ErrorKind, LumenError};

#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] lumenflow_engine::EngineError),

    #[error(transparent)]
    EventLog(#[from] lumenflow_storage::EventLogError),

    #[error(transparent)]
    Delegation(#[from] lumenflow_storage::DelegationRegistryError),

    #[error(transparent)]
    Signal(#[from] lumenflow_storage::SignalStoreError),

    #[error(transparent)]
    Memory(#[from] lumenflow_storage::MemoryStoreError),

    #[error(transparent)]
    Relationship(#[from] lumenflow_storage::RelationshipStoreError),

    #[error(transparent)]
    Projectors(#[from] lumenflow_projectors::ProjectorsError),

    #[error(transparent)]
    Worktree(#[from] lumenflow_worktree::WorktreeError),

    #[error("no WU file found for {0}")]
    UnknownWu(String),

    #[error("failed to read/write {path}: {source}")]
    Io { path: std::path::PathBuf, #[source] source: std::io::Error },
}

impl LumenError for KernelError {
    fn kind(&self) -> ErrorKind {
        match self {
            KernelError::Config(ConfigError::Io { .. }) => ErrorKind::Io,
            KernelError::Config(ConfigError::Parse { .. }) => ErrorKind::Parse,
            KernelError::Engine(e) => e.kind(),
            KernelError::EventLog(e) => e.kind(),
            KernelError::Delegation(_) | KernelError::Signal(_) | KernelError::Memory(_) | KernelError::Relationship(_) => {
                ErrorKind::Io
            }
            KernelError::Projectors(e) => e.kind(),
            KernelError::Worktree(e) => e.kind(),
            KernelError::UnknownWu(_) => ErrorKind::Validation,
            KernelError::Io { .. } => ErrorKind::Io,
        }
    }

    fn fix_hint(&self) -> Option<String> {
        match self {
            KernelError::Engine(e) => e.fix_hint(),
            KernelError::Worktree(e) => e.fix_hint(),
            KernelError::UnknownWu(id) => Some(format!("create {id}.yaml before operating on it")),
            _ => None,
        }
    }
}
