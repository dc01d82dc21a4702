// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Engine-level errors (§7).

use lumenflow_core::{ErrorKind, LumenError, WuId};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("WU {wu_id} is not claimed by {actor} (currently held by {holder:?})")]
    NotHolder { wu_id: WuId, actor: String, holder: Option<String> },

    #[error("WU {wu_id} cannot transition: {reason}")]
    InvalidTransition { wu_id: WuId, reason: String },

    #[error("lane {lane} is occupied by {holder} (stale={stale}) — options: {options:?}")]
    LaneOccupied { lane: String, holder: WuId, stale: bool, options: Vec<String> },

    #[error("lane {lane} is at its WIP limit ({limit}); {in_progress} WU(s) in progress")]
    WipExceeded { lane: String, limit: u32, in_progress: u32 },

    #[error("completion policy rule `{rule}` rejected the transition: {message}")]
    PolicyRejected { rule: &'static str, message: String, fix_hint: String },

    #[error("delegation {id} is already escalated")]
    AlreadyEscalated { id: String },

    #[error("no delegation record for id {id}")]
    UnknownDelegation { id: String },

    #[error(transparent)]
    Storage(#[from] lumenflow_storage::EventLogError),

    #[error(transparent)]
    Delegation(#[from] lumenflow_storage::DelegationRegistryError),

    #[error(transparent)]
    Signal(#[from] lumenflow_storage::SignalStoreError),

    #[error(transparent)]
    Memory(#[from] lumenflow_storage::MemoryStoreError),

    #[error(transparent)]
    Relationship(#[from] lumenflow_storage::RelationshipStoreError),

    #[error("failed to write recovery audit file at {path}: {source}")]
    AuditWrite { path: std::path::PathBuf, #[source] source: std::io::Error },
}

impl LumenError for EngineError {
    fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotHolder { .. } | EngineError::InvalidTransition { .. } => {
                ErrorKind::Validation
            }
            EngineError::LaneOccupied { .. } | EngineError::WipExceeded { .. } => ErrorKind::Lock,
            EngineError::PolicyRejected { .. } => ErrorKind::Policy,
            EngineError::AlreadyEscalated { .. } | EngineError::UnknownDelegation { .. } => ErrorKind::Validation,
            EngineError::Storage(e) => e.kind(),
            EngineError::Delegation(_)
            | EngineError::Signal(_)
            | EngineError::Memory(_)
            | EngineError::Relationship(_) => ErrorKind::Io,
            EngineError::AuditWrite { .. } => ErrorKind::Io,
        }
    }

    fn fix_hint(&self) -> Option<String> {
        match self {
            EngineError::LaneOccupied { holder, .. } => {
                Some(format!("wait for {holder} to complete, block, or cancel, or override the lock"))
            }
            EngineError::WipExceeded { .. } => {
                Some("complete or cancel an in-progress WU in this lane before claiming another".to_string())
            }
            EngineError::PolicyRejected { fix_hint, .. } => Some(fix_hint.clone()),
            _ => None,
        }
    }
}
