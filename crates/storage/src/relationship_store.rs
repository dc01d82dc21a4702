// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Append-only store of directed memory-node relationships (§3, §4.6).

use crate::append_log::{AppendLog, AppendLogError};
use lumenflow_core::{MemoryNodeId, Relationship, RelationshipKind};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum RelationshipStoreError {
    #[error(transparent)]
    Append(#[from] AppendLogError),
}

pub struct RelationshipStore {
    log: AppendLog<Relationship>,
}

impl RelationshipStore {
    pub fn open(dir: impl AsRef<Path>) -> Self {
        Self { log: AppendLog::new(dir.as_ref().join("memory-relationships.jsonl")) }
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    pub fn append(&self, relationship: &Relationship) -> Result<(), RelationshipStoreError> {
        self.log.append(relationship)?;
        Ok(())
    }

    pub fn all(&self) -> Result<Vec<Relationship>, RelationshipStoreError> {
        Ok(self.log.read_all()?)
    }

    /// Every relationship with `from_id == id`.
    pub fn outgoing(&self, id: &MemoryNodeId) -> Result<Vec<Relationship>, RelationshipStoreError> {
        Ok(self.all()?.into_iter().filter(|r| &r.from_id == id).collect())
    }

    /// Every relationship with `to_id == id`.
    pub fn incoming(&self, id: &MemoryNodeId) -> Result<Vec<Relationship>, RelationshipStoreError> {
        Ok(self.all()?.into_iter().filter(|r| &r.to_id == id).collect())
    }

    /// Ids of nodes that block `id` (§4.6 ready-query uses this alongside
    /// `MemoryNode::has_blocked_by`).
    pub fn blockers_of(&self, id: &MemoryNodeId) -> Result<Vec<MemoryNodeId>, RelationshipStoreError> {
        Ok(self
            .incoming(id)?
            .into_iter()
            .filter(|r| matches!(r.kind, RelationshipKind::Blocks))
            .map(|r| r.from_id)
            .collect())
    }
}

#[cfg(test)]
#[path = "relationship_store_tests.rs"]
mod tests;
