// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Append-only memory node store and decay-ranked querying (§3, §4.6).
//!
//! Memory nodes themselves are immutable once written (§3 "append-only
//! node store"), so an access — which should bump `last_access_ms` to feed
//! decay — is recorded as its own small event in a sibling log rather than
//! as a rewrite of the node row. [`MemoryStore::all`] and
//! [`MemoryStore::rank`] fold the access log on top of the node log to
//! produce the effective `last_access_ms` callers see.

use crate::append_log::{AppendLog, AppendLogError};
use lumenflow_core::{compute_decay_score, MemoryNode, MemoryNodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccessEvent {
    id: MemoryNodeId,
    accessed_at_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum MemoryStoreError {
    #[error(transparent)]
    Append(#[from] AppendLogError),
}

pub struct MemoryStore {
    nodes: AppendLog<MemoryNode>,
    accesses: AppendLog<AccessEvent>,
}

impl MemoryStore {
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            nodes: AppendLog::new(dir.join("memory-nodes.jsonl")),
            accesses: AppendLog::new(dir.join("memory-accesses.jsonl")),
        }
    }

    pub fn nodes_path(&self) -> &Path {
        self.nodes.path()
    }

    pub fn append(&self, node: &MemoryNode) -> Result<(), MemoryStoreError> {
        self.nodes.append(node)?;
        Ok(())
    }

    /// Records that `id` was returned by a query, bumping its effective
    /// `last_access_ms` for future decay computations (§4.6).
    pub fn record_access(&self, id: &MemoryNodeId, at_ms: u64) -> Result<(), MemoryStoreError> {
        self.accesses.append(&AccessEvent { id: id.clone(), accessed_at_ms: at_ms })?;
        Ok(())
    }

    fn latest_accesses(&self) -> Result<HashMap<MemoryNodeId, u64>, MemoryStoreError> {
        let mut latest: HashMap<MemoryNodeId, u64> = HashMap::new();
        for access in self.accesses.read_all()? {
            let entry = latest.entry(access.id).or_insert(access.accessed_at_ms);
            if access.accessed_at_ms > *entry {
                *entry = access.accessed_at_ms;
            }
        }
        Ok(latest)
    }

    /// All nodes, with `last_access_ms` folded up from the access log
    /// (falling back to `created_at_ms` when a node has never been
    /// accessed again since it was written).
    pub fn all(&self) -> Result<Vec<MemoryNode>, MemoryStoreError> {
        let latest_accesses = self.latest_accesses()?;
        let mut nodes = self.nodes.read_all()?;
        for node in &mut nodes {
            if let Some(&accessed_at) = latest_accesses.get(&node.id) {
                node.last_access_ms = node.last_access_ms.max(accessed_at);
            } else if node.last_access_ms == 0 {
                node.last_access_ms = node.created_at_ms;
            }
        }
        Ok(nodes)
    }

    pub fn get(&self, id: &MemoryNodeId) -> Result<Option<MemoryNode>, MemoryStoreError> {
        Ok(self.all()?.into_iter().find(|n| &n.id == id))
    }

    /// All nodes ranked by decay score, most relevant first (§3, §4.6;
    /// §8 "Decay ordering" — strictly non-increasing with staleness for a
    /// fixed half-life).
    pub fn rank(&self, now_ms: u64, half_life_days: f64) -> Result<Vec<(MemoryNode, f64)>, MemoryStoreError> {
        let mut scored: Vec<_> = self
            .all()?
            .into_iter()
            .map(|n| {
                let score = compute_decay_score(n.base_weight, now_ms, n.last_access_ms, half_life_days);
                (n, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(scored)
    }

    /// Nodes eligible for the ready-query surface: not closed, and not
    /// blocked on anything outstanding (§4.6 `queryReadyNodes`).
    pub fn query_ready(&self, now_ms: u64, half_life_days: f64) -> Result<Vec<(MemoryNode, f64)>, MemoryStoreError> {
        Ok(self
            .rank(now_ms, half_life_days)?
            .into_iter()
            .filter(|(n, _)| !n.is_closed() && !n.has_blocked_by())
            .collect())
    }
}

#[cfg(test)]
#[path = "memory_store_tests.rs"]
mod tests;
