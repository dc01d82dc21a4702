// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Memory node data model (§3, §4.6).

use crate::id::hash_id;
use crate::wu::WuId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// `mem-XXXX[.N.M...]` — a content-hash prefix with optional hierarchical
/// dotted suffixes for sub-items (§3). Unlike the fixed-width IDs this is a
/// plain `String`: the dotted suffix chain is unbounded in depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryNodeId(String);

impl MemoryNodeId {
    /// SHA-256-derived 4-hex prefix over `content`, prefixed `mem-` (§3).
    pub fn generate(content: &str) -> Self {
        Self(format!("mem-{}", hash_id(&[content], 4)))
    }

    /// A dotted sub-item of `self`, e.g. `mem-a1b2.1.3`.
    pub fn child(&self, suffix: &[usize]) -> Self {
        let mut s = self.0.clone();
        for part in suffix {
            s.push('.');
            s.push_str(&part.to_string());
        }
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemoryNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Node lifecycle scope (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Project,
    Session,
    Wu,
    Ephemeral,
}

crate::simple_display! {
    Lifecycle {
        Project => "project",
        Session => "session",
        Wu => "wu",
        Ephemeral => "ephemeral",
    }
}

/// An immutable observation, summary, session record, or project fact
/// (§3 "Memory node").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryNode {
    pub id: MemoryNodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    pub lifecycle: Lifecycle,
    pub content: String,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wu_id: Option<WuId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Updated by access-tracking (§4.6 "records an access event per node
    /// returned to feed decay"); defaults to `created_at_ms`.
    #[serde(default)]
    pub last_access_ms: u64,
    /// Relative weight before decay is applied; defaults to 1.0.
    #[serde(default = "default_base_weight")]
    pub base_weight: f64,
}

fn default_base_weight() -> f64 {
    1.0
}

impl MemoryNode {
    pub fn is_summary(&self) -> bool {
        self.node_type == "summary"
    }

    pub fn is_discovery(&self) -> bool {
        self.node_type == "discovery"
    }

    /// `metadata.status == "closed"` (§4.6 ready-query "not closed").
    pub fn is_closed(&self) -> bool {
        matches!(self.metadata.get("status"), Some(v) if v == "closed")
    }

    /// `metadata.blocked_by` is a non-empty array/string (§4.6 ready-query).
    pub fn has_blocked_by(&self) -> bool {
        match self.metadata.get("blocked_by") {
            Some(serde_json::Value::Array(a)) => !a.is_empty(),
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            _ => false,
        }
    }
}

/// Relationship kind (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Blocks,
    Derives,
    Refines,
}

crate::simple_display! {
    RelationshipKind {
        Blocks => "blocks",
        Derives => "derives",
        Refines => "refines",
    }
}

/// A directed relationship between two memory nodes (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    pub from_id: MemoryNodeId,
    pub to_id: MemoryNodeId,
}

/// Default half-life in days used by `computeDecayScore` (§3).
pub const DEFAULT_HALF_LIFE_DAYS: f64 = 30.0;

/// `base_weight · 2^((t − last_access) / −half_life)` (§3).
///
/// Strictly monotone non-increasing in `(now_ms - last_access_ms)` for a
/// fixed half-life (§8 "Decay ordering").
pub fn compute_decay_score(
    base_weight: f64,
    now_ms: u64,
    last_access_ms: u64,
    half_life_days: f64,
) -> f64 {
    let elapsed_days = now_ms.saturating_sub(last_access_ms) as f64 / 86_400_000.0;
    base_weight * 2f64.powf(elapsed_days / -half_life_days)
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
