// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Context assembler (§4.6): deterministic Markdown context generation and
//! the ready-node query used by agents to pick up unblocked work.

use crate::error::EngineError;
use lumenflow_core::{Lifecycle, MemoryNode, MemoryNodeId, WuId};
use lumenflow_storage::{MemoryStore, RelationshipStore};
use std::collections::HashSet;

/// Ordering rule for nodes within a `generateContext` section (§4.6).
#[derive(Debug, Clone, Copy)]
pub enum SortMode {
    /// `created_at DESC`, tie-break by id.
    Recency,
    /// Decay score DESC (§3 `computeDecayScore`), tie-break by id.
    Decay { now_ms: u64, half_life_days: f64 },
}

pub struct ContextOptions {
    pub sort: SortMode,
    /// Default 4096 (§4.6).
    pub size_limit_bytes: usize,
    /// Records an access event per node returned; best-effort (§4.6).
    pub track_access: bool,
    pub at_ms: u64,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self { sort: SortMode::Recency, size_limit_bytes: 4096, track_access: false, at_ms: 0 }
    }
}

const TRUNCATION_MARKER: &str = "\n…(truncated)\n";

fn sort_key(node: &MemoryNode, sort: SortMode) -> (std::cmp::Reverse<i64>, String) {
    match sort {
        SortMode::Recency => (std::cmp::Reverse(node.created_at_ms as i64), node.id.as_str().to_string()),
        SortMode::Decay { now_ms, half_life_days } => {
            let score = lumenflow_core::compute_decay_score(node.base_weight, now_ms, node.last_access_ms, half_life_days);
            (std::cmp::Reverse((score * 1_000_000.0) as i64), node.id.as_str().to_string())
        }
    }
}

fn render_section(title: &str, mut nodes: Vec<MemoryNode>, sort: SortMode) -> String {
    if nodes.is_empty() {
        return String::new();
    }
    nodes.sort_by(|a, b| sort_key(a, sort).cmp(&sort_key(b, sort)));
    let mut out = format!("## {title}\n\n");
    for node in &nodes {
        out.push_str("- ");
        out.push_str(&node.content);
        out.push('\n');
    }
    out.push('\n');
    out
}

fn truncate_to_limit(mut s: String, limit: usize) -> String {
    if s.len() <= limit {
        return s;
    }
    let budget = limit.saturating_sub(TRUNCATION_MARKER.len());
    while !s.is_char_boundary(budget.min(s.len())) {
        s.truncate(s.len() - 1);
    }
    s.truncate(budget.min(s.len()));
    s.push_str(TRUNCATION_MARKER);
    s
}

pub struct ContextAssembler<'a> {
    memory: &'a MemoryStore,
    relationships: &'a RelationshipStore,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(memory: &'a MemoryStore, relationships: &'a RelationshipStore) -> Self {
        Self { memory, relationships }
    }

    /// `generateContext(wuId, options)` (§4.6): byte-deterministic for
    /// identical inputs and options — no wall-clock header, no randomness.
    pub fn generate_context(&self, wu_id: &WuId, options: &ContextOptions) -> Result<String, EngineError> {
        let all = self.memory.all()?;

        let project_profile: Vec<_> = all.iter().filter(|n| n.lifecycle == Lifecycle::Project).cloned().collect();
        let summaries: Vec<_> =
            all.iter().filter(|n| n.is_summary() && n.wu_id.as_ref() == Some(wu_id)).cloned().collect();
        let wu_context: Vec<_> = all
            .iter()
            .filter(|n| n.wu_id.as_ref() == Some(wu_id) && !n.is_summary() && !n.is_discovery())
            .cloned()
            .collect();
        let discoveries: Vec<_> =
            all.iter().filter(|n| n.is_discovery() && n.wu_id.as_ref() == Some(wu_id)).cloned().collect();

        if options.track_access {
            for node in project_profile.iter().chain(&summaries).chain(&wu_context).chain(&discoveries) {
                // Best-effort: a failed access record must not fail context
                // assembly (§4.6).
                let _ = self.memory.record_access(&node.id, options.at_ms);
            }
        }

        let mut out = String::new();
        out.push_str(&render_section("Project Profile", project_profile, options.sort));
        out.push_str(&render_section("Summaries", summaries, options.sort));
        out.push_str(&render_section("WU Context", wu_context, options.sort));
        out.push_str(&render_section("Discoveries", discoveries, options.sort));

        let out = out.trim_end_matches('\n').to_string();
        if out.is_empty() {
            return Ok(String::new());
        }
        Ok(truncate_to_limit(out, options.size_limit_bytes))
    }

    fn priority_rank(node: &MemoryNode) -> u8 {
        match node.metadata.get("priority").and_then(|v| v.as_str()) {
            Some("P0") => 0,
            Some("P1") => 1,
            Some("P2") => 2,
            Some("P3") => 3,
            _ => 4,
        }
    }

    /// `queryReadyNodes(wuId, {type?})` (§4.6): nodes linked to the WU that
    /// are neither blocked (via a `blocks` relationship or
    /// `metadata.blocked_by`) nor closed (`lifecycle != ephemeral`,
    /// `metadata.status != closed`), ordered by priority then
    /// `created_at ASC` then `id ASC`.
    pub fn query_ready_nodes(
        &self,
        wu_id: &WuId,
        type_filter: Option<&str>,
    ) -> Result<Vec<MemoryNode>, EngineError> {
        let all = self.memory.all()?;
        let relationships = self.relationships.all()?;

        let mut blocked_ids: HashSet<MemoryNodeId> = HashSet::new();
        for rel in &relationships {
            if rel.kind == lumenflow_core::RelationshipKind::Blocks {
                blocked_ids.insert(rel.to_id.clone());
            }
        }

        let mut ready: Vec<MemoryNode> = all
            .into_iter()
            .filter(|n| n.wu_id.as_ref() == Some(wu_id))
            .filter(|n| type_filter.map(|t| n.node_type == t).unwrap_or(true))
            .filter(|n| !blocked_ids.contains(&n.id) && !n.has_blocked_by())
            .filter(|n| n.lifecycle != Lifecycle::Ephemeral && !n.is_closed())
            .collect();

        ready.sort_by(|a, b| {
            Self::priority_rank(a)
                .cmp(&Self::priority_rank(b))
                .then(a.created_at_ms.cmp(&b.created_at_ms))
                .then(a.id.as_str().cmp(b.id.as_str()))
        });
        Ok(ready)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
