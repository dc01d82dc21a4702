// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Event types for the WU lifecycle engine (§3, §4.1).

use crate::wu::WuId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Checkpoint payload (§4.1 `checkpoint(wuId, note, {progress?, nextSteps?})`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
}

/// Events that trigger or annotate WU lifecycle state (§3).
///
/// Serializes as `{"type": "claim", "wu_id": ..., ...}` (internally tagged);
/// unknown fields are preserved structurally via `#[serde(flatten)]` extras
/// where the schema allows it, and ignored by replay per §6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Claim,
    Complete,
    Block { reason: String },
    Unblock,
    Cancel { reason: Option<String> },
    Checkpoint { note: String, detail: CheckpointDetail },
    BriefEvidence { location: String },
}

impl EventKind {
    /// Whether this kind changes WU status when folded (§3 "checkpoint and
    /// brief_evidence do not change status but are recorded for audit").
    pub fn changes_status(&self) -> bool {
        !matches!(self, EventKind::Checkpoint { .. } | EventKind::BriefEvidence { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Claim => "claim",
            EventKind::Complete => "complete",
            EventKind::Block { .. } => "block",
            EventKind::Unblock => "unblock",
            EventKind::Cancel { .. } => "cancel",
            EventKind::Checkpoint { .. } => "checkpoint",
            EventKind::BriefEvidence { .. } => "brief_evidence",
        }
    }
}

/// Immutable record appended to the event log (§3 "Event").
///
/// Ordering is defined by append/file position, not by `timestamp_ms`
/// (§3: "timestamps are informational but must be non-decreasing modulo
/// clock skew").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub wu_id: WuId,
    pub timestamp_ms: u64,
    pub actor: String,
    #[serde(flatten)]
    pub kind: EventKind,
    /// Unknown fields preserved verbatim on read, ignored by replay (§6).
    #[serde(flatten, default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Event {
    pub fn new(wu_id: WuId, actor: impl Into<String>, timestamp_ms: u64, kind: EventKind) -> Self {
        Self { wu_id, timestamp_ms, actor: actor.into(), kind, extra: HashMap::new() }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
