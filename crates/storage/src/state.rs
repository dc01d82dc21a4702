// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Materialized per-WU runtime state, folded from the event log (§3, §4.1).
//!
//! A WU with no events at all is absent here; callers fall back to the
//! `ready`/`status` field in its YAML front matter (§9 "ready is derived,
//! not written by the engine"). Replay is a pure, order-preserving fold —
//! it never rejects an event, even one that looks like an invalid
//! transition; append-time transition guards are the engine's job
//! (`lumenflow-engine`), not the log's.

use lumenflow_core::{Event, EventKind, WuId, WuStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Folded runtime state for a single WU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WuRuntimeState {
    pub status: WuStatus,
    pub holder: Option<String>,
    pub claimed_at_ms: Option<u64>,
    pub block_reason: Option<String>,
    pub last_checkpoint_ms: Option<u64>,
    pub last_checkpoint_note: Option<String>,
    pub latest_brief_evidence: Option<String>,
    pub events_applied: u32,
}

impl WuRuntimeState {
    fn apply(&mut self, event: &Event) {
        self.events_applied += 1;
        match &event.kind {
            EventKind::Claim => {
                self.status = WuStatus::InProgress;
                self.holder = Some(event.actor.clone());
                self.claimed_at_ms = Some(event.timestamp_ms);
                self.block_reason = None;
            }
            EventKind::Complete => {
                self.status = WuStatus::Done;
            }
            EventKind::Block { reason } => {
                self.status = WuStatus::Blocked;
                self.block_reason = Some(reason.clone());
            }
            EventKind::Unblock => {
                self.status = WuStatus::InProgress;
                self.block_reason = None;
            }
            EventKind::Cancel { .. } => {
                self.status = WuStatus::Cancelled;
            }
            EventKind::Checkpoint { note, .. } => {
                self.last_checkpoint_ms = Some(event.timestamp_ms);
                self.last_checkpoint_note = Some(note.clone());
            }
            EventKind::BriefEvidence { location } => {
                self.latest_brief_evidence = Some(location.clone());
            }
        }
    }
}

impl Default for WuRuntimeState {
    fn default() -> Self {
        Self {
            status: WuStatus::InProgress,
            holder: None,
            claimed_at_ms: None,
            block_reason: None,
            last_checkpoint_ms: None,
            last_checkpoint_note: None,
            latest_brief_evidence: None,
            events_applied: 0,
        }
    }
}

/// All WUs' runtime state, as folded from the full event log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedState {
    pub wus: HashMap<WuId, WuRuntimeState>,
}

impl MaterializedState {
    pub fn get(&self, wu_id: &WuId) -> Option<&WuRuntimeState> {
        self.wus.get(wu_id)
    }

    /// Fold a full, ordered event stream into materialized state. Events
    /// are applied strictly in append order; a later state-affecting event
    /// always wins over an earlier one for the same WU (§3).
    pub fn fold(events: &[Event]) -> Self {
        let mut state = Self::default();
        state.apply_all(events);
        state
    }

    /// Continue folding additional events onto an existing state, used by
    /// the snapshot fast path to resume after the snapshotted line count.
    pub fn apply_all(&mut self, events: &[Event]) {
        for event in events {
            self.wus.entry(event.wu_id.clone()).or_default().apply(event);
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
