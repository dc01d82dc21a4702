// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! WU lifecycle transition guards (§4.1, §4.3).
//!
//! `LifecycleEngine` decides whether a requested transition is allowed and,
//! if so, builds the `Event` the caller should append to the `EventLog`.
//! The engine never appends directly — `lumenflow-kernel` owns the event
//! log handle and workspace-wide serialization (§5).

use crate::activity::ActivityProbe;
use crate::error::EngineError;
use crate::lane::LaneManager;
use lumenflow_core::{CheckpointDetail, Event, EventKind, Wu, WuId, WuStatus};
use lumenflow_storage::MaterializedState;

pub struct LifecycleEngine<'a> {
    lanes: LaneManager<'a>,
    state: &'a MaterializedState,
}

impl<'a> LifecycleEngine<'a> {
    pub fn new(lanes: LaneManager<'a>, state: &'a MaterializedState) -> Self {
        Self { lanes, state }
    }

    fn status_of(&self, wu_id: &WuId) -> WuStatus {
        self.state.get(wu_id).map(|s| s.status).unwrap_or(WuStatus::Ready)
    }

    fn holder_of(&self, wu_id: &WuId) -> Option<&str> {
        self.state.get(wu_id).and_then(|s| s.holder.as_deref())
    }

    /// §4.3: a WU may be claimed only if not already in a non-terminal
    /// status, and only if its lane isn't occupied past lock policy, and
    /// only if the parent lane is under its WIP limit.
    pub fn claim(
        &self,
        wu: &Wu,
        actor: &str,
        now_ms: u64,
        probe: &dyn ActivityProbe,
    ) -> Result<Event, EngineError> {
        let current = self.status_of(&wu.id);
        if current == WuStatus::InProgress && self.holder_of(&wu.id) == Some(actor) {
            // Re-claiming your own in-progress WU is a no-op (§4.1).
            return Ok(Event::new(wu.id.clone(), actor, now_ms, EventKind::Claim));
        }
        if matches!(current, WuStatus::InProgress | WuStatus::Done | WuStatus::Cancelled) {
            return Err(EngineError::InvalidTransition {
                wu_id: wu.id.clone(),
                reason: format!("cannot claim a WU already {current}"),
            });
        }

        if let Some(occupancy) = self.lanes.check_lane_occupation(&wu.lane, now_ms, probe) {
            if occupancy.holder != wu.id {
                return Err(EngineError::LaneOccupied {
                    lane: wu.lane.as_str().to_string(),
                    holder: occupancy.holder,
                    stale: occupancy.stale,
                    options: vec![
                        "wait".to_string(),
                        "override".to_string(),
                        if occupancy.stale { "reclaim-stale".to_string() } else { "escalate".to_string() },
                    ],
                });
            }
        }

        let parent = wu.lane.parent();
        let in_progress = self.lanes.wip_count(parent);
        let limit = self.lanes.wip_limit(parent);
        if in_progress >= limit {
            return Err(EngineError::WipExceeded { lane: parent.to_string(), limit, in_progress });
        }

        Ok(Event::new(wu.id.clone(), actor, now_ms, EventKind::Claim))
    }

    fn require_holder(&self, wu_id: &WuId, actor: &str) -> Result<(), EngineError> {
        match self.holder_of(wu_id) {
            Some(holder) if holder == actor => Ok(()),
            holder => Err(EngineError::NotHolder {
                wu_id: wu_id.clone(),
                actor: actor.to_string(),
                holder: holder.map(str::to_string),
            }),
        }
    }

    pub fn complete(&self, wu_id: &WuId, actor: &str, now_ms: u64) -> Result<Event, EngineError> {
        self.require_holder(wu_id, actor)?;
        Ok(Event::new(wu_id.clone(), actor, now_ms, EventKind::Complete))
    }

    pub fn block(&self, wu_id: &WuId, actor: &str, now_ms: u64, reason: String) -> Result<Event, EngineError> {
        self.require_holder(wu_id, actor)?;
        Ok(Event::new(wu_id.clone(), actor, now_ms, EventKind::Block { reason }))
    }

    pub fn unblock(&self, wu_id: &WuId, actor: &str, now_ms: u64) -> Result<Event, EngineError> {
        if self.status_of(wu_id) != WuStatus::Blocked {
            return Err(EngineError::InvalidTransition {
                wu_id: wu_id.clone(),
                reason: "cannot unblock a WU that isn't blocked".to_string(),
            });
        }
        Ok(Event::new(wu_id.clone(), actor, now_ms, EventKind::Unblock))
    }

    /// Cancel is allowed from any non-`done` status (§3), and does not
    /// require holding the WU — cancellation can come from outside.
    pub fn cancel(
        &self,
        wu_id: &WuId,
        actor: &str,
        now_ms: u64,
        reason: Option<String>,
    ) -> Result<Event, EngineError> {
        if self.status_of(wu_id) == WuStatus::Done {
            return Err(EngineError::InvalidTransition {
                wu_id: wu_id.clone(),
                reason: "cannot cancel a WU that is already done".to_string(),
            });
        }
        Ok(Event::new(wu_id.clone(), actor, now_ms, EventKind::Cancel { reason }))
    }

    pub fn checkpoint(
        &self,
        wu_id: &WuId,
        actor: &str,
        now_ms: u64,
        note: String,
        detail: CheckpointDetail,
    ) -> Result<Event, EngineError> {
        self.require_holder(wu_id, actor)?;
        Ok(Event::new(wu_id.clone(), actor, now_ms, EventKind::Checkpoint { note, detail }))
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
