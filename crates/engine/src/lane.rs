// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Lane lock manager (§4.3).
//!
//! Occupation is derived, not stored: for a given parent lane, the active
//! holder is the WU with the most recent `claim` not yet followed by a
//! terminal event, subject to lock policy. WIP is tracked per parent lane
//! and shared across its sub-lanes (§4.3 "multiple sub-lanes share the WIP
//! budget").

use crate::activity::{ActivityProbe, STALENESS_THRESHOLD_MS};
use lumenflow_core::{Lane, LockPolicy, WorkspaceConfig, Wu, WuId, WuStatus};
use lumenflow_storage::MaterializedState;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct LaneOccupancy {
    pub holder: WuId,
    pub claimed_at_ms: u64,
    pub stale: bool,
}

pub struct LaneManager<'a> {
    wus: &'a HashMap<WuId, Wu>,
    state: &'a MaterializedState,
    config: &'a WorkspaceConfig,
}

impl<'a> LaneManager<'a> {
    pub fn new(wus: &'a HashMap<WuId, Wu>, state: &'a MaterializedState, config: &'a WorkspaceConfig) -> Self {
        Self { wus, state, config }
    }

    fn in_progress_in_parent_lane(&self, parent_lane: &str) -> Vec<(&Wu, u64)> {
        let mut holders = Vec::new();
        for wu in self.wus.values() {
            if wu.lane.parent() != parent_lane {
                continue;
            }
            if let Some(runtime) = self.state.get(&wu.id) {
                if runtime.status == WuStatus::InProgress {
                    if let Some(claimed_at) = runtime.claimed_at_ms {
                        holders.push((wu, claimed_at));
                    }
                }
            }
        }
        holders
    }

    /// The most recent in-progress WU in `lane`'s parent lane, subject to
    /// lock policy (§4.3). `now_ms` and `probe` are only consulted under
    /// the `active` policy.
    pub fn check_lane_occupation(
        &self,
        lane: &Lane,
        now_ms: u64,
        probe: &dyn ActivityProbe,
    ) -> Option<LaneOccupancy> {
        let parent = lane.parent();
        let policy = self.config.lane_config(parent).lock_policy;
        if policy == LockPolicy::None {
            return None;
        }

        let mut holders = self.in_progress_in_parent_lane(parent);
        holders.sort_by_key(|(_, claimed_at)| *claimed_at);
        let (wu, claimed_at) = holders.pop()?;

        let stale = now_ms.saturating_sub(claimed_at) > STALENESS_THRESHOLD_MS;

        match policy {
            LockPolicy::None => None,
            LockPolicy::All => Some(LaneOccupancy { holder: wu.id.clone(), claimed_at_ms: claimed_at, stale }),
            LockPolicy::Active => {
                let runtime = self.state.get(&wu.id);
                let checkpoint_fresh = runtime
                    .and_then(|r| r.last_checkpoint_ms)
                    .map(|t| now_ms.saturating_sub(t) < STALENESS_THRESHOLD_MS)
                    .unwrap_or(false);
                let active = probe.has_uncommitted_changes(&wu.id) || checkpoint_fresh;
                active.then(|| LaneOccupancy { holder: wu.id.clone(), claimed_at_ms: claimed_at, stale })
            }
        }
    }

    /// Count of WUs currently `in_progress` sharing `parent_lane`'s WIP
    /// budget (counted regardless of lock policy — WIP and locking are
    /// independent axes per §4.3).
    pub fn wip_count(&self, parent_lane: &str) -> u32 {
        self.in_progress_in_parent_lane(parent_lane).len() as u32
    }

    pub fn wip_limit(&self, parent_lane: &str) -> u32 {
        self.config.lane_config(parent_lane).wip_limit
    }
}

#[cfg(test)]
#[path = "lane_tests.rs"]
mod tests;
