// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

use super::*;
use crate::activity::NoActivity;
use lumenflow_core::{LaneConfig, LockPolicy, WorkspaceConfig};
use std::collections::HashMap;

fn config(lane: &str, policy: LockPolicy, wip_limit: u32) -> WorkspaceConfig {
    let mut cfg = WorkspaceConfig::default();
    cfg.lanes.insert(lane.to_string(), LaneConfig { lock_policy: policy, wip_limit });
    cfg
}

fn single_wu(id: &str, lane: &str) -> HashMap<WuId, Wu> {
    let wu = Wu::builder(id).lane(lane).build();
    [(wu.id.clone(), wu)].into_iter().collect()
}

#[test]
fn claim_on_an_untouched_wu_succeeds() {
    let wus = single_wu("WU-1", "build");
    let state = MaterializedState::default();
    let config = config("build", LockPolicy::All, u32::MAX);
    let engine = LifecycleEngine::new(LaneManager::new(&wus, &state, &config), &state);
    let wu = wus.get("WU-1").unwrap();
    let event = engine.claim(wu, "agent-a", 100, &NoActivity).unwrap();
    assert_eq!(event.kind, EventKind::Claim);
}

#[test]
fn claim_rejects_a_wu_already_in_progress() {
    let wus = single_wu("WU-1", "build");
    let state = MaterializedState::fold(&[Event::new(WuId::new_unchecked("WU-1"), "agent-a", 100, EventKind::Claim)]);
    let config = config("build", LockPolicy::All, u32::MAX);
    let engine = LifecycleEngine::new(LaneManager::new(&wus, &state, &config), &state);
    let wu = wus.get("WU-1").unwrap();
    let err = engine.claim(wu, "agent-b", 200, &NoActivity).unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));
}

#[test]
fn claim_on_an_in_progress_wu_by_its_own_holder_is_a_no_op() {
    let wus = single_wu("WU-1", "build");
    let state = MaterializedState::fold(&[Event::new(WuId::new_unchecked("WU-1"), "agent-a", 100, EventKind::Claim)]);
    let config = config("build", LockPolicy::All, u32::MAX);
    let engine = LifecycleEngine::new(LaneManager::new(&wus, &state, &config), &state);
    let wu = wus.get("WU-1").unwrap();
    let event = engine.claim(wu, "agent-a", 200, &NoActivity).unwrap();
    assert_eq!(event.kind, EventKind::Claim);
    assert_eq!(event.actor, "agent-a");
}

#[test]
fn claim_rejects_when_lane_occupied_by_another_wu() {
    let mut wus = single_wu("WU-1", "build");
    let other = Wu::builder("WU-2").lane("build").build();
    wus.insert(other.id.clone(), other);
    let state = MaterializedState::fold(&[Event::new(WuId::new_unchecked("WU-2"), "agent-a", 100, EventKind::Claim)]);
    let config = config("build", LockPolicy::All, u32::MAX);
    let engine = LifecycleEngine::new(LaneManager::new(&wus, &state, &config), &state);
    let wu = wus.get("WU-1").unwrap();
    let err = engine.claim(wu, "agent-b", 200, &NoActivity).unwrap_err();
    assert!(matches!(err, EngineError::LaneOccupied { .. }));
}

#[test]
fn claim_rejects_when_wip_limit_reached() {
    let mut wus = single_wu("WU-1", "build");
    let other = Wu::builder("WU-2").lane("build").build();
    wus.insert(other.id.clone(), other);
    let state = MaterializedState::fold(&[Event::new(WuId::new_unchecked("WU-2"), "agent-a", 100, EventKind::Claim)]);
    let config = config("build", LockPolicy::None, 1);
    let engine = LifecycleEngine::new(LaneManager::new(&wus, &state, &config), &state);
    let wu = wus.get("WU-1").unwrap();
    let err = engine.claim(wu, "agent-b", 200, &NoActivity).unwrap_err();
    assert!(matches!(err, EngineError::WipExceeded { .. }));
}

#[test]
fn complete_requires_the_claiming_actor() {
    let wus = single_wu("WU-1", "build");
    let state = MaterializedState::fold(&[Event::new(WuId::new_unchecked("WU-1"), "agent-a", 100, EventKind::Claim)]);
    let config = config("build", LockPolicy::All, u32::MAX);
    let engine = LifecycleEngine::new(LaneManager::new(&wus, &state, &config), &state);
    let wu_id = WuId::new_unchecked("WU-1");
    assert!(matches!(
        engine.complete(&wu_id, "agent-b", 200).unwrap_err(),
        EngineError::NotHolder { .. }
    ));
    assert_eq!(engine.complete(&wu_id, "agent-a", 200).unwrap().kind, EventKind::Complete);
}

#[test]
fn unblock_requires_currently_blocked_status() {
    let wus = single_wu("WU-1", "build");
    let state = MaterializedState::fold(&[Event::new(WuId::new_unchecked("WU-1"), "agent-a", 100, EventKind::Claim)]);
    let config = config("build", LockPolicy::All, u32::MAX);
    let engine = LifecycleEngine::new(LaneManager::new(&wus, &state, &config), &state);
    let wu_id = WuId::new_unchecked("WU-1");
    assert!(matches!(engine.unblock(&wu_id, "agent-a", 200).unwrap_err(), EngineError::InvalidTransition { .. }));
}

#[test]
fn cancel_rejects_an_already_done_wu() {
    let wus = single_wu("WU-1", "build");
    let events = vec![
        Event::new(WuId::new_unchecked("WU-1"), "agent-a", 100, EventKind::Claim),
        Event::new(WuId::new_unchecked("WU-1"), "agent-a", 200, EventKind::Complete),
    ];
    let state = MaterializedState::fold(&events);
    let config = config("build", LockPolicy::All, u32::MAX);
    let engine = LifecycleEngine::new(LaneManager::new(&wus, &state, &config), &state);
    let wu_id = WuId::new_unchecked("WU-1");
    assert!(matches!(engine.cancel(&wu_id, "agent-a", 300, None).unwrap_err(), EngineError::InvalidTransition { .. }));
}

#[test]
fn cancel_does_not_require_holding_the_wu() {
    let wus = single_wu("WU-1", "build");
    let state = MaterializedState::fold(&[Event::new(WuId::new_unchecked("WU-1"), "agent-a", 100, EventKind::Claim)]);
    let config = config("build", LockPolicy::All, u32::MAX);
    let engine = LifecycleEngine::new(LaneManager::new(&wus, &state, &config), &state);
    let wu_id = WuId::new_unchecked("WU-1");
    let event = engine.cancel(&wu_id, "someone-else", 300, Some("superseded".to_string())).unwrap();
    assert_eq!(event.kind, EventKind::Cancel { reason: Some("superseded".to_string()) });
}

#[test]
fn checkpoint_requires_the_claiming_actor() {
    let wus = single_wu("WU-1", "build");
    let state = MaterializedState::fold(&[Event::new(WuId::new_unchecked("WU-1"), "agent-a", 100, EventKind::Claim)]);
    let config = config("build", LockPolicy::All, u32::MAX);
    let engine = LifecycleEngine::new(LaneManager::new(&wus, &state, &config), &state);
    let wu_id = WuId::new_unchecked("WU-1");
    let err = engine.checkpoint(&wu_id, "agent-b", 200, "halfway".to_string(), CheckpointDetail::default()).unwrap_err();
    assert!(matches!(err, EngineError::NotHolder { .. }));
}
