// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

use super::*;
use lumenflow_core::Lifecycle;
use std::collections::HashMap as Map;

fn node(content: &str, created_at_ms: u64, base_weight: f64) -> MemoryNode {
    MemoryNode {
        id: MemoryNodeId::generate(content),
        node_type: "discovery".to_string(),
        lifecycle: Lifecycle::Project,
        content: content.to_string(),
        created_at_ms,
        wu_id: None,
        session_id: None,
        metadata: Map::new(),
        last_access_ms: 0,
        base_weight,
    }
}

#[test]
fn append_then_all_defaults_last_access_to_created_at() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::open(dir.path());
    store.append(&node("hello", 1_000, 1.0)).unwrap();
    let all = store.all().unwrap();
    assert_eq!(all[0].last_access_ms, 1_000);
}

#[test]
fn record_access_bumps_effective_last_access() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::open(dir.path());
    let n = node("hello", 1_000, 1.0);
    store.append(&n).unwrap();
    store.record_access(&n.id, 5_000).unwrap();
    let fetched = store.get(&n.id).unwrap().unwrap();
    assert_eq!(fetched.last_access_ms, 5_000);
}

#[test]
fn rank_orders_by_decay_score_descending() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::open(dir.path());
    let stale = node("old", 0, 1.0);
    let fresh = node("new", 0, 1.0);
    store.append(&stale).unwrap();
    store.append(&fresh).unwrap();
    store.record_access(&fresh.id, 86_400_000 * 10).unwrap();

    let ranked = store.rank(86_400_000 * 10, lumenflow_core::DEFAULT_HALF_LIFE_DAYS).unwrap();
    assert_eq!(ranked[0].0.id, fresh.id);
}

#[test]
fn query_ready_excludes_closed_and_blocked_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::open(dir.path());

    let mut closed = node("done", 0, 1.0);
    closed.metadata.insert("status".to_string(), serde_json::json!("closed"));
    let mut blocked = node("waiting", 0, 1.0);
    blocked.metadata.insert("blocked_by".to_string(), serde_json::json!(["WU-9"]));
    let ready = node("ready", 0, 1.0);

    store.append(&closed).unwrap();
    store.append(&blocked).unwrap();
    store.append(&ready).unwrap();

    let results = store.query_ready(0, lumenflow_core::DEFAULT_HALF_LIFE_DAYS).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0.id, ready.id);
}
