// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

use super::*;
use crate::wu::WuId;

fn wu() -> WuId {
    WuId::parse("WU-100").unwrap()
}

#[test]
fn claim_changes_status_checkpoint_does_not() {
    assert!(EventKind::Claim.changes_status());
    assert!(!EventKind::Checkpoint { note: "x".into(), detail: CheckpointDetail::default() }
        .changes_status());
    assert!(!EventKind::BriefEvidence { location: "docs/x".into() }.changes_status());
}

#[test]
fn event_round_trips_through_json() {
    let ev = Event::new(wu(), "agent-1", 1_700_000_000_000, EventKind::Claim);
    let json = serde_json::to_string(&ev).unwrap();
    assert!(json.contains("\"type\":\"claim\""));
    let back: Event = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ev);
}

#[test]
fn block_event_carries_reason() {
    let ev = Event::new(
        wu(),
        "agent-1",
        0,
        EventKind::Block { reason: "waiting on design review".into() },
    );
    let json = serde_json::to_string(&ev).unwrap();
    let back: Event = serde_json::from_str(&json).unwrap();
    match back.kind {
        EventKind::Block { reason } => assert_eq!(reason, "waiting on design review"),
        other => panic!("unexpected kind: {other:?}"),
    }
}

#[test]
fn unknown_fields_are_preserved_not_dropped() {
    let json = r#"{"wu_id":"WU-100","timestamp_ms":1,"actor":"a","type":"claim","future_field":42}"#;
    let ev: Event = serde_json::from_str(json).unwrap();
    assert_eq!(ev.extra.get("future_field"), Some(&serde_json::json!(42)));
}
