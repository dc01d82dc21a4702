// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

use super::*;
use lumenflow_core::{FakeClock, Priority, Wu, WuType};
use lumenflow_engine::{NoActivity, NoopRulesEngine};
use lumenflow_storage::MaterializedState;

struct AllowAllFiles;

impl FileProbe for AllowAllFiles {
    fn exists(&self, _path: &str) -> bool {
        true
    }
}

fn workspace(dir: &std::path::Path) -> Workspace<FakeClock> {
    Workspace::open_with_clock(dir, FakeClock::new()).unwrap().0
}

fn put_wu(ws: &Workspace<FakeClock>, wu: &Wu) {
    lumenflow_projectors::save(&ws.resolve(ws.wu_dir()), wu).unwrap();
}

fn basic_wu(id: &str) -> Wu {
    Wu::builder(id)
        .title("Add widget")
        .priority(Priority::P2)
        .wu_type(WuType::Feature)
        .build()
}

fn complete_opts<'a>(files: &'a AllowAllFiles, rules: &'a NoopRulesEngine) -> CompleteOptions<'a> {
    CompleteOptions {
        files,
        rules,
        accessibility_demonstrated: false,
        force_brief_evidence: false,
        force_spawn_provenance: false,
    }
}

#[tokio::test]
async fn claim_appends_a_claim_event_and_moves_the_wu_onto_both_boards() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let wu = basic_wu("WU-100");
    put_wu(&ws, &wu);

    let event = claim(&ws, &wu.id, "alice", &NoActivity).await.unwrap();
    assert!(matches!(event.kind, EventKind::Claim));

    let status_contents = std::fs::read_to_string(ws.resolve(&ws.config.directories.status_path)).unwrap();
    let status_board = Board::parse(&status_contents).unwrap();
    assert_eq!(status_board.items_in("In Progress").len(), 1);
    assert!(status_board.items_in("Ready").is_empty());

    let backlog_contents = std::fs::read_to_string(ws.resolve(&ws.config.directories.backlog_path)).unwrap();
    let backlog_board = Board::parse(&backlog_contents).unwrap();
    assert_eq!(backlog_board.items_in("In Progress").len(), 1);
    assert!(backlog_board.items_in("Backlog").is_empty());
}

#[tokio::test]
async fn claim_twice_is_rejected_as_an_invalid_transition() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let wu = basic_wu("WU-100");
    put_wu(&ws, &wu);

    claim(&ws, &wu.id, "alice", &NoActivity).await.unwrap();
    let err = claim(&ws, &wu.id, "bob", &NoActivity).await.unwrap_err();
    assert!(matches!(err, KernelError::Engine(EngineError::InvalidTransition { .. })));
}

#[tokio::test]
async fn complete_requires_holding_the_wu() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let wu = basic_wu("WU-100");
    put_wu(&ws, &wu);
    claim(&ws, &wu.id, "alice", &NoActivity).await.unwrap();

    let files = AllowAllFiles;
    let rules = NoopRulesEngine;
    let err = complete(&ws, &wu.id, "mallory", &complete_opts(&files, &rules)).await.unwrap_err();
    assert!(matches!(err, KernelError::Engine(EngineError::NotHolder { .. })));
}

#[tokio::test]
async fn complete_writes_a_stamp_and_moves_the_wu_to_done_on_both_boards() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let wu = basic_wu("WU-100");
    put_wu(&ws, &wu);
    claim(&ws, &wu.id, "alice", &NoActivity).await.unwrap();

    let files = AllowAllFiles;
    let rules = NoopRulesEngine;
    let event = complete(&ws, &wu.id, "alice", &complete_opts(&files, &rules)).await.unwrap();
    assert!(matches!(event.kind, EventKind::Complete));

    let stamp_path = lumenflow_projectors::stamp_path(&ws.resolve(ws.wu_dir()), &wu.id);
    assert!(stamp_path.exists());

    let status_contents = std::fs::read_to_string(ws.resolve(&ws.config.directories.status_path)).unwrap();
    let status_board = Board::parse(&status_contents).unwrap();
    assert_eq!(status_board.items_in("Done").len(), 1);
    assert!(status_board.items_in("In Progress").is_empty());

    let backlog_contents = std::fs::read_to_string(ws.resolve(&ws.config.directories.backlog_path)).unwrap();
    let backlog_board = Board::parse(&backlog_contents).unwrap();
    assert!(backlog_board.items_in("In Progress").is_empty());
    assert!(backlog_board.items_in("Backlog").is_empty());
}

#[tokio::test]
async fn complete_rejects_a_ui_exposed_wu_with_no_accessibility_evidence() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let wu = Wu::builder("WU-100").title("Add widget").exposure(lumenflow_core::Exposure::Ui).build();
    put_wu(&ws, &wu);
    claim(&ws, &wu.id, "alice", &NoActivity).await.unwrap();

    let files = AllowAllFiles;
    let rules = NoopRulesEngine;
    let err = complete(&ws, &wu.id, "alice", &complete_opts(&files, &rules)).await.unwrap_err();
    match err {
        KernelError::Engine(EngineError::PolicyRejected { rule, .. }) => {
            assert_eq!(rule, "exposure_accessibility")
        }
        other => panic!("expected a policy rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn block_and_unblock_round_trip_through_the_status_board() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let wu = basic_wu("WU-100");
    put_wu(&ws, &wu);
    claim(&ws, &wu.id, "alice", &NoActivity).await.unwrap();

    block(&ws, &wu.id, "alice", "waiting on upstream API".to_string()).await.unwrap();
    let contents = std::fs::read_to_string(ws.resolve(&ws.config.directories.status_path)).unwrap();
    let board = Board::parse(&contents).unwrap();
    assert_eq!(board.items_in("Blocked").len(), 1);
    assert!(board.items_in("In Progress").is_empty());

    unblock(&ws, &wu.id, "alice").await.unwrap();
    let contents = std::fs::read_to_string(ws.resolve(&ws.config.directories.status_path)).unwrap();
    let board = Board::parse(&contents).unwrap();
    assert_eq!(board.items_in("In Progress").len(), 1);
    assert!(board.items_in("Blocked").is_empty());
}

#[tokio::test]
async fn cancel_does_not_require_holding_the_wu() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let wu = basic_wu("WU-100");
    put_wu(&ws, &wu);

    let event = cancel(&ws, &wu.id, "someone-else", Some("duplicate of WU-099".to_string())).await.unwrap();
    assert!(matches!(event.kind, EventKind::Cancel { .. }));
}

#[tokio::test]
async fn checkpoint_does_not_resync_the_boards() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let wu = basic_wu("WU-100");
    put_wu(&ws, &wu);
    claim(&ws, &wu.id, "alice", &NoActivity).await.unwrap();

    checkpoint(&ws, &wu.id, "alice", "halfway done".to_string(), CheckpointDetail::default()).await.unwrap();
    assert!(!ws.resolve(&ws.config.directories.status_path).exists());
}

#[tokio::test]
async fn record_brief_evidence_rejects_a_non_holder() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let wu = basic_wu("WU-100");
    put_wu(&ws, &wu);
    claim(&ws, &wu.id, "alice", &NoActivity).await.unwrap();

    let err = record_brief_evidence(&ws, &wu.id, "mallory", "docs/brief.md".to_string()).await.unwrap_err();
    assert!(matches!(err, KernelError::Engine(EngineError::NotHolder { .. })));
}

#[tokio::test]
async fn record_brief_evidence_is_visible_to_a_later_complete() {
    let dir = tempfile::tempdir().unwrap();
    let mut ws = workspace(dir.path());
    ws.config.brief_policy_mode = lumenflow_core::BriefPolicyMode::Required;
    let wu = basic_wu("WU-100");
    put_wu(&ws, &wu);
    claim(&ws, &wu.id, "alice", &NoActivity).await.unwrap();

    record_brief_evidence(&ws, &wu.id, "alice", "docs/brief.md".to_string()).await.unwrap();

    let files = AllowAllFiles;
    let rules = NoopRulesEngine;
    complete(&ws, &wu.id, "alice", &complete_opts(&files, &rules)).await.unwrap();
}

#[tokio::test]
async fn complete_with_forced_brief_evidence_publishes_an_audit_signal() {
    let dir = tempfile::tempdir().unwrap();
    let mut ws = workspace(dir.path());
    ws.config.brief_policy_mode = lumenflow_core::BriefPolicyMode::Required;
    let wu = basic_wu("WU-100");
    put_wu(&ws, &wu);
    claim(&ws, &wu.id, "alice", &NoActivity).await.unwrap();

    let files = AllowAllFiles;
    let rules = NoopRulesEngine;
    let opts = CompleteOptions {
        files: &files,
        rules: &rules,
        accessibility_demonstrated: false,
        force_brief_evidence: true,
        force_spawn_provenance: false,
    };
    complete(&ws, &wu.id, "alice", &opts).await.unwrap();

    let signals = ws.signals.unread().unwrap();
    assert_eq!(signals.len(), 1);
    match &signals[0].payload {
        lumenflow_core::SignalPayload::Custom { message, .. } => {
            assert!(message.contains("brief_evidence"), "unexpected message: {message}");
        }
        other => panic!("expected a Custom bypass signal, got {other:?}"),
    }
}

#[tokio::test]
async fn complete_does_not_publish_a_signal_when_force_flags_are_unused() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let wu = basic_wu("WU-100");
    put_wu(&ws, &wu);
    claim(&ws, &wu.id, "alice", &NoActivity).await.unwrap();

    let files = AllowAllFiles;
    let rules = NoopRulesEngine;
    complete(&ws, &wu.id, "alice", &complete_opts(&files, &rules)).await.unwrap();

    assert!(ws.signals.unread().unwrap().is_empty());
}

#[tokio::test]
async fn delegate_then_pickup_is_reflected_in_the_registry() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let parent = WuId::parse("WU-001").unwrap();
    let target = WuId::parse("WU-002").unwrap();

    let delegation =
        delegate(&ws, parent.clone(), target.clone(), Lane::new("backend"), DelegationIntent::Delegation)
            .await
            .unwrap();
    assert!(!delegation.has_pickup());

    pickup(&ws, &delegation.id, "alice").await.unwrap();
    let reloaded = ws.delegations.get(&delegation.id).unwrap().unwrap();
    assert!(reloaded.has_pickup());
}

#[tokio::test]
async fn recover_escalates_a_delegation_with_no_pickup() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let parent = WuId::parse("WU-001").unwrap();
    let target = WuId::parse("WU-002").unwrap();
    let delegation =
        delegate(&ws, parent, target, Lane::new("backend"), DelegationIntent::Delegation).await.unwrap();

    let signal = recover(&ws, &delegation.id, false, 60_000).await.unwrap();
    assert!(matches!(signal.payload, lumenflow_core::SignalPayload::SpawnFailure(_)));

    let reloaded = ws.delegations.get(&delegation.id).unwrap().unwrap();
    assert_eq!(reloaded.status, lumenflow_core::DelegationStatus::Escalated);
}

#[tokio::test]
async fn recover_rejects_an_already_escalated_delegation() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let parent = WuId::parse("WU-001").unwrap();
    let target = WuId::parse("WU-002").unwrap();
    let delegation =
        delegate(&ws, parent, target, Lane::new("backend"), DelegationIntent::Delegation).await.unwrap();

    recover(&ws, &delegation.id, false, 60_000).await.unwrap();
    let err = recover(&ws, &delegation.id, false, 60_000).await.unwrap_err();
    assert!(matches!(err, KernelError::Engine(EngineError::AlreadyEscalated { .. })));
}

#[tokio::test]
async fn generate_context_and_query_ready_nodes_do_not_require_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    let ws = workspace(dir.path());
    let id = WuId::parse("WU-100").unwrap();

    let context = generate_context(&ws, &id, &ContextOptions::default()).unwrap();
    assert!(context.is_empty() || context.starts_with("##"));

    let nodes = query_ready_nodes(&ws, &id, None).unwrap();
    assert!(nodes.is_empty());
}

#[test]
fn effective_status_defaults_to_ready_for_an_untouched_wu() {
    let state = MaterializedState::fold(&[]);
    let id = WuId::parse("WU-100").unwrap();
    assert_eq!(effective_status(&state, &id), WuStatus::Ready);
}
