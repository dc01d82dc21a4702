// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! The kernel's command surface (§4.1, §4.4, §4.5, §4.6, §4.8): the
//! entry points a CLI or daemon host calls, each wiring the right
//! `lumenflow-engine` collaborator to the workspace's storage handles
//! and the status/backlog projectors. Every state-mutating command
//! acquires the workspace mutex for its full duration (§5).

use crate::board_sync::{sync_backlog_board, sync_status_board, BACKLOG_HEADINGS, STATUS_HEADINGS};
use crate::error::KernelError;
use crate::workspace::Workspace;
use lumenflow_core::{
    CheckpointDetail, Clock, Delegation, DelegationId, DelegationIntent, Event, EventKind, Lane,
    Wu, WuId, WuStatus,
};
use lumenflow_engine::{
    ActivityProbe, CompletionPolicyEngine, ContextAssembler, ContextOptions, EngineError, FileProbe,
    LaneManager, LifecycleEngine, ProgressSnapshot, RecoveryEngine, RulesEngine,
};
use lumenflow_projectors::{Board, MoveItemOptions};
use lumenflow_storage::MaterializedState;
use std::collections::HashMap;
use std::path::Path;

/// Loads every WU and the full materialized state, then resolves `id`
/// against them. Shared by every lifecycle command since
/// `LifecycleEngine::new` always needs a `LaneManager` over the full WU
/// set even when the transition itself (e.g. `complete`) never consults
/// lane occupancy.
fn load_context<C: Clock>(
    ws: &Workspace<C>,
    id: &WuId,
) -> Result<(HashMap<WuId, Wu>, MaterializedState, Wu), KernelError> {
    let wu_dir = ws.resolve(ws.wu_dir());
    let wus: HashMap<WuId, Wu> =
        lumenflow_projectors::load_all(&wu_dir)?.into_iter().map(|w| (w.id.clone(), w)).collect();
    let state = ws.event_log.replay()?;
    let wu = wus.get(id).cloned().ok_or_else(|| KernelError::UnknownWu(id.as_str().to_string()))?;
    Ok((wus, state, wu))
}

fn effective_status(state: &MaterializedState, id: &WuId) -> WuStatus {
    state.get(id).map(|s| s.status).unwrap_or(WuStatus::Ready)
}

fn read_board(path: &Path, default_headings: &[&str]) -> Result<Board, KernelError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Board::parse(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Ok(Board::new(default_headings.iter().map(|h| h.to_string()).collect()))
        }
        Err(e) => Err(KernelError::Io { path: path.to_path_buf(), source: e }),
    }
}

fn write_board(path: &Path, board: &Board) -> Result<(), KernelError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| KernelError::Io { path: parent.to_path_buf(), source: e })?;
    }
    std::fs::write(path, board.render())
        .map_err(|e| KernelError::Io { path: path.to_path_buf(), source: e })?;
    Ok(())
}

/// Re-projects `id`'s line in both `status.md` and `backlog.md` to its
/// freshly-folded status (§4.2, §8 scenario 1).
fn resync_boards<C: Clock>(ws: &Workspace<C>, id: &WuId, wu_template: &Wu) -> Result<(), KernelError> {
    let state = ws.event_log.replay()?;
    let mut view = wu_template.clone();
    view.status = effective_status(&state, id);

    let status_path = ws.resolve(&ws.config.directories.status_path);
    let mut status_board = read_board(&status_path, STATUS_HEADINGS)?;
    sync_status_board(&mut status_board, &view)?;
    write_board(&status_path, &status_board)?;

    let backlog_path = ws.resolve(&ws.config.directories.backlog_path);
    let mut backlog_board = read_board(&backlog_path, BACKLOG_HEADINGS)?;
    sync_backlog_board(&mut backlog_board, &view)?;
    write_board(&backlog_path, &backlog_board)?;

    Ok(())
}

fn lifecycle_engine<'a>(
    wus: &'a HashMap<WuId, Wu>,
    state: &'a MaterializedState,
    config: &'a lumenflow_core::WorkspaceConfig,
) -> LifecycleEngine<'a> {
    LifecycleEngine::new(LaneManager::new(wus, state, config), state)
}

/// `claim(wuId, actor)` (§4.1, §4.3). `probe` resolves the `active` lock
/// policy's uncommitted-work signal; pass `&lumenflow_engine::NoActivity`
/// when the caller has no worktree context to check.
pub async fn claim<C: Clock>(
    ws: &Workspace<C>,
    id: &WuId,
    actor: &str,
    probe: &dyn ActivityProbe,
) -> Result<Event, KernelError> {
    let _guard = ws.lock().await;
    let (wus, state, wu) = load_context(ws, id)?;
    let now_ms = ws.clock.epoch_ms();
    let event = lifecycle_engine(&wus, &state, &ws.config).claim(&wu, actor, now_ms, probe)?;
    ws.event_log.append(&event)?;
    resync_boards(ws, id, &wu)?;
    Ok(event)
}

/// `block(wuId, actor, reason)` (§4.1).
pub async fn block<C: Clock>(
    ws: &Workspace<C>,
    id: &WuId,
    actor: &str,
    reason: String,
) -> Result<Event, KernelError> {
    let _guard = ws.lock().await;
    let (wus, state, wu) = load_context(ws, id)?;
    let now_ms = ws.clock.epoch_ms();
    let event = lifecycle_engine(&wus, &state, &ws.config).block(id, actor, now_ms, reason)?;
    ws.event_log.append(&event)?;
    resync_boards(ws, id, &wu)?;
    Ok(event)
}

/// `unblock(wuId, actor)` (§4.1).
pub async fn unblock<C: Clock>(ws: &Workspace<C>, id: &WuId, actor: &str) -> Result<Event, KernelError> {
    let _guard = ws.lock().await;
    let (wus, state, wu) = load_context(ws, id)?;
    let now_ms = ws.clock.epoch_ms();
    let event = lifecycle_engine(&wus, &state, &ws.config).unblock(id, actor, now_ms)?;
    ws.event_log.append(&event)?;
    resync_boards(ws, id, &wu)?;
    Ok(event)
}

/// `cancel(wuId, actor, reason?)` (§4.1). Does not require holding the
/// WU (cancellation can come from outside).
pub async fn cancel<C: Clock>(
    ws: &Workspace<C>,
    id: &WuId,
    actor: &str,
    reason: Option<String>,
) -> Result<Event, KernelError> {
    let _guard = ws.lock().await;
    let (wus, state, wu) = load_context(ws, id)?;
    let now_ms = ws.clock.epoch_ms();
    let event = lifecycle_engine(&wus, &state, &ws.config).cancel(id, actor, now_ms, reason)?;
    ws.event_log.append(&event)?;
    resync_boards(ws, id, &wu)?;
    Ok(event)
}

/// `checkpoint(wuId, actor, note, detail)` (§4.1): does not itself
/// change status, so no board resync is needed.
pub async fn checkpoint<C: Clock>(
    ws: &Workspace<C>,
    id: &WuId,
    actor: &str,
    note: String,
    detail: CheckpointDetail,
) -> Result<Event, KernelError> {
    let _guard = ws.lock().await;
    let (wus, state, _wu) = load_context(ws, id)?;
    let now_ms = ws.clock.epoch_ms();
    let event = lifecycle_engine(&wus, &state, &ws.config).checkpoint(id, actor, now_ms, note, detail)?;
    ws.event_log.append(&event)?;
    Ok(event)
}

/// `brief_evidence(wuId, actor, location)` (§4.8 rule 7): not guarded by
/// `LifecycleEngine` (it never changes status, §3 "checkpoint and
/// brief_evidence do not change status"), but still requires the
/// recording actor to be the current holder.
pub async fn record_brief_evidence<C: Clock>(
    ws: &Workspace<C>,
    id: &WuId,
    actor: &str,
    location: String,
) -> Result<Event, KernelError> {
    let _guard = ws.lock().await;
    let state = ws.event_log.replay()?;
    let holder = state.get(id).and_then(|s| s.holder.as_deref());
    if holder != Some(actor) {
        return Err(KernelError::Engine(EngineError::NotHolder {
            wu_id: id.clone(),
            actor: actor.to_string(),
            holder: holder.map(str::to_string),
        }));
    }
    let now_ms = ws.clock.epoch_ms();
    let event = Event::new(id.clone(), actor, now_ms, EventKind::BriefEvidence { location });
    ws.event_log.append(&event)?;
    Ok(event)
}

/// Collaborators needed to run the completion policy pipeline (§4.8)
/// before a `complete` event is appended; supplied by the caller since
/// they're project-dependent (real filesystem probing, custom surface
/// rules).
pub struct CompleteOptions<'a> {
    pub files: &'a dyn FileProbe,
    pub rules: &'a dyn RulesEngine,
    pub accessibility_demonstrated: bool,
    pub force_brief_evidence: bool,
    pub force_spawn_provenance: bool,
}

/// `complete(wuId, actor)` (§4.1, §4.8, §8 scenario 1). Runs the full
/// eight-rule completion policy before appending the event; on success
/// also writes the stamp file and re-projects both boards.
pub async fn complete<C: Clock>(
    ws: &Workspace<C>,
    id: &WuId,
    actor: &str,
    opts: &CompleteOptions<'_>,
) -> Result<Event, KernelError> {
    let _guard = ws.lock().await;
    let (wus, state, wu) = load_context(ws, id)?;
    let now_ms = ws.clock.epoch_ms();

    let has_brief_evidence = ws.event_log.latest_brief_evidence(id)?.is_some();
    let delegation = ws
        .delegations
        .list()?
        .into_iter()
        .find(|d| &d.target_wu_id == id);

    let policy_ctx = lumenflow_engine::PolicyContext {
        wu: &wu,
        docs_prefixes: &ws.config.doc_prefixes,
        brief_policy_mode: ws.config.brief_policy_mode,
        has_brief_evidence,
        accessibility_demonstrated: opts.accessibility_demonstrated,
        delegation: delegation.as_ref(),
        force_brief_evidence: opts.force_brief_evidence,
        force_spawn_provenance: opts.force_spawn_provenance,
    };
    let policy = CompletionPolicyEngine::new(opts.files, opts.rules);
    policy.evaluate(&policy_ctx)?;
    let bypassed = policy.bypassed_rules(&policy_ctx);

    let event = lifecycle_engine(&wus, &state, &ws.config).complete(id, actor, now_ms)?;
    ws.event_log.append(&event)?;
    lumenflow_projectors::write_stamp(&ws.resolve(ws.wu_dir()), id, now_ms)?;
    if let Some(d) = delegation {
        ws.delegations.complete(&d.id, now_ms)?;
    }
    for rule in bypassed {
        publish_force_override_signal(ws, id, actor, rule, now_ms)?;
    }
    resync_boards(ws, id, &wu)?;
    Ok(event)
}

/// Records an auditable trail for a forced completion-policy bypass (§4.8
/// rules 7/8: "records an override via a signal").
fn publish_force_override_signal<C: Clock>(
    ws: &Workspace<C>,
    id: &WuId,
    actor: &str,
    rule: &'static str,
    now_ms: u64,
) -> Result<(), KernelError> {
    let signal = lumenflow_core::Signal {
        id: lumenflow_core::SignalId::generate(),
        severity: lumenflow_core::Severity::Warning,
        payload: lumenflow_core::SignalPayload::Custom {
            message: format!("completion policy rule `{rule}` was forced by {actor}"),
            data: serde_json::json!({ "rule": rule, "actor": actor, "wu_id": id.as_str() }),
        },
        wu_id: Some(id.clone()),
        lane: None,
        created_at_ms: now_ms,
        read: false,
    };
    ws.signals.publish(&signal)?;
    Ok(())
}

/// `delegate(parentWuId, targetWuId, lane, intent)` (§4.4): records a
/// new delegation targeting `target_wu_id`.
pub async fn delegate<C: Clock>(
    ws: &Workspace<C>,
    parent_wu_id: WuId,
    target_wu_id: WuId,
    lane: Lane,
    intent: DelegationIntent,
) -> Result<Delegation, KernelError> {
    let _guard = ws.lock().await;
    let now_ms = ws.clock.epoch_ms();
    Ok(ws.delegations.record(parent_wu_id, target_wu_id, lane, intent, now_ms)?)
}

/// `pickup(delegationId, actor)` (§4.4): records that `actor` started
/// work on a delegated WU.
pub async fn pickup<C: Clock>(ws: &Workspace<C>, id: &DelegationId, actor: &str) -> Result<(), KernelError> {
    let _guard = ws.lock().await;
    let now_ms = ws.clock.epoch_ms();
    Ok(ws.delegations.pickup(id, actor, now_ms)?)
}

/// `recover(delegationId, crashed, stallWindowMs)` (§4.5): classifies a
/// stuck delegation and escalates it. `crashed` is supplied by the
/// caller (a process-exit observation this crate has no way to derive
/// on its own); the remaining progress signals are read from the
/// target WU's materialized state.
pub async fn recover<C: Clock>(
    ws: &Workspace<C>,
    id: &DelegationId,
    crashed: bool,
    stall_window_ms: u64,
) -> Result<lumenflow_core::Signal, KernelError> {
    let _guard = ws.lock().await;
    let delegation = ws
        .delegations
        .get(id)?
        .ok_or_else(|| KernelError::Engine(EngineError::UnknownDelegation { id: id.as_str().to_string() }))?;

    let state = ws.event_log.replay()?;
    let target_state = state.get(&delegation.target_wu_id);
    let progress = ProgressSnapshot {
        has_pickup: delegation.has_pickup(),
        last_checkpoint_ms: target_state.and_then(|s| s.last_checkpoint_ms),
        crashed,
    };

    let now_ms = ws.clock.epoch_ms();
    let engine = RecoveryEngine::new(&ws.delegations, &ws.signals, &ws.paths.recovery_dir);
    Ok(engine.recover(id, &progress, now_ms, stall_window_ms)?)
}

/// `generateContext(wuId, options)` (§4.6): read-only, no workspace
/// lock needed.
pub fn generate_context<C: Clock>(
    ws: &Workspace<C>,
    id: &WuId,
    options: &ContextOptions,
) -> Result<String, KernelError> {
    Ok(ContextAssembler::new(&ws.memory, &ws.relationships).generate_context(id, options)?)
}

/// `queryReadyNodes(wuId, type?)` (§4.6): read-only, no workspace lock
/// needed.
pub fn query_ready_nodes<C: Clock>(
    ws: &Workspace<C>,
    id: &WuId,
    type_filter: Option<&str>,
) -> Result<Vec<lumenflow_core::MemoryNode>, KernelError> {
    Ok(ContextAssembler::new(&ws.memory, &ws.relationships).query_ready_nodes(id, type_filter)?)
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
