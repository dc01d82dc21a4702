// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Recovery & escalation (§4.5).
//!
//! Classifies a stuck delegation, picks a severity from the count of
//! prior escalations already on disk for that id, publishes a
//! `spawn_failure` signal to the parent's inbox, marks the delegation
//! `escalated`, and writes an audit record. Escalating an already-escalated
//! delegation is rejected rather than silently repeated (§4.5 "idempotent
//! per status").

use crate::error::EngineError;
use lumenflow_core::{
    DelegationId, Severity, Signal, SignalId, SignalPayload, SpawnFailurePayload, SuggestedAction,
};
use lumenflow_storage::{DelegationRegistry, SignalStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// §4.5 step 2 classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    NoPickup,
    NoProgress,
    Stalled,
    Crashed,
}

impl Classification {
    fn as_str(self) -> &'static str {
        match self {
            Classification::NoPickup => "no_pickup",
            Classification::NoProgress => "no_progress",
            Classification::Stalled => "stalled",
            Classification::Crashed => "crashed",
        }
    }
}

/// Everything `classify` needs about the target delegation's progress,
/// gathered by the caller from the delegation registry and the target
/// WU's event stream — this module doesn't read either directly so it
/// stays independent of the storage crate's concrete log layout.
pub struct ProgressSnapshot {
    pub has_pickup: bool,
    pub last_checkpoint_ms: Option<u64>,
    pub crashed: bool,
}

/// Classifies a stuck delegation per §4.5 step 2.
pub fn classify(progress: &ProgressSnapshot, now_ms: u64, stall_window_ms: u64) -> Classification {
    if progress.crashed {
        return Classification::Crashed;
    }
    if !progress.has_pickup {
        return Classification::NoPickup;
    }
    match progress.last_checkpoint_ms {
        None => Classification::NoProgress,
        Some(last) if now_ms.saturating_sub(last) > stall_window_ms => Classification::Stalled,
        Some(_) => Classification::NoProgress,
    }
}

/// §4.5 step 4: severity/action scale by this escalation's attempt number
/// (prior escalations on disk, plus the one being recorded now).
fn severity_for(attempt: u32) -> (Severity, SuggestedAction) {
    match attempt {
        0 | 1 => (Severity::Warning, SuggestedAction::Retry),
        2 => (Severity::Error, SuggestedAction::Block),
        _ => (Severity::Critical, SuggestedAction::HumanEscalate),
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RecoveryAudit {
    delegation_id: String,
    classification: &'static str,
    severity: String,
    suggested_action: String,
    recovery_attempts: u32,
    at_ms: u64,
}

pub struct RecoveryEngine<'a> {
    delegations: &'a DelegationRegistry,
    signals: &'a SignalStore,
    audit_dir: &'a Path,
}

impl<'a> RecoveryEngine<'a> {
    pub fn new(delegations: &'a DelegationRegistry, signals: &'a SignalStore, audit_dir: &'a Path) -> Self {
        Self { delegations, signals, audit_dir }
    }

    /// Counts existing `recovery/<id>-*.json` audit files for `id` (§4.5
    /// step 4 "prior escalations in the recovery audit directory").
    fn prior_escalations(&self, id: &DelegationId) -> u32 {
        let Ok(entries) = std::fs::read_dir(self.audit_dir) else {
            return 0;
        };
        let prefix = format!("{}-", id.as_str());
        entries
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(&prefix))
            .count() as u32
    }

    /// Runs the full §4.5 algorithm for `id`. `now_ms` is also used as the
    /// audit file's timestamp component.
    pub fn recover(
        &self,
        id: &DelegationId,
        progress: &ProgressSnapshot,
        now_ms: u64,
        stall_window_ms: u64,
    ) -> Result<Signal, EngineError> {
        let delegation = self
            .delegations
            .get(id)?
            .ok_or_else(|| EngineError::UnknownDelegation { id: id.as_str().to_string() })?;

        if delegation.status.is_terminal_for_escalation() {
            return Err(EngineError::AlreadyEscalated { id: id.as_str().to_string() });
        }

        let classification = classify(progress, now_ms, stall_window_ms);
        let prior = self.prior_escalations(id);
        let attempt = prior + 1;
        let (severity, suggested_action) = severity_for(attempt);

        let payload = SpawnFailurePayload {
            spawn_id: id.as_str().to_string(),
            target_wu_id: delegation.target_wu_id.clone(),
            parent_wu_id: delegation.parent_wu_id.clone(),
            recovery_action: classification.as_str().to_string(),
            recovery_attempts: attempt,
            last_checkpoint: progress.last_checkpoint_ms.map(|ms| ms.to_string()),
            suggested_action,
        };

        let signal = Signal {
            id: SignalId::generate(),
            severity,
            payload: SignalPayload::SpawnFailure(payload),
            wu_id: Some(delegation.parent_wu_id.clone()),
            lane: Some(delegation.lane.clone()),
            created_at_ms: now_ms,
            read: false,
        };

        self.signals.publish(&signal)?;
        self.delegations.escalate(id, now_ms)?;
        self.write_audit(id, classification, severity, suggested_action, attempt, now_ms)?;

        Ok(signal)
    }

    fn write_audit(
        &self,
        id: &DelegationId,
        classification: Classification,
        severity: Severity,
        suggested_action: SuggestedAction,
        recovery_attempts: u32,
        now_ms: u64,
    ) -> Result<(), EngineError> {
        let path: PathBuf = self.audit_dir.join(format!("{}-{}.json", id.as_str(), now_ms));
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::AuditWrite { path: path.clone(), source: e })?;
        }
        let audit = RecoveryAudit {
            delegation_id: id.as_str().to_string(),
            classification: classification.as_str(),
            severity: severity.to_string(),
            suggested_action: suggested_action.to_string(),
            recovery_attempts,
            at_ms: now_ms,
        };
        let json = serde_json::to_string_pretty(&audit).unwrap_or_default();
        std::fs::write(&path, json).map_err(|e| EngineError::AuditWrite { path, source: e })
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
