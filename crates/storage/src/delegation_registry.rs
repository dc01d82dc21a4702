// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Event-sourced delegation registry (§3 "Delegation record", §4.4).
//!
//! Like the WU event log, the on-disk file is append-only JSONL; unlike
//! the WU log, each line here is a small state-transition event over a
//! `Delegation` record rather than the record itself, so a pickup or
//! escalation doesn't require rewriting the whole row. The authoritative
//! file name is `delegation-registry.jsonl`; a workspace carrying the
//! legacy `spawn-registry.jsonl` name is migrated once, in place, the
//! first time the registry is opened (§3 Open Questions, resolved in
//! `SPEC_FULL.md` §3).

use crate::append_log::{AppendLog, AppendLogError};
use lumenflow_core::{Delegation, DelegationId, DelegationIntent, DelegationStatus, Lane, WuId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DelegationEvent {
    Record { delegation: Delegation },
    Pickup { id: DelegationId, actor: String, at_ms: u64 },
    Complete { id: DelegationId, at_ms: u64 },
    Timeout { id: DelegationId, at_ms: u64 },
    Crash { id: DelegationId, at_ms: u64 },
    Escalate { id: DelegationId, at_ms: u64 },
}

impl DelegationEvent {
    fn id(&self) -> &DelegationId {
        match self {
            DelegationEvent::Record { delegation } => &delegation.id,
            DelegationEvent::Pickup { id, .. }
            | DelegationEvent::Complete { id, .. }
            | DelegationEvent::Timeout { id, .. }
            | DelegationEvent::Crash { id, .. }
            | DelegationEvent::Escalate { id, .. } => id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DelegationRegistryError {
    #[error(transparent)]
    Append(#[from] AppendLogError),
    #[error("no delegation record for id {0}")]
    UnknownId(String),
    #[error("delegation id {0} already taken after {1} collision retries")]
    IdExhausted(String, u32),
}

const MAX_ID_COLLISION_RETRIES: u32 = 8;

/// Opens `delegation-registry.jsonl`, migrating `spawn-registry.jsonl`
/// in place the first time if the new name doesn't exist yet but the old
/// one does.
pub struct DelegationRegistry {
    log: AppendLog<DelegationEvent>,
}

impl DelegationRegistry {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, DelegationRegistryError> {
        let dir = dir.as_ref();
        let current = dir.join("delegation-registry.jsonl");
        let legacy = dir.join("spawn-registry.jsonl");
        if !current.exists() && legacy.exists() {
            std::fs::rename(&legacy, &current).map_err(|e| {
                DelegationRegistryError::Append(AppendLogError::Io { path: current.clone(), source: e })
            })?;
        }
        Ok(Self { log: AppendLog::new(current) })
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    fn fold(&self) -> Result<HashMap<DelegationId, Delegation>, DelegationRegistryError> {
        let events = self.log.read_all()?;
        let mut by_id: HashMap<DelegationId, Delegation> = HashMap::new();
        for event in events {
            match event {
                DelegationEvent::Record { delegation } => {
                    by_id.insert(delegation.id.clone(), delegation);
                }
                other => {
                    if let Some(d) = by_id.get_mut(other.id()) {
                        apply_transition(d, &other);
                    }
                }
            }
        }
        Ok(by_id)
    }

    pub fn get(&self, id: &DelegationId) -> Result<Option<Delegation>, DelegationRegistryError> {
        Ok(self.fold()?.remove(id))
    }

    pub fn list(&self) -> Result<Vec<Delegation>, DelegationRegistryError> {
        let mut all: Vec<_> = self.fold()?.into_values().collect();
        all.sort_by_key(|d| d.delegated_at_ms);
        Ok(all)
    }

    pub fn list_pending(&self) -> Result<Vec<Delegation>, DelegationRegistryError> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|d| matches!(d.status, DelegationStatus::Pending))
            .collect())
    }

    /// Records a new delegation, regenerating the id on collision against
    /// the current set up to a bounded number of retries (§4.4).
    pub fn record(
        &self,
        parent_wu_id: WuId,
        target_wu_id: WuId,
        lane: Lane,
        intent: DelegationIntent,
        delegated_at_ms: u64,
    ) -> Result<Delegation, DelegationRegistryError> {
        let existing = self.fold()?;
        let mut id = DelegationId::generate(&parent_wu_id, &target_wu_id, delegated_at_ms);
        let mut retries = 0;
        while existing.contains_key(&id) {
            retries += 1;
            if retries > MAX_ID_COLLISION_RETRIES {
                return Err(DelegationRegistryError::IdExhausted(id.as_str().to_string(), retries));
            }
            id = DelegationId::regenerate(&parent_wu_id, &target_wu_id, delegated_at_ms);
        }

        let delegation = Delegation {
            id,
            parent_wu_id,
            target_wu_id,
            lane,
            intent,
            status: DelegationStatus::Pending,
            delegated_at_ms,
            completed_at_ms: None,
            picked_up_at_ms: None,
            picked_up_by: None,
        };
        self.log.append(&DelegationEvent::Record { delegation: delegation.clone() })?;
        Ok(delegation)
    }

    pub fn pickup(
        &self,
        id: &DelegationId,
        actor: impl Into<String>,
        at_ms: u64,
    ) -> Result<(), DelegationRegistryError> {
        self.require_known(id)?;
        self.log.append(&DelegationEvent::Pickup { id: id.clone(), actor: actor.into(), at_ms })?;
        Ok(())
    }

    pub fn complete(&self, id: &DelegationId, at_ms: u64) -> Result<(), DelegationRegistryError> {
        self.require_known(id)?;
        self.log.append(&DelegationEvent::Complete { id: id.clone(), at_ms })?;
        Ok(())
    }

    pub fn timeout(&self, id: &DelegationId, at_ms: u64) -> Result<(), DelegationRegistryError> {
        self.require_known(id)?;
        self.log.append(&DelegationEvent::Timeout { id: id.clone(), at_ms })?;
        Ok(())
    }

    pub fn crash(&self, id: &DelegationId, at_ms: u64) -> Result<(), DelegationRegistryError> {
        self.require_known(id)?;
        self.log.append(&DelegationEvent::Crash { id: id.clone(), at_ms })?;
        Ok(())
    }

    /// Escalates the delegation. Terminal: once escalated, later
    /// transitions for the same id are accepted on the log but ignored by
    /// the fold (§8 "Delegation terminal states").
    pub fn escalate(&self, id: &DelegationId, at_ms: u64) -> Result<(), DelegationRegistryError> {
        self.require_known(id)?;
        self.log.append(&DelegationEvent::Escalate { id: id.clone(), at_ms })?;
        Ok(())
    }

    fn require_known(&self, id: &DelegationId) -> Result<(), DelegationRegistryError> {
        if self.fold()?.contains_key(id) {
            Ok(())
        } else {
            Err(DelegationRegistryError::UnknownId(id.as_str().to_string()))
        }
    }
}

fn apply_transition(d: &mut Delegation, event: &DelegationEvent) {
    if d.status.is_terminal_for_escalation() {
        return;
    }
    match event {
        DelegationEvent::Pickup { actor, at_ms, .. } => {
            d.picked_up_at_ms = Some(*at_ms);
            d.picked_up_by = Some(actor.clone());
        }
        DelegationEvent::Complete { at_ms, .. } => {
            d.status = DelegationStatus::Completed;
            d.completed_at_ms = Some(*at_ms);
        }
        DelegationEvent::Timeout { .. } => d.status = DelegationStatus::Timeout,
        DelegationEvent::Crash { .. } => d.status = DelegationStatus::Crashed,
        DelegationEvent::Escalate { .. } => d.status = DelegationStatus::Escalated,
        DelegationEvent::Record { .. } => {}
    }
}

#[cfg(test)]
#[path = "delegation_registry_tests.rs"]
mod tests;
