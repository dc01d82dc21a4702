// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Delegation (parent→child spawn) data model (§3, §4.4).

use crate::id::{hash_id, random_hex};
use crate::wu::{Lane, WuId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `dlg-XXXX` (historically `spawn-XXXX`, see §9 Open Questions).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DelegationId(String);

/// Didn't match `dlg-[0-9a-f]{4}` (§4.4 validation).
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid delegation id: {0:?} (expected `dlg-[0-9a-f]{{4}}`)")]
pub struct InvalidDelegationId(pub String);

impl DelegationId {
    /// `hash(parentWuId ∥ targetWuId ∥ unixMillis ∥ 4 random bytes)`,
    /// prefixed `dlg-`, first 4 hex chars of the SHA-256 (§4.4).
    pub fn generate(parent: &WuId, target: &WuId, unix_millis: u64) -> Self {
        let nonce = random_hex(8);
        let digest =
            hash_id(&[parent.as_str(), target.as_str(), &unix_millis.to_string(), &nonce], 4);
        Self(format!("dlg-{digest}"))
    }

    /// Regenerate with a fresh nonce on id collision within a workspace
    /// (§4.4: "on load if a collision is detected a new suffix is
    /// generated").
    pub fn regenerate(parent: &WuId, target: &WuId, unix_millis: u64) -> Self {
        Self::generate(parent, target, unix_millis)
    }

    pub fn parse(s: impl Into<String>) -> Result<Self, InvalidDelegationId> {
        let s = s.into();
        let valid = s
            .strip_prefix("dlg-")
            .is_some_and(|hex| hex.len() == 4 && hex.bytes().all(|b| b.is_ascii_hexdigit()));
        if valid {
            Ok(Self(s))
        } else {
            Err(InvalidDelegationId(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DelegationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether this assignment came from a first-class delegation or the
/// historical ad-hoc spawn path (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DelegationIntent {
    Delegation,
    LegacySpawn,
}

/// Delegation lifecycle status (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationStatus {
    Pending,
    Completed,
    Timeout,
    Crashed,
    Escalated,
}

crate::simple_display! {
    DelegationStatus {
        Pending => "pending",
        Completed => "completed",
        Timeout => "timeout",
        Crashed => "crashed",
        Escalated => "escalated",
    }
}

impl DelegationStatus {
    /// Once `Escalated`, no further transition is accepted except via
    /// explicit override (§8 "Delegation terminal states").
    pub fn is_terminal_for_escalation(self) -> bool {
        matches!(self, DelegationStatus::Escalated)
    }
}

/// A parent→child agent spawn record (§3 "Delegation record").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delegation {
    pub id: DelegationId,
    pub parent_wu_id: WuId,
    pub target_wu_id: WuId,
    pub lane: Lane,
    pub intent: DelegationIntent,
    pub status: DelegationStatus,
    pub delegated_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picked_up_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picked_up_by: Option<String>,
}

impl Delegation {
    pub fn has_pickup(&self) -> bool {
        self.picked_up_at_ms.is_some()
    }
}

#[cfg(test)]
#[path = "delegation_tests.rs"]
mod tests;
