// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Signal bus data model (§3, §4.7).

use crate::id::random_hex;
use crate::wu::{Lane, WuId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `sig-XXXXXXXX` (§4.7 "a fresh `sig-XXXXXXXX` id").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalId(String);

impl SignalId {
    pub fn generate() -> Self {
        Self(format!("sig-{}", random_hex(8)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Severity (§4.5 step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

crate::simple_display! {
    Severity {
        Warning => "warning",
        Error => "error",
        Critical => "critical",
    }
}

/// Recovery's recommended next action (§3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    Retry,
    Block,
    HumanEscalate,
}

crate::simple_display! {
    SuggestedAction {
        Retry => "retry",
        Block => "block",
        HumanEscalate => "human_escalate",
    }
}

/// `spawn_failure` payload (§3 "Signal").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnFailurePayload {
    pub spawn_id: String,
    pub target_wu_id: WuId,
    pub parent_wu_id: WuId,
    pub recovery_action: String,
    pub recovery_attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checkpoint: Option<String>,
    pub suggested_action: SuggestedAction,
}

/// Signal payload kinds. `Custom` lets other producers (e.g. policy-bypass
/// audit signals in §4.8) attach arbitrary JSON without a dedicated variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalPayload {
    SpawnFailure(SpawnFailurePayload),
    Custom { message: String, #[serde(default)] data: serde_json::Value },
}

/// A typed inter-agent message on the per-workspace bus (§3, §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    pub severity: Severity,
    pub payload: SignalPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wu_id: Option<WuId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane: Option<Lane>,
    pub created_at_ms: u64,
    #[serde(default)]
    pub read: bool,
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
