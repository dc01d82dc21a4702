// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Work Unit (WU) data model (§3).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier matching `WU-<digits>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WuId(String);

/// `WU-<digits>` did not parse.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid WU id: {0:?} (expected `WU-<digits>`)")]
pub struct InvalidWuId(pub String);

impl WuId {
    pub fn parse(s: impl AsRef<str>) -> Result<Self, InvalidWuId> {
        let s = s.as_ref();
        let digits = s.strip_prefix("WU-").ok_or_else(|| InvalidWuId(s.to_string()))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidWuId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for WuId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for WuId {
    type Err = InvalidWuId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(any(test, feature = "test-support"))]
impl WuId {
    /// Test-only constructor that skips validation for fixture brevity.
    pub fn new_unchecked(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

/// Lane identifier, optionally sub-divided by `Parent: Sub` form (§3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lane(String);

impl Lane {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits `"Parent: Sub"` into `(parent, Some(sub))`; a bare lane
    /// returns `(lane, None)`.
    pub fn parent_sub(&self) -> (&str, Option<&str>) {
        match self.0.split_once(':') {
            Some((parent, sub)) => (parent.trim(), Some(sub.trim())),
            None => (self.0.as_str(), None),
        }
    }

    /// The parent-lane portion, used as the WIP-budget key (§4.3 "WIP is
    /// per-parent-lane; multiple sub-lanes share the WIP budget").
    pub fn parent(&self) -> &str {
        self.parent_sub().0
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lane lock policy (§3, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockPolicy {
    All,
    Active,
    None,
}

crate::simple_display! {
    LockPolicy {
        All => "all",
        Active => "active",
        None => "none",
    }
}

/// WU type (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WuType {
    Feature,
    Bug,
    Refactor,
    Documentation,
    Chore,
}

crate::simple_display! {
    WuType {
        Feature => "feature",
        Bug => "bug",
        Refactor => "refactor",
        Documentation => "documentation",
        Chore => "chore",
    }
}

/// Declarative WU status as written in YAML (§3). The replayed status from
/// the event log (see `lumenflow-storage`) is the authoritative runtime
/// status; this is the YAML-side mirror that must match it post-projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WuStatus {
    Ready,
    InProgress,
    Blocked,
    Done,
    Cancelled,
}

crate::simple_display! {
    WuStatus {
        Ready => "ready",
        InProgress => "in_progress",
        Blocked => "blocked",
        Done => "done",
        Cancelled => "cancelled",
    }
}

/// Priority (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

crate::simple_display! {
    Priority {
        P0 => "P0",
        P1 => "P1",
        P2 => "P2",
        P3 => "P3",
    }
}

/// Exposure surface (§3), used by the accessibility/docs-only policy rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exposure {
    Ui,
    Api,
    Cli,
    Documentation,
    #[serde(untagged)]
    Other(String),
}

/// Test references grouped by kind (§3).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRefs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unit: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub e2e: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integration: Vec<String>,
    /// Free-text descriptions, not file paths — skipped by existence checks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manual: Vec<String>,
}

impl TestRefs {
    /// True if any of unit/e2e/integration is non-empty (§4.8 rule 5).
    pub fn has_automated(&self) -> bool {
        !self.unit.is_empty() || !self.e2e.is_empty() || !self.integration.is_empty()
    }

    /// All file-path-bearing entries (unit/e2e/integration), for existence
    /// checks. `manual` is intentionally excluded.
    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.unit.iter().chain(self.e2e.iter()).chain(self.integration.iter()).map(String::as_str)
    }
}

/// A Work Unit's declarative YAML content (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wu {
    pub id: WuId,
    pub title: String,
    pub lane: Lane,
    #[serde(rename = "type")]
    pub wu_type: WuType,
    pub status: WuStatus,
    pub priority: Priority,
    pub created: NaiveDate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_paths: Vec<String>,
    #[serde(default)]
    pub tests: TestRefs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<Exposure>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Declared only when exposure/type is documentation, or all code
    /// paths are docs (§4.8 rule 2) — otherwise rejected by policy.
    #[serde(default)]
    pub docs_only: bool,
}

#[cfg(any(test, feature = "test-support"))]
impl Wu {
    pub fn builder(id: impl Into<String>) -> WuBuilder {
        WuBuilder::new(id)
    }
}

/// Test-only builder (§9 Design Notes pattern, applied per-crate rather
/// than via the shared macro since field groups differ widely per type).
#[cfg(any(test, feature = "test-support"))]
pub struct WuBuilder {
    wu: Wu,
}

#[cfg(any(test, feature = "test-support"))]
impl WuBuilder {
    fn new(id: impl Into<String>) -> Self {
        Self {
            wu: Wu {
                id: WuId::new_unchecked(id),
                title: "untitled".to_string(),
                lane: Lane::new("default"),
                wu_type: WuType::Feature,
                status: WuStatus::Ready,
                priority: Priority::P2,
                created: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default(),
                code_paths: Vec::new(),
                tests: TestRefs::default(),
                initiative: None,
                exposure: None,
                description: String::new(),
                docs_only: false,
            },
        }
    }

    pub fn title(mut self, v: impl Into<String>) -> Self {
        self.wu.title = v.into();
        self
    }

    pub fn lane(mut self, v: impl Into<String>) -> Self {
        self.wu.lane = Lane::new(v.into());
        self
    }

    pub fn wu_type(mut self, v: WuType) -> Self {
        self.wu.wu_type = v;
        self
    }

    pub fn status(mut self, v: WuStatus) -> Self {
        self.wu.status = v;
        self
    }

    pub fn priority(mut self, v: Priority) -> Self {
        self.wu.priority = v;
        self
    }

    pub fn code_paths(mut self, v: Vec<String>) -> Self {
        self.wu.code_paths = v;
        self
    }

    pub fn unit_tests(mut self, v: Vec<String>) -> Self {
        self.wu.tests.unit = v;
        self
    }

    pub fn exposure(mut self, v: Exposure) -> Self {
        self.wu.exposure = Some(v);
        self
    }

    pub fn docs_only(mut self, v: bool) -> Self {
        self.wu.docs_only = v;
        self
    }

    pub fn build(self) -> Wu {
        self.wu
    }
}

#[cfg(test)]
#[path = "wu_tests.rs"]
mod tests;
