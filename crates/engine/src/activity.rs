// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Activity probe for the `active` lane lock policy (§3, §4.3).
//!
//! Resolved per the Open Question in §9/`SPEC_FULL.md` §3: a holder under
//! `active` policy is reported if its worktree shows uncommitted changes
//! *or* its last checkpoint is within the staleness window — the union of
//! both signals the spec's call sites disagree on individually.

use lumenflow_core::WuId;

/// A lane's uncommitted-work signal, supplied by the worktree layer so
/// the engine doesn't depend on git directly.
pub trait ActivityProbe {
    fn has_uncommitted_changes(&self, wu_id: &WuId) -> bool;
}

/// Used by callers that only care about `all`/`none` policies, where the
/// activity signal never gets consulted.
pub struct NoActivity;

impl ActivityProbe for NoActivity {
    fn has_uncommitted_changes(&self, _wu_id: &WuId) -> bool {
        false
    }
}

/// Generic staleness threshold (§3 "A lock is stale if older than a fixed
/// threshold (24h)"), reused as the `active` policy's checkpoint window.
pub const STALENESS_THRESHOLD_MS: u64 = 24 * 60 * 60 * 1000;
