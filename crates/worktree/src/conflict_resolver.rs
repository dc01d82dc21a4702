// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Append-only conflict resolver (§4.9): a fixed list of files are
//! declared append-only — the event log, the status board, the backlog.
//! On a rebase/merge conflict in one of those files, resolve it in code
//! instead of asking a human, then verify the index is actually clean.

use crate::error::WorktreeError;
use std::collections::HashSet;

/// An append-only event log's identity key (e.g. `wu_id` + `seq`, or a
/// content hash) — callers extract this however their event envelope
/// defines identity; this module only needs equality and "theirs before
/// ours" ordering.
pub trait EventIdentity: Clone + Eq + std::hash::Hash {}
impl<T: Clone + Eq + std::hash::Hash> EventIdentity for T {}

/// Unions two JSONL event logs by event identity: every line from
/// `theirs` in its original order, then every line from `ours` whose
/// identity doesn't already appear in `theirs` (§4.9 "union by event
/// identity, preserve theirs ordering then ours additions"). Both inputs
/// must be schema-valid JSONL `serde_json::Value` lines; a line that
/// fails to parse makes the resolver refuse rather than guess.
pub fn union_event_log(
    ours: &str,
    theirs: &str,
    identity_of: impl Fn(&serde_json::Value) -> String,
) -> Result<String, WorktreeError> {
    let parse = |text: &str| -> Result<Vec<(String, serde_json::Value)>, WorktreeError> {
        text.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|line| {
                serde_json::from_str::<serde_json::Value>(line)
                    .map(|v| (identity_of(&v), v))
                    .map_err(|e| WorktreeError::ConflictResolutionRefused {
                        reason: format!("event log side is not schema-valid JSONL: {e}"),
                    })
            })
            .collect()
    };

    let theirs_entries = parse(theirs)?;
    let ours_entries = parse(ours)?;

    let theirs_ids: HashSet<&str> = theirs_entries.iter().map(|(id, _)| id.as_str()).collect();

    let mut out = String::new();
    for (_, value) in &theirs_entries {
        out.push_str(&serde_json::to_string(value).unwrap_or_default());
        out.push('\n');
    }
    for (id, value) in &ours_entries {
        if !theirs_ids.contains(id.as_str()) {
            out.push_str(&serde_json::to_string(value).unwrap_or_default());
            out.push('\n');
        }
    }
    Ok(out)
}

/// Status/backlog resolution: always prefer theirs, since both are
/// regenerated from the event log immediately after the merge (§4.9).
pub fn resolve_status_or_backlog_conflict(theirs: &str) -> String {
    theirs.to_string()
}

/// §4.9 "after any auto-resolution, `assertNoConflictArtifactsInIndex`
/// confirms no unmerged paths... otherwise fail with explicit paths".
/// `unmerged_paths` comes from `git status --porcelain`'s `U*`/`AA`/`DD`
/// entries, parsed by the caller (this module stays git-agnostic).
pub fn assert_no_conflict_artifacts_in_index(unmerged_paths: &[String]) -> Result<(), WorktreeError> {
    if unmerged_paths.is_empty() {
        Ok(())
    } else {
        Err(WorktreeError::UnresolvedConflictArtifacts { paths: unmerged_paths.to_vec() })
    }
}

/// Parses `git status --porcelain` output for unmerged-path markers
/// (`UU`, `AA`, `DD`, `AU`, `UA`, `UD`, `DU`).
pub fn parse_unmerged_paths(porcelain: &str) -> Vec<String> {
    const UNMERGED_MARKERS: &[&str] = &["UU", "AA", "DD", "AU", "UA", "UD", "DU"];
    porcelain
        .lines()
        .filter_map(|line| {
            let (marker, rest) = line.split_at(line.len().min(2));
            if UNMERGED_MARKERS.contains(&marker) {
                Some(rest.trim().to_string())
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "conflict_resolver_tests.rs"]
mod tests;
