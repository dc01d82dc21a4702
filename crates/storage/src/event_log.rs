// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! The append-only event log (§3, §4.1) and its snapshot fast path.

use crate::append_log::{AppendLog, AppendLogError};
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::state::MaterializedState;
use lumenflow_core::{Event, WuId};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    #[error(transparent)]
    Append(#[from] AppendLogError),
}

impl lumenflow_core::LumenError for EventLogError {
    fn kind(&self) -> lumenflow_core::ErrorKind {
        match self {
            EventLogError::Append(AppendLogError::Parse { .. }) => lumenflow_core::ErrorKind::Parse,
            EventLogError::Append(AppendLogError::Io { .. }) => lumenflow_core::ErrorKind::Io,
        }
    }
}

/// The append-only log of lifecycle events, one file per workspace (§4.1:
/// `docs/tasks/wu/events.jsonl` by default, though the exact path is the
/// caller's concern — this type just owns the append/replay mechanics).
pub struct EventLog {
    log: AppendLog<Event>,
    snapshots: SnapshotStore,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self { log: AppendLog::new(path), snapshots: SnapshotStore::new(snapshot_path) }
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    /// Append one event durably. Does not itself validate the transition —
    /// that is `lumenflow-engine`'s job, with this log as the ledger of
    /// record once the engine has approved the move.
    pub fn append(&self, event: &Event) -> Result<(), EventLogError> {
        self.log.append(event)?;
        Ok(())
    }

    pub fn append_checkpoint(
        &self,
        wu_id: WuId,
        actor: impl Into<String>,
        timestamp_ms: u64,
        note: impl Into<String>,
        detail: lumenflow_core::CheckpointDetail,
    ) -> Result<(), EventLogError> {
        let event = Event::new(
            wu_id,
            actor,
            timestamp_ms,
            lumenflow_core::EventKind::Checkpoint { note: note.into(), detail },
        );
        self.append(&event)
    }

    /// Full replay of every event on disk, ignoring any snapshot. Used by
    /// `cargo`-style verification paths and by [`Self::replay`] itself when
    /// no usable snapshot exists.
    pub fn replay_from_scratch(&self) -> Result<MaterializedState, EventLogError> {
        let events = self.log.read_all()?;
        Ok(MaterializedState::fold(&events))
    }

    /// Replay via the snapshot fast path when available: load the most
    /// recent snapshot, verify the log hasn't been truncated underneath it
    /// (§9 "snapshots are a memoized fold, silently ignored if stale"), and
    /// fold only the events appended since. Falls back to a full replay
    /// whenever the snapshot is missing, stale, or unreadable.
    pub fn replay(&self) -> Result<MaterializedState, EventLogError> {
        let current_lines = self.log.line_count()?;

        let snapshot = match self.snapshots.load() {
            Ok(Some(s)) => s,
            Ok(None) => return self.replay_from_scratch(),
            Err(e) => {
                warn!(error = %e, "snapshot unreadable, falling back to full replay");
                return self.replay_from_scratch();
            }
        };

        if snapshot.line_count > current_lines {
            warn!(
                snapshot_lines = snapshot.line_count,
                current_lines, "event log shorter than snapshot, discarding stale snapshot"
            );
            return self.replay_from_scratch();
        }

        let all_events = self.log.read_all()?;
        if snapshot.line_count > all_events.len() {
            return self.replay_from_scratch();
        }

        let mut state = snapshot.state;
        state.apply_all(&all_events[snapshot.line_count..]);
        debug!(
            resumed_from = snapshot.line_count,
            applied = all_events.len() - snapshot.line_count,
            "resumed replay from snapshot"
        );
        Ok(state)
    }

    /// Persist the current materialized state as a snapshot at the log's
    /// present length, so future replays can skip straight to the tail.
    pub fn save_snapshot(&self, state: &MaterializedState) -> Result<(), EventLogError> {
        let line_count = self.log.line_count()?;
        self.snapshots
            .save(&Snapshot { line_count, state: state.clone() })
            .map_err(|e| EventLogError::Append(AppendLogError::Io {
                path: self.snapshots.path().to_path_buf(),
                source: e,
            }))
    }

    /// Most recent `brief_evidence` location recorded for `wu_id`, or
    /// `None` if it never got one (§4.8 rule 7, §4.1).
    pub fn latest_brief_evidence(&self, wu_id: &WuId) -> Result<Option<String>, EventLogError> {
        let events = self.log.read_all()?;
        Ok(events
            .iter()
            .rev()
            .filter(|e| &e.wu_id == wu_id)
            .find_map(|e| match &e.kind {
                lumenflow_core::EventKind::BriefEvidence { location } => Some(location.clone()),
                _ => None,
            }))
    }
}

#[cfg(test)]
#[path = "event_log_tests.rs"]
mod tests;
