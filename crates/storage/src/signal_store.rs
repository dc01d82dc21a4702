// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Append-only signal bus store (§3, §4.7).
//!
//! Signals are written once and never rewritten; marking one read appends
//! its id to a sibling rolling read-set file rather than mutating the
//! original row, the same pattern `MemoryStore` uses for access tracking.

use crate::append_log::{AppendLog, AppendLogError};
use lumenflow_core::{Severity, Signal, SignalId};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SignalStoreError {
    #[error(transparent)]
    Append(#[from] AppendLogError),
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct ReadMark {
    id: SignalId,
}

pub struct SignalStore {
    signals: AppendLog<Signal>,
    read_marks: AppendLog<ReadMark>,
}

impl SignalStore {
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            signals: AppendLog::new(dir.join("signals.jsonl")),
            read_marks: AppendLog::new(dir.join("signals.read.jsonl")),
        }
    }

    pub fn path(&self) -> &Path {
        self.signals.path()
    }

    pub fn publish(&self, signal: &Signal) -> Result<(), SignalStoreError> {
        self.signals.append(signal)?;
        Ok(())
    }

    fn read_ids(&self) -> Result<HashSet<SignalId>, SignalStoreError> {
        Ok(self.read_marks.read_all()?.into_iter().map(|m| m.id).collect())
    }

    /// All signals, with `read` reflecting both the field as written and
    /// any later mark-as-read entries.
    pub fn all(&self) -> Result<Vec<Signal>, SignalStoreError> {
        let read_ids = self.read_ids()?;
        let mut signals = self.signals.read_all()?;
        for signal in &mut signals {
            if read_ids.contains(&signal.id) {
                signal.read = true;
            }
        }
        Ok(signals)
    }

    pub fn unread(&self) -> Result<Vec<Signal>, SignalStoreError> {
        Ok(self.all()?.into_iter().filter(|s| !s.read).collect())
    }

    pub fn unread_at_or_above(&self, min_severity: Severity) -> Result<Vec<Signal>, SignalStoreError> {
        Ok(self.unread()?.into_iter().filter(|s| s.severity >= min_severity).collect())
    }

    /// Appends read-marks for every id in `ids`, idempotently (marking an
    /// already-read signal again is a harmless no-op).
    pub fn mark_as_read(&self, ids: &[SignalId]) -> Result<(), SignalStoreError> {
        let already_read = self.read_ids()?;
        for id in ids {
            if !already_read.contains(id) {
                self.read_marks.append(&ReadMark { id: id.clone() })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "signal_store_tests.rs"]
mod tests;
