// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Zstd-compressed snapshots of [`MaterializedState`] (§9 "memoized fold").
//!
//! A snapshot records the state as of a given event-log line count. On
//! replay the log's current line count is compared against the snapshot's;
//! a shorter log means the file was truncated or replaced underneath the
//! snapshot, and the snapshot is discarded rather than trusted (`EventLog`
//! handles that comparison — this module only owns the on-disk format).

use crate::state::MaterializedState;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};

const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub line_count: usize,
    pub state: MaterializedState,
}

pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, snapshot: &Snapshot) -> std::io::Result<()> {
        let json = serde_json::to_vec(snapshot)?;
        let compressed = zstd::encode_all(json.as_slice(), ZSTD_LEVEL)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, &compressed)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Loads the snapshot, or `None` when absent or unreadable (corrupt
    /// snapshots are treated the same as missing ones — the log is always
    /// the source of truth).
    pub fn load(&self) -> std::io::Result<Option<Snapshot>> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let mut compressed = Vec::new();
        std::io::BufReader::new(file).read_to_end(&mut compressed)?;
        let json = match zstd::decode_all(compressed.as_slice()) {
            Ok(j) => j,
            Err(_) => return Ok(None),
        };
        match serde_json::from_slice(&json) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
