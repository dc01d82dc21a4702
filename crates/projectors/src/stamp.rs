// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Stamp files (§4.2): a thin marker written alongside a WU's YAML when
//! it completes. A WU with YAML `status: done` and no stamp is an orphan
//! — typically from a crash between the status write and the stamp write
//! — repaired by re-writing the stamp in place. Re-creating a worktree
//! for that repair is the caller's job (§4.9's micro-worktree), not this
//! crate's.

use crate::error::ProjectorsError;
use lumenflow_core::{Wu, WuId, WuStatus};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampRecord {
    pub wu_id: String,
    pub completed_at_ms: u64,
}

pub fn stamp_path(wu_dir: &Path, id: &WuId) -> PathBuf {
    wu_dir.join(format!("{}.stamp.json", id.as_str()))
}

pub fn write_stamp(wu_dir: &Path, id: &WuId, completed_at_ms: u64) -> Result<(), ProjectorsError> {
    std::fs::create_dir_all(wu_dir).map_err(|e| ProjectorsError::Write { path: wu_dir.to_path_buf(), source: e })?;
    let path = stamp_path(wu_dir, id);
    let record = StampRecord { wu_id: id.as_str().to_string(), completed_at_ms };
    let json = serde_json::to_string_pretty(&record).unwrap_or_default();
    std::fs::write(&path, json).map_err(|e| ProjectorsError::Write { path, source: e })
}

pub fn read_stamp(wu_dir: &Path, id: &WuId) -> Result<Option<StampRecord>, ProjectorsError> {
    let path = stamp_path(wu_dir, id);
    match std::fs::read_to_string(&path) {
        Ok(contents) => {
            let record = serde_json::from_str(&contents)
                .map_err(|e| ProjectorsError::ParseJson { path: path.clone(), source: e })?;
            Ok(Some(record))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ProjectorsError::Read { path, source: e }),
    }
}

/// §4.2: a WU is an orphan if its YAML status is `done` but it has no
/// stamp file.
pub fn is_orphan(wu_dir: &Path, wu: &Wu) -> Result<bool, ProjectorsError> {
    Ok(wu.status == WuStatus::Done && read_stamp(wu_dir, &wu.id)?.is_none())
}

/// Repairs an orphaned WU by writing its missing stamp.
pub fn repair_orphan(wu_dir: &Path, wu: &Wu, completed_at_ms: u64) -> Result<(), ProjectorsError> {
    write_stamp(wu_dir, &wu.id, completed_at_ms)
}

#[cfg(test)]
#[path = "stamp_tests.rs"]
mod tests;
