// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Generic append-only JSONL log (§4.1, §6).
//!
//! Every on-disk store in this crate (the event log, delegation registry,
//! memory/relationship logs, signal bus) is an instance of this shape:
//! one JSON object per line, UTF-8, LF-terminated, appended under a
//! workspace write mutex with an `fsync` after each write, and replayed by
//! reading the whole file. A missing file reads as empty, never an error
//! (§4.1). A malformed line halts the read with the offending line number
//! rather than silently skipping it (§3 invariants, §7 `Parse`).

use lumenflow_core::RecordLocation;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AppendLogError {
    #[error("malformed line at {location}: {message}")]
    Parse { location: RecordLocation, message: String },
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

/// An append-only JSONL file of `T`, with a cooperative write mutex for the
/// within-process serialization §5 describes ("Writers serialize on a
/// workspace mutex; concurrent readers allowed").
pub struct AppendLog<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _marker: std::marker::PhantomData<T>,
}

impl<T> AppendLog<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()), _marker: std::marker::PhantomData }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, atomically (single `write` syscall of one
    /// LF-terminated line) and durably (`fsync` before returning).
    pub fn append(&self, record: &T) -> Result<(), AppendLogError> {
        let _guard = self.write_lock.lock();
        let mut line = serde_json::to_string(record)
            .map_err(|e| AppendLogError::Parse {
                location: RecordLocation { file: self.path.display().to_string(), line: 0 },
                message: e.to_string(),
            })?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppendLogError::Io { path: self.path.clone(), source: e })?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AppendLogError::Io { path: self.path.clone(), source: e })?;
        file.write_all(line.as_bytes())
            .map_err(|e| AppendLogError::Io { path: self.path.clone(), source: e })?;
        file.sync_all().map_err(|e| AppendLogError::Io { path: self.path.clone(), source: e })?;
        Ok(())
    }

    /// Read every record in append order. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<T>, AppendLogError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppendLogError::Io { path: self.path.clone(), source: e }),
        };
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| AppendLogError::Io { path: self.path.clone(), source: e })?;
            if line.trim().is_empty() {
                continue;
            }
            let record: T = serde_json::from_str(&line).map_err(|e| AppendLogError::Parse {
                location: RecordLocation { file: self.path.display().to_string(), line: idx + 1 },
                message: e.to_string(),
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Number of non-blank lines currently in the log, used by the
    /// snapshot/checkpoint fast path to detect truncation.
    pub fn line_count(&self) -> Result<usize, AppendLogError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(AppendLogError::Io { path: self.path.clone(), source: e }),
        };
        let reader = BufReader::new(file);
        Ok(reader.lines().filter(|l| l.as_ref().map(|s| !s.trim().is_empty()).unwrap_or(true)).count())
    }
}

#[cfg(test)]
#[path = "append_log_tests.rs"]
mod tests;
