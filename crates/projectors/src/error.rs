// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Projector errors (§7).

use lumenflow_core::{ErrorKind, LumenError};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProjectorsError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, #[source] source: std::io::Error },

    #[error("failed to parse YAML at {path}: {source}")]
    ParseYaml { path: PathBuf, #[source] source: serde_yaml::Error },

    #[error("failed to parse JSON at {path}: {source}")]
    ParseJson { path: PathBuf, #[source] source: serde_json::Error },

    #[error("item {id} not found in heading {heading:?}")]
    ItemNotFound { id: String, heading: String },

    #[error("heading {heading:?} is not declared in the board's front matter")]
    UnknownHeading { heading: String },
}

impl LumenError for ProjectorsError {
    fn kind(&self) -> ErrorKind {
        match self {
            ProjectorsError::Read { .. } | ProjectorsError::Write { .. } => ErrorKind::Io,
            ProjectorsError::ParseYaml { .. } | ProjectorsError::ParseJson { .. } => ErrorKind::Parse,
            ProjectorsError::ItemNotFound { .. } | ProjectorsError::UnknownHeading { .. } => ErrorKind::Validation,
        }
    }

    fn fix_hint(&self) -> Option<String> {
        match self {
            ProjectorsError::UnknownHeading { heading } => {
                Some(format!("add `{heading}` to the board's front matter headings, or pass create_missing_heading"))
            }
            _ => None,
        }
    }
}
