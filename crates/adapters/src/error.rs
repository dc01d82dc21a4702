// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Umbrella error type for the adapters crate (§7) — most callers handle
//! the per-module error types (`GitError`, `SandboxError`, ...) directly;
//! this exists for call sites that need to propagate any of them through
//! one `?`.

use crate::control_plane::ControlPlaneError;
use crate::doc_generator::DocGeneratorError;
use crate::git::GitError;
use crate::sandbox::SandboxError;
use lumenflow_core::{ErrorKind, LumenError};

#[derive(Debug, thiserror::Error)]
pub enum AdaptersError {
    #[error(transparent)]
    Git(#[from] GitError),
    #[error(transparent)]
    Sandbox(#[from] SandboxError),
    #[error(transparent)]
    DocGenerator(#[from] DocGeneratorError),
    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),
}

impl LumenError for AdaptersError {
    fn kind(&self) -> ErrorKind {
        match self {
            AdaptersError::Git(_) => ErrorKind::External,
            AdaptersError::Sandbox(SandboxError::FailClosed { .. }) => ErrorKind::Policy,
            AdaptersError::Sandbox(SandboxError::Spawn(_)) => ErrorKind::Io,
            AdaptersError::DocGenerator(_) => ErrorKind::External,
            AdaptersError::ControlPlane(_) => ErrorKind::External,
        }
    }

    fn fix_hint(&self) -> Option<String> {
        match self {
            AdaptersError::Sandbox(SandboxError::FailClosed { reason }) => {
                Some(format!("install a sandbox backend ({reason}), or explicitly allow an unsandboxed fallback"))
            }
            AdaptersError::ControlPlane(ControlPlaneError::MissingToken { var }) => {
                Some(format!("set {var} in the environment, or remove control_plane from the workspace config"))
            }
            _ => None,
        }
    }
}
