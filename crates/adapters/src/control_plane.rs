// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Control-plane sync adapter (§1 "control-plane HTTP sync... a narrow
//! interface and a best-effort implementation"; §6, §7).
//!
//! A push failure here is an `External` error (§7): it degrades to
//! "skipped, reason recorded" rather than blocking the WU transition that
//! triggered it.

use async_trait::async_trait;
use lumenflow_core::ControlPlaneConfig;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlPlaneError {
    #[error("control plane endpoint {endpoint} returned status {status}")]
    BadStatus { endpoint: String, status: u16 },
    #[error("control plane token env var {var} is not set")]
    MissingToken { var: String },
    #[error("control plane request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Sync event pushed to the control plane — kept deliberately generic
/// (a tag plus a JSON payload) so new event kinds don't require trait
/// changes here.
#[derive(Debug, Clone, Serialize)]
pub struct ControlPlaneEvent {
    pub kind: String,
    pub payload: serde_json::Value,
}

#[async_trait]
pub trait ControlPlaneAdapter: Send + Sync + 'static {
    /// Best-effort push; callers should treat `Err` as "skipped" and
    /// record the reason rather than failing the triggering operation.
    async fn push(&self, event: &ControlPlaneEvent) -> Result<(), ControlPlaneError>;
}

/// Bearer-token-authenticated HTTP push to `config.endpoint`. The token
/// is read from the environment variable named by `config.token_env_var`
/// at push time, not cached, so rotating it doesn't require a restart.
pub struct HttpControlPlaneAdapter {
    client: reqwest::Client,
    config: ControlPlaneConfig,
}

impl HttpControlPlaneAdapter {
    pub fn new(config: ControlPlaneConfig) -> Self {
        Self { client: reqwest::Client::new(), config }
    }
}

#[async_trait]
impl ControlPlaneAdapter for HttpControlPlaneAdapter {
    async fn push(&self, event: &ControlPlaneEvent) -> Result<(), ControlPlaneError> {
        let token = std::env::var(&self.config.token_env_var)
            .map_err(|_| ControlPlaneError::MissingToken { var: self.config.token_env_var.clone() })?;

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(token)
            .json(event)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ControlPlaneError::BadStatus {
                endpoint: self.config.endpoint.clone(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

/// No control plane configured; every push is a silent no-op success.
pub struct NoopControlPlaneAdapter;

#[async_trait]
impl ControlPlaneAdapter for NoopControlPlaneAdapter {
    async fn push(&self, _event: &ControlPlaneEvent) -> Result<(), ControlPlaneError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "control_plane_tests.rs"]
mod tests;
