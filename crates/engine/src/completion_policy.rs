// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Completion policy engine (§4.8): an ordered pipeline of named checks
//! run before a `complete` event is written. The engine never writes
//! events itself — it only accepts or rejects the transition.

use crate::error::EngineError;
use lumenflow_core::{BriefPolicyMode, Delegation, Exposure, Wu};

/// Filesystem existence check, supplied by the caller so this crate
/// doesn't depend on a worktree implementation directly.
pub trait FileProbe {
    fn exists(&self, path: &str) -> bool;
}

/// Structural/reality checks against the YAML and the git diff (§4.8 rule
/// 6), e.g. package manifest bin-entry parity or CLI registration-surface
/// parity. Left as a caller-supplied collaborator since the specific
/// checks are project-dependent; a failing check returns its message.
pub trait RulesEngine {
    fn check(&self, wu: &Wu) -> Vec<String>;
}

pub struct NoopRulesEngine;

impl RulesEngine for NoopRulesEngine {
    fn check(&self, _wu: &Wu) -> Vec<String> {
        Vec::new()
    }
}

/// Extensions classified as source code for the automated-test
/// requirement (§4.8 rule 5) — anything else (config, data, docs) is
/// exempt regardless of type.
const SOURCE_EXTENSIONS: &[&str] = &["rs", "ts", "tsx", "js", "jsx", "py", "go", "java", "rb", "c", "cpp", "h"];

/// Filenames treated as configuration even though their extension might
/// otherwise look like source (§4.8 rule 5 "not a config file").
const CONFIG_FILENAMES: &[&str] =
    &["package.json", "tsconfig.json", "Cargo.toml", ".eslintrc.js", "webpack.config.js"];

fn is_markdown(path: &str) -> bool {
    path.ends_with(".md")
}

fn is_under_docs_prefix(path: &str, docs_prefixes: &[String]) -> bool {
    docs_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
}

fn is_source_file(path: &str) -> bool {
    let filename = path.rsplit('/').next().unwrap_or(path);
    if CONFIG_FILENAMES.contains(&filename) {
        return false;
    }
    match path.rsplit('.').next() {
        Some(ext) => SOURCE_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Evidence and collaborators a single `complete` attempt needs to run
/// the full rule pipeline. Bundled into one struct since every rule after
/// the first two reads from mostly-overlapping fields.
pub struct PolicyContext<'a> {
    pub wu: &'a Wu,
    pub docs_prefixes: &'a [String],
    pub brief_policy_mode: BriefPolicyMode,
    pub has_brief_evidence: bool,
    pub accessibility_demonstrated: bool,
    /// Present only for initiative-governed WUs (§4.8 rule 8); its
    /// `has_pickup()` gates the pickup-evidence half of that rule.
    pub delegation: Option<&'a Delegation>,
    pub force_brief_evidence: bool,
    pub force_spawn_provenance: bool,
}

pub struct CompletionPolicyEngine<'a> {
    files: &'a dyn FileProbe,
    rules: &'a dyn RulesEngine,
}

impl<'a> CompletionPolicyEngine<'a> {
    pub fn new(files: &'a dyn FileProbe, rules: &'a dyn RulesEngine) -> Self {
        Self { files, rules }
    }

    fn rejection(rule: &'static str, message: impl Into<String>, fix_hint: impl Into<String>) -> EngineError {
        EngineError::PolicyRejected { rule, message: message.into(), fix_hint: fix_hint.into() }
    }

    /// Runs all eight rules in order (§4.8), short-circuiting on the
    /// first failure.
    pub fn evaluate(&self, ctx: &PolicyContext<'_>) -> Result<(), EngineError> {
        self.check_exposure_accessibility(ctx)?;
        self.check_docs_only(ctx)?;
        self.check_code_paths_exist(ctx)?;
        self.check_test_paths_exist(ctx)?;
        self.check_automated_test_requirement(ctx)?;
        self.check_rules_engine(ctx)?;
        self.check_brief_evidence(ctx)?;
        self.check_spawn_provenance(ctx)?;
        Ok(())
    }

    fn check_exposure_accessibility(&self, ctx: &PolicyContext<'_>) -> Result<(), EngineError> {
        if matches!(ctx.wu.exposure, Some(Exposure::Ui)) && !ctx.accessibility_demonstrated {
            return Err(Self::rejection(
                "exposure_accessibility",
                "UI-exposed WU has no recorded accessibility evidence",
                "attach accessibility test evidence or a checkpoint note demonstrating it before completing",
            ));
        }
        Ok(())
    }

    fn check_docs_only(&self, ctx: &PolicyContext<'_>) -> Result<(), EngineError> {
        if !ctx.wu.docs_only {
            return Ok(());
        }
        let exposure_or_type_is_docs =
            matches!(ctx.wu.exposure, Some(Exposure::Documentation)) || ctx.wu.wu_type.to_string() == "documentation";
        let all_paths_are_docs = ctx
            .wu
            .code_paths
            .iter()
            .all(|p| is_markdown(p) || is_under_docs_prefix(p, ctx.docs_prefixes));
        if !exposure_or_type_is_docs && !all_paths_are_docs {
            return Err(Self::rejection(
                "docs_only_validation",
                "docs_only is set but code_paths include non-documentation files",
                "clear docs_only, or move the flagged paths under a configured docs prefix",
            ));
        }
        Ok(())
    }

    fn check_code_paths_exist(&self, ctx: &PolicyContext<'_>) -> Result<(), EngineError> {
        for path in &ctx.wu.code_paths {
            if !self.files.exists(path) {
                return Err(Self::rejection(
                    "code_path_existence",
                    format!("code path `{path}` does not exist"),
                    format!("create `{path}` or remove it from code_paths"),
                ));
            }
        }
        Ok(())
    }

    fn check_test_paths_exist(&self, ctx: &PolicyContext<'_>) -> Result<(), EngineError> {
        for path in ctx.wu.tests.file_paths() {
            if !self.files.exists(path) {
                return Err(Self::rejection(
                    "test_path_existence",
                    format!("test path `{path}` does not exist"),
                    format!("create `{path}` or remove it from tests"),
                ));
            }
        }
        Ok(())
    }

    fn check_automated_test_requirement(&self, ctx: &PolicyContext<'_>) -> Result<(), EngineError> {
        if ctx.wu.wu_type.to_string() == "documentation" {
            return Ok(());
        }
        let has_source_path = ctx.wu.code_paths.iter().any(|p| is_source_file(p));
        if has_source_path && !ctx.wu.tests.has_automated() {
            return Err(Self::rejection(
                "automated_test_requirement",
                "code_paths include source files but no automated test is recorded",
                "add at least one of tests.unit, tests.e2e, or tests.integration",
            ));
        }
        Ok(())
    }

    fn check_rules_engine(&self, ctx: &PolicyContext<'_>) -> Result<(), EngineError> {
        let violations = self.rules.check(ctx.wu);
        if let Some(first) = violations.first() {
            return Err(Self::rejection(
                "rules_engine",
                first.clone(),
                "reconcile the WU's declared surfaces with the actual diff",
            ));
        }
        Ok(())
    }

    fn check_brief_evidence(&self, ctx: &PolicyContext<'_>) -> Result<(), EngineError> {
        if ctx.brief_policy_mode != BriefPolicyMode::Required {
            return Ok(());
        }
        if ctx.has_brief_evidence || ctx.force_brief_evidence {
            return Ok(());
        }
        Err(Self::rejection(
            "brief_evidence",
            "brief policy is `required` but no brief_evidence event is recorded",
            "record brief_evidence before completing, or force with an auditable override",
        ))
    }

    fn check_spawn_provenance(&self, ctx: &PolicyContext<'_>) -> Result<(), EngineError> {
        if ctx.wu.initiative.is_none() || ctx.force_spawn_provenance {
            return Ok(());
        }
        match ctx.delegation {
            Some(d) if d.has_pickup() => Ok(()),
            Some(_) => Err(Self::rejection(
                "spawn_provenance",
                "a delegation targets this WU but has no recorded pickup",
                "record a pickup event before completing, or force with an auditable override",
            )),
            None => Err(Self::rejection(
                "spawn_provenance",
                "initiative-governed WU has no delegation record targeting it",
                "create a delegation record before completing, or force with an auditable override",
            )),
        }
    }

    /// Rules among 7/8 whose failure `ctx`'s force flags actually papered
    /// over (§4.8 "`force` records an override via a signal"). Call after
    /// `evaluate` succeeds — the caller needs this to publish an auditable
    /// bypass signal; a force flag that was set but never needed (the
    /// underlying check would have passed anyway) bypasses nothing.
    pub fn bypassed_rules(&self, ctx: &PolicyContext<'_>) -> Vec<&'static str> {
        let mut bypassed = Vec::new();
        if ctx.force_brief_evidence
            && ctx.brief_policy_mode == BriefPolicyMode::Required
            && !ctx.has_brief_evidence
        {
            bypassed.push("brief_evidence");
        }
        if ctx.force_spawn_provenance && ctx.wu.initiative.is_some() {
            let would_have_failed = match ctx.delegation {
                Some(d) => !d.has_pickup(),
                None => true,
            };
            if would_have_failed {
                bypassed.push("spawn_provenance");
            }
        }
        bypassed
    }
}

#[cfg(test)]
#[path = "completion_policy_tests.rs"]
mod tests;
