// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Docs regeneration (§4.9 step 5): when doc-source files changed,
//! invoke the external `DocGenerator`, stage its outputs, and reconcile
//! once more if the rebase touched the same generated files.

use crate::error::WorktreeError;
use lumenflow_adapters::{DocGenerator, GitAdapter};
use std::path::Path;

/// Returns true if any of `changed_paths` falls under one of
/// `doc_source_globs` (plain prefix match; the kernel resolves actual
/// globbing before calling in).
pub fn docs_need_regeneration(changed_paths: &[String], doc_source_prefixes: &[String]) -> bool {
    changed_paths.iter().any(|p| doc_source_prefixes.iter().any(|prefix| p.starts_with(prefix)))
}

/// Runs the configured `DocGenerator` and stages every file it reports
/// as regenerated.
pub async fn regenerate_docs(
    generator: &dyn DocGenerator,
    git: &dyn GitAdapter,
    repo: &Path,
) -> Result<Vec<String>, WorktreeError> {
    let outputs = generator.regenerate(repo).await?;
    for path in &outputs {
        git.raw(repo, &["add", path]).await?;
    }
    Ok(outputs)
}

#[cfg(test)]
#[path = "docs_tests.rs"]
mod tests;
