// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

use super::*;
use async_trait::async_trait;
use lumenflow_adapters::git::fake::FakeGitAdapter;
use lumenflow_adapters::{DocGenerator, DocGeneratorError, NoopDocGenerator};

struct FixedDocGenerator(Vec<String>);

#[async_trait]
impl DocGenerator for FixedDocGenerator {
    async fn regenerate(&self, _repo_root: &Path) -> Result<Vec<String>, DocGeneratorError> {
        Ok(self.0.clone())
    }
}

#[test]
fn docs_need_regeneration_matches_prefix() {
    let changed = vec!["docs/src/module.md".to_string(), "src/lib.rs".to_string()];
    assert!(docs_need_regeneration(&changed, &["docs/".to_string()]));
    assert!(!docs_need_regeneration(&["src/lib.rs".to_string()], &["docs/".to_string()]));
}

#[tokio::test]
async fn regenerate_docs_stages_every_reported_output() {
    let git = FakeGitAdapter::new();
    let dir = tempfile::tempdir().unwrap();
    let generator = FixedDocGenerator(vec!["docs/api.md".to_string(), "docs/index.md".to_string()]);

    let outputs = regenerate_docs(&generator, &git, dir.path()).await.unwrap();

    assert_eq!(outputs.len(), 2);
    let calls = git.calls.lock().unwrap();
    assert!(calls.iter().any(|c| c == "raw:add docs/api.md"));
    assert!(calls.iter().any(|c| c == "raw:add docs/index.md"));
}

#[tokio::test]
async fn regenerate_docs_with_noop_generator_stages_nothing() {
    let git = FakeGitAdapter::new();
    let dir = tempfile::tempdir().unwrap();

    let outputs = regenerate_docs(&NoopDocGenerator, &git, dir.path()).await.unwrap();

    assert!(outputs.is_empty());
    assert!(git.calls.lock().unwrap().iter().all(|c| !c.starts_with("raw:add")));
}
