// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

use super::*;
use lumenflow_adapters::git::fake::FakeGitAdapter;

#[test]
fn find_stray_artifacts_flags_other_wus_stamp_and_yaml_files() {
    let changed = vec![
        "wu/WU-1.stamp.json".to_string(),
        "wu/WU-2.yaml".to_string(),
        "wu/WU-9.yaml".to_string(),
        "src/lib.rs".to_string(),
    ];

    let strays = find_stray_artifacts(&changed, "wu", "WU-9");

    assert_eq!(strays.len(), 2);
    assert!(strays.contains(&StrayArtifact { path: "wu/WU-1.stamp.json".to_string(), wu_id: "WU-1".to_string() }));
    assert!(strays.contains(&StrayArtifact { path: "wu/WU-2.yaml".to_string(), wu_id: "WU-2".to_string() }));
}

#[test]
fn find_stray_artifacts_ignores_own_wu_and_unrelated_paths() {
    let changed = vec!["wu/WU-9.yaml".to_string(), "docs/README.md".to_string()];
    let strays = find_stray_artifacts(&changed, "wu", "WU-9");
    assert!(strays.is_empty());
}

#[tokio::test]
async fn clean_stray_artifacts_restores_from_base_and_stages() {
    let git = FakeGitAdapter::new();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("WU-1.stamp.json"), "stray contents").unwrap();
    git.set_show_at_ref("origin/main", "WU-1.stamp.json", "original contents");

    let strays = vec![StrayArtifact { path: "WU-1.stamp.json".to_string(), wu_id: "WU-1".to_string() }];
    clean_stray_artifacts(&git, dir.path(), "origin/main", &strays).await.unwrap();

    let restored = std::fs::read_to_string(dir.path().join("WU-1.stamp.json")).unwrap();
    assert_eq!(restored, "original contents");
    assert!(git.calls.lock().unwrap().iter().any(|c| c == "raw:add WU-1.stamp.json"));
}

#[tokio::test]
async fn clean_stray_artifacts_deletes_when_absent_on_base() {
    let git = FakeGitAdapter::new();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("WU-2.yaml"), "stray contents").unwrap();
    git.set_show_at_ref_missing("origin/main", "WU-2.yaml");

    let strays = vec![StrayArtifact { path: "WU-2.yaml".to_string(), wu_id: "WU-2".to_string() }];
    clean_stray_artifacts(&git, dir.path(), "origin/main", &strays).await.unwrap();

    assert!(!dir.path().join("WU-2.yaml").exists());
}
