// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

use super::*;
use lumenflow_core::Wu;

#[test]
fn save_then_load_round_trips_a_wu() {
    let dir = tempfile::tempdir().unwrap();
    let wu = Wu::builder("WU-1").title("Do the thing").build();
    save(dir.path(), &wu).unwrap();

    let loaded = load(&wu_path(dir.path(), &wu)).unwrap();
    assert_eq!(loaded.id, wu.id);
    assert_eq!(loaded.title, wu.title);
}

#[test]
fn load_all_on_a_missing_directory_returns_empty() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let wus = load_all(&missing).unwrap();
    assert!(wus.is_empty());
}

#[test]
fn load_all_skips_non_yaml_files_and_unparsable_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let wu = Wu::builder("WU-2").title("Valid").build();
    save(dir.path(), &wu).unwrap();
    std::fs::write(dir.path().join("README.md"), "not a wu").unwrap();
    std::fs::write(dir.path().join("broken.yaml"), "{ this is not: valid: yaml: [").unwrap();

    let wus = load_all(dir.path()).unwrap();
    assert_eq!(wus.len(), 1);
    assert_eq!(wus[0].id, wu.id);
}

#[test]
fn load_all_loads_multiple_wus() {
    let dir = tempfile::tempdir().unwrap();
    save(dir.path(), &Wu::builder("WU-1").build()).unwrap();
    save(dir.path(), &Wu::builder("WU-2").build()).unwrap();

    let mut wus = load_all(dir.path()).unwrap();
    wus.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
    assert_eq!(wus.len(), 2);
    assert_eq!(wus[0].id.as_str(), "WU-1");
    assert_eq!(wus[1].id.as_str(), "WU-2");
}
