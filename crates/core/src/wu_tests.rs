// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

use super::*;

#[test]
fn wu_id_parses_valid_form() {
    assert_eq!(WuId::parse("WU-100").unwrap().as_str(), "WU-100");
}

#[test]
fn wu_id_rejects_missing_prefix() {
    assert!(WuId::parse("100").is_err());
}

#[test]
fn wu_id_rejects_non_digit_suffix() {
    assert!(WuId::parse("WU-10a").is_err());
}

#[test]
fn wu_id_rejects_empty_suffix() {
    assert!(WuId::parse("WU-").is_err());
}

#[test]
fn lane_splits_parent_sub_form() {
    let lane = Lane::new("Backend: Auth");
    assert_eq!(lane.parent_sub(), ("Backend", Some("Auth")));
    assert_eq!(lane.parent(), "Backend");
}

#[test]
fn lane_without_sub_has_no_split() {
    let lane = Lane::new("Backend");
    assert_eq!(lane.parent_sub(), ("Backend", None));
    assert_eq!(lane.parent(), "Backend");
}

#[test]
fn test_refs_has_automated_detects_any_nonempty_group() {
    let mut refs = TestRefs::default();
    assert!(!refs.has_automated());
    refs.e2e.push("tests/e2e/a.rs".into());
    assert!(refs.has_automated());
}

#[test]
fn test_refs_file_paths_excludes_manual() {
    let refs = TestRefs {
        unit: vec!["a.rs".into()],
        manual: vec!["click the button".into()],
        ..Default::default()
    };
    let paths: Vec<&str> = refs.file_paths().collect();
    assert_eq!(paths, vec!["a.rs"]);
}

#[test]
fn wu_builder_produces_sane_defaults() {
    let wu = Wu::builder("WU-1").title("demo").build();
    assert_eq!(wu.title, "demo");
    assert_eq!(wu.status, WuStatus::Ready);
}
