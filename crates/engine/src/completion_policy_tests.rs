// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

use super::*;
use lumenflow_core::{
    Delegation, DelegationId, DelegationIntent, DelegationStatus, Exposure, Lane, TestRefs, Wu, WuId, WuType,
};
use std::collections::HashSet;

struct FakeFiles(HashSet<&'static str>);

impl FileProbe for FakeFiles {
    fn exists(&self, path: &str) -> bool {
        self.0.contains(path)
    }
}

fn ctx<'a>(wu: &'a Wu, docs_prefixes: &'a [String]) -> PolicyContext<'a> {
    PolicyContext {
        wu,
        docs_prefixes,
        brief_policy_mode: BriefPolicyMode::Off,
        has_brief_evidence: false,
        accessibility_demonstrated: false,
        delegation: None,
        force_brief_evidence: false,
        force_spawn_provenance: false,
    }
}

fn delegation(target: &str, picked_up: bool) -> Delegation {
    Delegation {
        id: DelegationId::generate(&WuId::new_unchecked("WU-parent"), &WuId::new_unchecked(target), 100),
        parent_wu_id: WuId::new_unchecked("WU-parent"),
        target_wu_id: WuId::new_unchecked(target),
        lane: Lane::new("build"),
        intent: DelegationIntent::Delegation,
        status: DelegationStatus::Pending,
        delegated_at_ms: 100,
        completed_at_ms: None,
        picked_up_at_ms: picked_up.then_some(150),
        picked_up_by: picked_up.then(|| "agent-a".to_string()),
    }
}

#[test]
fn ui_exposure_without_accessibility_evidence_is_rejected() {
    let wu = Wu::builder("WU-1").exposure(Exposure::Ui).build();
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles(HashSet::new()), &NoopRulesEngine);
    let err = engine.evaluate(&ctx(&wu, &docs)).unwrap_err();
    assert!(matches!(err, EngineError::PolicyRejected { rule: "exposure_accessibility", .. }));
}

#[test]
fn ui_exposure_with_accessibility_evidence_passes_that_rule() {
    let wu = Wu::builder("WU-1").exposure(Exposure::Ui).build();
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles(HashSet::new()), &NoopRulesEngine);
    let mut c = ctx(&wu, &docs);
    c.accessibility_demonstrated = true;
    assert!(engine.evaluate(&c).is_ok());
}

#[test]
fn docs_only_flagged_with_non_doc_code_paths_is_rejected() {
    let wu = Wu::builder("WU-1").docs_only(true).code_paths(vec!["src/lib.rs".to_string()]).build();
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles([("src/lib.rs")].into_iter().collect()), &NoopRulesEngine);
    let err = engine.evaluate(&ctx(&wu, &docs)).unwrap_err();
    assert!(matches!(err, EngineError::PolicyRejected { rule: "docs_only_validation", .. }));
}

#[test]
fn docs_only_flagged_with_markdown_paths_passes() {
    let wu = Wu::builder("WU-1").docs_only(true).code_paths(vec!["docs/guide.md".to_string()]).build();
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles([("docs/guide.md")].into_iter().collect()), &NoopRulesEngine);
    assert!(engine.evaluate(&ctx(&wu, &docs)).is_ok());
}

#[test]
fn missing_code_path_is_rejected() {
    let wu = Wu::builder("WU-1").code_paths(vec!["src/missing.rs".to_string()]).unit_tests(vec!["tests/a.rs".to_string()]).build();
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles([("tests/a.rs")].into_iter().collect()), &NoopRulesEngine);
    let err = engine.evaluate(&ctx(&wu, &docs)).unwrap_err();
    assert!(matches!(err, EngineError::PolicyRejected { rule: "code_path_existence", .. }));
}

#[test]
fn missing_test_path_is_rejected() {
    let wu = Wu::builder("WU-1").code_paths(vec!["src/lib.rs".to_string()]).unit_tests(vec!["tests/missing.rs".to_string()]).build();
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles([("src/lib.rs")].into_iter().collect()), &NoopRulesEngine);
    let err = engine.evaluate(&ctx(&wu, &docs)).unwrap_err();
    assert!(matches!(err, EngineError::PolicyRejected { rule: "test_path_existence", .. }));
}

#[test]
fn source_code_path_without_automated_test_is_rejected() {
    let wu = Wu::builder("WU-1").code_paths(vec!["src/lib.rs".to_string()]).build();
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles([("src/lib.rs")].into_iter().collect()), &NoopRulesEngine);
    let err = engine.evaluate(&ctx(&wu, &docs)).unwrap_err();
    assert!(matches!(err, EngineError::PolicyRejected { rule: "automated_test_requirement", .. }));
}

#[test]
fn documentation_type_wu_is_exempt_from_automated_test_requirement() {
    let wu = Wu::builder("WU-1").wu_type(WuType::Documentation).code_paths(vec!["docs/a.md".to_string()]).build();
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles([("docs/a.md")].into_iter().collect()), &NoopRulesEngine);
    assert!(engine.evaluate(&ctx(&wu, &docs)).is_ok());
}

#[test]
fn config_file_path_does_not_trigger_automated_test_requirement() {
    let wu = Wu::builder("WU-1").code_paths(vec!["Cargo.toml".to_string()]).build();
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles([("Cargo.toml")].into_iter().collect()), &NoopRulesEngine);
    assert!(engine.evaluate(&ctx(&wu, &docs)).is_ok());
}

struct FailingRules;

impl RulesEngine for FailingRules {
    fn check(&self, _wu: &Wu) -> Vec<String> {
        vec!["bin entry missing from package.json".to_string()]
    }
}

#[test]
fn rules_engine_failure_is_surfaced_with_its_message() {
    let wu = Wu::builder("WU-1").build();
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles(HashSet::new()), &FailingRules);
    let err = engine.evaluate(&ctx(&wu, &docs)).unwrap_err();
    match err {
        EngineError::PolicyRejected { rule: "rules_engine", message, .. } => {
            assert_eq!(message, "bin entry missing from package.json");
        }
        other => panic!("expected rules_engine rejection, got {other:?}"),
    }
}

#[test]
fn required_brief_policy_without_evidence_is_rejected() {
    let wu = Wu::builder("WU-1").build();
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles(HashSet::new()), &NoopRulesEngine);
    let mut c = ctx(&wu, &docs);
    c.brief_policy_mode = BriefPolicyMode::Required;
    let err = engine.evaluate(&c).unwrap_err();
    assert!(matches!(err, EngineError::PolicyRejected { rule: "brief_evidence", .. }));
}

#[test]
fn required_brief_policy_with_force_override_passes() {
    let wu = Wu::builder("WU-1").build();
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles(HashSet::new()), &NoopRulesEngine);
    let mut c = ctx(&wu, &docs);
    c.brief_policy_mode = BriefPolicyMode::Required;
    c.force_brief_evidence = true;
    assert!(engine.evaluate(&c).is_ok());
}

#[test]
fn initiative_governed_wu_without_delegation_is_rejected() {
    let mut wu = Wu::builder("WU-1").build();
    wu.initiative = Some("INIT-1".to_string());
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles(HashSet::new()), &NoopRulesEngine);
    let err = engine.evaluate(&ctx(&wu, &docs)).unwrap_err();
    assert!(matches!(err, EngineError::PolicyRejected { rule: "spawn_provenance", .. }));
}

#[test]
fn initiative_governed_wu_with_delegation_but_no_pickup_is_rejected() {
    let mut wu = Wu::builder("WU-1").build();
    wu.initiative = Some("INIT-1".to_string());
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles(HashSet::new()), &NoopRulesEngine);
    let d = delegation("WU-1", false);
    let mut c = ctx(&wu, &docs);
    c.delegation = Some(&d);
    let err = engine.evaluate(&c).unwrap_err();
    assert!(matches!(err, EngineError::PolicyRejected { rule: "spawn_provenance", .. }));
}

#[test]
fn initiative_governed_wu_with_picked_up_delegation_passes() {
    let mut wu = Wu::builder("WU-1").build();
    wu.initiative = Some("INIT-1".to_string());
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles(HashSet::new()), &NoopRulesEngine);
    let d = delegation("WU-1", true);
    let mut c = ctx(&wu, &docs);
    c.delegation = Some(&d);
    assert!(engine.evaluate(&c).is_ok());
}

#[test]
fn bypassed_rules_reports_brief_evidence_only_when_the_force_flag_mattered() {
    let wu = Wu::builder("WU-1").build();
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles(HashSet::new()), &NoopRulesEngine);

    let mut c = ctx(&wu, &docs);
    c.brief_policy_mode = BriefPolicyMode::Required;
    c.force_brief_evidence = true;
    assert_eq!(engine.bypassed_rules(&c), vec!["brief_evidence"]);

    c.has_brief_evidence = true;
    assert!(engine.bypassed_rules(&c).is_empty(), "evidence was present, force flag bypassed nothing");
}

#[test]
fn bypassed_rules_reports_spawn_provenance_only_when_the_force_flag_mattered() {
    let mut wu = Wu::builder("WU-1").build();
    wu.initiative = Some("INIT-1".to_string());
    let docs: Vec<String> = Vec::new();
    let engine = CompletionPolicyEngine::new(&FakeFiles(HashSet::new()), &NoopRulesEngine);

    let mut c = ctx(&wu, &docs);
    c.force_spawn_provenance = true;
    assert_eq!(engine.bypassed_rules(&c), vec!["spawn_provenance"]);

    let d = delegation("WU-1", true);
    c.delegation = Some(&d);
    assert!(engine.bypassed_rules(&c).is_empty(), "pickup was already recorded, force flag bypassed nothing");
}
