//! Tests for the rule loader module.

use std::fs;

use tempfile::TempDir;

use super::core::parse_rule;
use super::*;
use crate::scoring_config::EngagementScoringSpec;

const VALID_RULE_YAML: &str = r#"
apiVersion: v1
kind: EngagementScoring
metadata:
  id: tuned-scoring
  name: Tuned Scoring
  enabled: true
spec:
  composite:
    good: 80.0
"#;

fn temp_loader() -> (TempDir, RuleLoader) {
    let dir = TempDir::new().expect("create tempdir");
    let loader = RuleLoader::new(dir.path().to_path_buf());
    (dir, loader)
}

#[test]
fn load_rule_from_file() {
    let (dir, loader) = temp_loader();
    let rule_path = dir.path().join("tuned.yml");
    fs::write(&rule_path, VALID_RULE_YAML).unwrap();

    let rule = loader.load_file(&rule_path).unwrap();
    assert_eq!(rule.metadata.id, "tuned-scoring");
    assert_eq!(rule.spec.composite.good, 80.0);
}

#[test]
fn load_all_skips_dotfiles_and_non_yaml() {
    let (dir, mut loader) = temp_loader();
    fs::write(dir.path().join("rule1.yml"), VALID_RULE_YAML).unwrap();
    fs::write(dir.path().join(".hidden.yml"), VALID_RULE_YAML).unwrap();
    fs::write(dir.path().join("readme.txt"), "not a rule").unwrap();

    let results = loader.load_all().unwrap();

    let loaded = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Loaded { .. }))
        .count();
    let skipped = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Skipped { .. }))
        .count();
    assert_eq!(loaded, 1);
    assert_eq!(skipped, 2);
    assert!(loader.rules().contains_key("tuned-scoring"));
}

#[test]
fn load_all_recurses_into_subdirectories() {
    let (dir, mut loader) = temp_loader();
    let nested = dir.path().join("scoring");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("rule.yaml"), VALID_RULE_YAML).unwrap();

    loader.load_all().unwrap();
    assert_eq!(loader.rules().len(), 1);
}

#[test]
fn foreign_kind_is_skipped_not_failed() {
    let (dir, mut loader) = temp_loader();
    fs::write(
        dir.path().join("trend.yml"),
        "apiVersion: v1\nkind: TrendConfig\nmetadata:\n  id: trend\n  name: Trend\nspec: {}\n",
    )
    .unwrap();

    let results = loader.load_all().unwrap();
    assert!(matches!(results[0].status, LoadStatus::Skipped { .. }));
    assert!(loader.rules().is_empty());
}

#[test]
fn misspelled_kind_fails_with_suggestion() {
    let err = parse_rule(
        "apiVersion: v1\nkind: EngagementScorng\nmetadata:\n  id: typo\n  name: Typo\n",
    )
    .unwrap_err();
    match err {
        RuleError::UnsupportedKind { suggestion, .. } => {
            assert_eq!(suggestion.as_deref(), Some("EngagementScoring"));
        }
        other => panic!("expected UnsupportedKind, got {other:?}"),
    }
}

#[test]
fn invalid_weights_fail_validation() {
    let yaml = r#"
apiVersion: v1
kind: EngagementScoring
metadata:
  id: heavy-reads
  name: Heavy Reads
spec:
  weights:
    read_count: 0.9
"#;
    let err = parse_rule(yaml).unwrap_err();
    assert!(matches!(err, RuleError::Validation(ref m) if m.contains("spec.weights")));
}

#[test]
fn empty_id_rejected() {
    let err = parse_rule("apiVersion: v1\nkind: EngagementScoring\nmetadata:\n  id: \"\"\n  name: X\n")
        .unwrap_err();
    assert!(matches!(err, RuleError::Validation(_)));
}

#[test]
fn malformed_yaml_reports_failure() {
    let (dir, mut loader) = temp_loader();
    fs::write(dir.path().join("broken.yml"), "apiVersion: [unterminated").unwrap();

    let results = loader.load_all().unwrap();
    assert!(matches!(results[0].status, LoadStatus::Failed { .. }));
}

#[test]
fn active_config_ignores_disabled_and_picks_first_id() {
    let (dir, mut loader) = temp_loader();
    fs::write(
        dir.path().join("a.yml"),
        VALID_RULE_YAML
            .replace("tuned-scoring", "a-disabled")
            .replace("enabled: true", "enabled: false"),
    )
    .unwrap();
    fs::write(
        dir.path().join("b.yml"),
        VALID_RULE_YAML.replace("tuned-scoring", "b-scoring"),
    )
    .unwrap();
    fs::write(
        dir.path().join("c.yml"),
        VALID_RULE_YAML
            .replace("tuned-scoring", "c-scoring")
            .replace("good: 80.0", "good: 90.0"),
    )
    .unwrap();

    loader.load_all().unwrap();
    assert_eq!(loader.rules().len(), 3);
    let active = loader.active_config().unwrap();
    assert_eq!(active.composite.good, 80.0);
}

#[test]
fn load_scoring_config_from_file_and_dir() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("scoring.yml");
    fs::write(&file, VALID_RULE_YAML).unwrap();

    let from_file = load_scoring_config(&file).unwrap();
    let from_dir = load_scoring_config(dir.path()).unwrap();
    assert_eq!(from_file, from_dir);
    assert_ne!(from_file, EngagementScoringSpec::default());
}

#[test]
fn empty_dir_has_no_active_rule() {
    let dir = TempDir::new().unwrap();
    let err = load_scoring_config(dir.path()).unwrap_err();
    assert!(matches!(err, RuleError::NoActiveRule(_)));
}

#[test]
fn shipped_rules_dir_loads() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/rules");
    let config = load_scoring_config(&dir).unwrap();
    assert_eq!(config, EngagementScoringSpec::default());
}
