//! Core [`RuleLoader`] struct: filesystem-backed scoring rule loading.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::schema::RuleEnvelope;
use crate::scoring_config::{CompiledScoringConfig, EngagementScoringRule, KIND};
use crate::validation::{fuzzy::fuzzy_match, validate_scoring_rule};

use super::error::{LoadResult, LoadStatus, Result, RuleError};

/// Filesystem-backed scoring rule loader.
///
/// Scans a directory (recursively) for `*.yml` / `*.yaml` files, deserializes
/// `EngagementScoring` documents via two-pass deserialization, validates them
/// and keeps them keyed by rule ID. Files of other kinds are skipped.
pub struct RuleLoader {
    /// Root directory containing rule YAML files.
    rules_dir: PathBuf,
    /// Loaded rules keyed by `metadata.id`.
    rules: HashMap<String, EngagementScoringRule>,
}

impl RuleLoader {
    pub fn new(rules_dir: PathBuf) -> Self {
        Self {
            rules_dir,
            rules: HashMap::new(),
        }
    }

    /// Recursively scan the rules directory and load all YAML files.
    ///
    /// Dotfiles and non-YAML files are skipped. Parse and validation errors
    /// are reported per-file but do not abort the scan.
    pub fn load_all(&mut self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        let root = self.rules_dir.clone();
        self.scan_dir_recursive(&root, &mut results)?;
        Ok(results)
    }

    fn scan_dir_recursive(&mut self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };

        // Sorted so duplicate ids resolve the same way on every platform.
        let mut paths = entries
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        paths.sort();

        for path in paths {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, results)?;
                continue;
            }

            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "yml" || e == "yaml")
                .unwrap_or(false);

            if !is_yaml {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            let status = match self.load_file(&path) {
                Ok(rule) => {
                    let rule_id = rule.metadata.id.clone();
                    info!(rule_id = %rule_id, path = %path.display(), "loaded scoring rule");
                    if self.rules.insert(rule_id.clone(), rule).is_some() {
                        warn!(rule_id = %rule_id, path = %path.display(), "duplicate rule id, later file wins");
                    }
                    LoadStatus::Loaded { rule_id }
                }
                Err(RuleError::UnsupportedKind {
                    kind,
                    suggestion: None,
                }) => {
                    debug!(kind = %kind, path = %path.display(), "skipping foreign rule kind");
                    LoadStatus::Skipped {
                        reason: format!("kind '{}' is not {}", kind, KIND),
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load rule file");
                    LoadStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.push(LoadResult { path, status });
        }

        Ok(())
    }

    /// Parse and validate a single YAML file.
    ///
    /// First pass: deserialize as [`RuleEnvelope`] to read the `kind` field.
    /// Second pass: deserialize into [`EngagementScoringRule`].
    pub fn load_file(&self, path: &Path) -> Result<EngagementScoringRule> {
        let contents = fs::read_to_string(path)?;
        parse_rule(&contents)
    }

    /// All loaded rules keyed by id.
    pub fn rules(&self) -> &HashMap<String, EngagementScoringRule> {
        &self.rules
    }

    /// The enabled rule with the lexicographically smallest id, compiled.
    pub fn active_config(&self) -> Option<CompiledScoringConfig> {
        let mut enabled: Vec<_> = self.rules.values().filter(|r| r.metadata.enabled).collect();
        enabled.sort_by(|a, b| a.metadata.id.cmp(&b.metadata.id));
        if enabled.len() > 1 {
            warn!(
                count = enabled.len(),
                chosen = %enabled[0].metadata.id,
                "multiple enabled scoring rules, using the first by id"
            );
        }
        enabled.first().map(|r| r.compile())
    }
}

/// Parse and validate one EngagementScoring document from YAML text.
pub(super) fn parse_rule(contents: &str) -> Result<EngagementScoringRule> {
    let envelope: RuleEnvelope = serde_yaml::from_str(contents)?;

    if envelope.metadata.id.is_empty() {
        return Err(RuleError::Validation(
            "rule metadata.id must not be empty".to_string(),
        ));
    }

    if envelope.kind != KIND {
        return Err(RuleError::UnsupportedKind {
            suggestion: fuzzy_match(&envelope.kind, &[KIND]).map(str::to_string),
            kind: envelope.kind,
        });
    }

    let rule: EngagementScoringRule = envelope.parse_full().map_err(|e| {
        RuleError::Validation(format!(
            "failed to parse rule '{}': {}",
            envelope.metadata.id, e
        ))
    })?;

    let report = validate_scoring_rule(&rule);
    for w in &report.warnings {
        warn!(rule_id = %rule.metadata.id, path = %w.path, "{}", w.message);
    }
    if !report.valid {
        return Err(RuleError::Validation(format!(
            "rule '{}': {}",
            rule.metadata.id,
            report.error_summary()
        )));
    }
    Ok(rule)
}

/// Load the scoring config from a single file or a rules directory.
///
/// A file must hold a valid EngagementScoring rule. A directory is scanned
/// with [`RuleLoader`] and its [`RuleLoader::active_config`] is returned.
pub fn load_scoring_config(path: &Path) -> Result<CompiledScoringConfig> {
    if path.is_dir() {
        let mut loader = RuleLoader::new(path.to_path_buf());
        loader.load_all()?;
        return loader
            .active_config()
            .ok_or_else(|| RuleError::NoActiveRule(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)?;
    let rule = parse_rule(&contents)?;
    if !rule.metadata.enabled {
        warn!(rule_id = %rule.metadata.id, "scoring rule is disabled but was named explicitly; using it");
    }
    info!(rule_id = %rule.metadata.id, path = %path.display(), "scoring config loaded");
    Ok(rule.compile())
}
