//! Error types and load result structures for the rule loader.

use std::path::PathBuf;

/// Errors that can occur during rule loading.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Rule validation error (bad weights, misordered bands, empty id).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The file is a rule document of a kind this loader does not handle.
    #[error("unsupported rule kind '{kind}'{}", suggestion_hint(.suggestion))]
    UnsupportedKind {
        kind: String,
        suggestion: Option<String>,
    },

    /// A directory was scanned but held no enabled scoring rule.
    #[error("no enabled EngagementScoring rule found in {0}")]
    NoActiveRule(PathBuf),
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!(" (did you mean '{}'?)", s))
        .unwrap_or_default()
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;

/// Outcome of loading a single rule file.
#[derive(Debug)]
pub struct LoadResult {
    /// Path to the file that was loaded.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug)]
pub enum LoadStatus {
    /// Rule was successfully loaded.
    Loaded { rule_id: String },
    /// File was skipped (dotfile, non-YAML, foreign kind).
    Skipped { reason: String },
    /// Parse or validation error occurred.
    Failed { error: String },
}
