//! YAML scoring configuration for the engagement anomaly engine.
//!
//! This crate provides:
//! - The `EngagementScoring` rule kind with every tuned constant as a serde default
//! - Two-pass envelope parsing shared by all rule files
//! - Validation with fuzzy "did you mean" suggestions
//! - A filesystem loader that picks the active scoring config

pub mod loader;
pub mod schema;
pub mod scoring_config;
pub mod validation;

pub use loader::{load_scoring_config, RuleError, RuleLoader};
pub use scoring_config::{CompiledScoringConfig, EngagementScoringRule, EngagementScoringSpec};
