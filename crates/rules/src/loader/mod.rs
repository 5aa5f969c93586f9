//! Filesystem loader for scoring rule files.
//!
//! Reads `*.yml` / `*.yaml` files via two-pass deserialization
//! (RuleEnvelope -> EngagementScoringRule), validates them, and keeps the
//! loaded rules keyed by `metadata.id`.

mod core;
mod error;

#[cfg(test)]
mod tests;

pub use self::core::{load_scoring_config, RuleLoader};
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
