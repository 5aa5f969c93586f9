//! Shared YAML envelope and metadata types for rule documents.
//!
//! Every rule file carries the same header (`apiVersion`, `kind`,
//! `metadata`); the `spec` section is kind-specific.

mod envelope;
mod metadata;

pub use envelope::RuleEnvelope;
pub use metadata::RuleMetadata;
