//! Rule envelope for lightweight first-pass deserialization.

use serde::{Deserialize, Serialize};

use super::RuleMetadata;

/// Lightweight first-pass deserializer that reads only the header fields.
///
/// Used during two-pass loading: first extract `kind` to decide whether the
/// file is a rule kind this crate understands, then deserialize the full
/// document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEnvelope {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: RuleMetadata,
    /// Remaining fields captured as raw YAML for second-pass deserialization.
    #[serde(flatten)]
    pub rest: serde_yaml::Value,
}

impl RuleEnvelope {
    /// Two-pass: reconstruct the full YAML and deserialize into `T`.
    pub fn parse_full<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_yaml::Error> {
        let yaml = serde_yaml::to_string(self)?;
        serde_yaml::from_str(&yaml)
    }
}
