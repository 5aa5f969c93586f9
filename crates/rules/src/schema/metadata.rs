use serde::{Deserialize, Serialize};

/// Identity of a scoring rule file.
///
/// `id` keys the loader's rule map and breaks ties when several rules are
/// enabled; it must be kebab-case. Setting `enabled: false` keeps a tuned
/// config on disk without it ever becoming active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}
