use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PulseError;
use crate::item::ContentItem;

/// Engagement metrics the engine knows how to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    ReadCount,
    InteractionCount,
    ShareCount,
    ProductVisitCount,
    ProductWantCount,
    /// interactions / reads × 100
    InteractionRate,
    /// product visits / reads × 100
    ConversionRate,
}

impl MetricKind {
    /// Human-readable label used in deviation text and terminal output.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::ReadCount => "7-day reads",
            MetricKind::InteractionCount => "7-day interactions",
            MetricKind::ShareCount => "7-day shares",
            MetricKind::ProductVisitCount => "7-day product visits",
            MetricKind::ProductWantCount => "7-day product wants",
            MetricKind::InteractionRate => "interaction rate",
            MetricKind::ConversionRate => "conversion rate",
        }
    }

    /// Raw counter value for count metrics. Rate metrics return `None`;
    /// they are derived from two counters by the rate evaluator.
    pub fn raw_count(&self, item: &ContentItem) -> Option<i64> {
        match self {
            MetricKind::ReadCount => item.read_count,
            MetricKind::InteractionCount => item.interaction_count,
            MetricKind::ShareCount => item.share_count,
            MetricKind::ProductVisitCount => item.product_visit_count,
            MetricKind::ProductWantCount => item.product_want_count,
            MetricKind::InteractionRate | MetricKind::ConversionRate => None,
        }
    }

    /// Numerator counter of a rate metric.
    pub fn rate_numerator(&self) -> Option<MetricKind> {
        match self {
            MetricKind::InteractionRate => Some(MetricKind::InteractionCount),
            MetricKind::ConversionRate => Some(MetricKind::ProductVisitCount),
            _ => None,
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricKind::ReadCount => write!(f, "read_count"),
            MetricKind::InteractionCount => write!(f, "interaction_count"),
            MetricKind::ShareCount => write!(f, "share_count"),
            MetricKind::ProductVisitCount => write!(f, "product_visit_count"),
            MetricKind::ProductWantCount => write!(f, "product_want_count"),
            MetricKind::InteractionRate => write!(f, "interaction_rate"),
            MetricKind::ConversionRate => write!(f, "conversion_rate"),
        }
    }
}

/// Which classification path to run over a batch.
///
/// The two paths encode different product iterations and may legitimately
/// disagree on the same item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStrategy {
    /// Sequential z-score / IQR overwrite rules on read, interaction and share counts.
    Legacy,
    /// Robust-statistics evaluators plus the weighted composite classifier.
    #[default]
    Optimized,
}

impl std::fmt::Display for DetectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionStrategy::Legacy => write!(f, "legacy"),
            DetectionStrategy::Optimized => write!(f, "optimized"),
        }
    }
}

impl FromStr for DetectionStrategy {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(DetectionStrategy::Legacy),
            "optimized" | "optimised" => Ok(DetectionStrategy::Optimized),
            other => Err(PulseError::UnknownStrategy(other.to_string())),
        }
    }
}
