//! Report types produced by the detection engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use postpulse_core::{DetectionStrategy, ItemId, MetricKind};

use crate::pipeline::metrics::BatchTiming;

/// Severity of a single metric's deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyLevel {
    Normal,
    Mild,
    Moderate,
    Severe,
}

/// Overall verdict for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyStatus {
    Normal,
    /// Outperforming the batch.
    GoodAnomaly,
    /// Underperforming the batch.
    BadAnomaly,
}

impl std::fmt::Display for AnomalyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyStatus::Normal => write!(f, "NORMAL"),
            AnomalyStatus::GoodAnomaly => write!(f, "GOOD_ANOMALY"),
            AnomalyStatus::BadAnomaly => write!(f, "BAD_ANOMALY"),
        }
    }
}

impl std::fmt::Display for AnomalyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyLevel::Normal => write!(f, "NORMAL"),
            AnomalyLevel::Mild => write!(f, "MILD"),
            AnomalyLevel::Moderate => write!(f, "MODERATE"),
            AnomalyLevel::Severe => write!(f, "SEVERE"),
        }
    }
}

/// Which path produced an [`AnomalyReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportBasis {
    /// Per-metric evaluators plus the weighted composite classifier.
    Statistical,
    /// Read-count bands used when the batch is too small for statistics.
    AbsoluteThreshold,
    /// Sequential z-score / IQR rules.
    LegacyThreshold,
}

/// Deviation analysis of one metric for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricResult {
    pub metric: MetricKind,
    pub value: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub z_score: f64,
    /// Share of batch values at or below `value`, 0..=100.
    pub percentile: f64,
    /// Composite weight; absent when the metric is unscored or had no data.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub weight: Option<f64>,
    pub deviation_text: String,
    pub level: AnomalyLevel,
    /// Number of batch values behind the statistics. 0 means no data.
    pub sample_size: usize,
}

impl MetricResult {
    pub fn is_anomalous(&self) -> bool {
        self.level != AnomalyLevel::Normal
    }

    /// Direction of a non-NORMAL metric: above the batch by z or percentile.
    pub fn is_positive(&self) -> bool {
        self.z_score > 0.0 || self.percentile > 50.0
    }
}

/// Classification of one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    pub results: Vec<MetricResult>,
    pub overall_status: AnomalyStatus,
    /// Always within 0..=100.
    pub overall_score: f64,
    pub basis: ReportBasis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReport {
    pub item_id: ItemId,
    pub report: AnomalyReport,
}

/// Status counts over a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub normal: usize,
    pub good_anomaly: usize,
    pub bad_anomaly: usize,
    /// Reports produced by the small-sample absolute-threshold path.
    pub fallback_used: usize,
}

impl BatchSummary {
    pub fn from_reports(items: &[ItemReport]) -> Self {
        items.iter().fold(
            Self {
                total: items.len(),
                ..Self::default()
            },
            |mut acc, item| {
                match item.report.overall_status {
                    AnomalyStatus::Normal => acc.normal += 1,
                    AnomalyStatus::GoodAnomaly => acc.good_anomaly += 1,
                    AnomalyStatus::BadAnomaly => acc.bad_anomaly += 1,
                }
                if item.report.basis == ReportBasis::AbsoluteThreshold {
                    acc.fallback_used += 1;
                }
                acc
            },
        )
    }
}

/// Result of one `detect` run over a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub strategy: DetectionStrategy,
    /// One entry per input item, in input order.
    pub items: Vec<ItemReport>,
    pub summary: BatchSummary,
    pub timing: BatchTiming,
}
