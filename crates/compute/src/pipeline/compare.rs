//! Side-by-side comparison of the legacy and optimized strategies.

use serde::{Deserialize, Serialize};

use postpulse_core::ItemId;

use crate::types::{AnomalyStatus, ItemReport};

/// Verdicts of both strategies for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub item_id: ItemId,
    pub legacy_status: AnomalyStatus,
    pub legacy_score: f64,
    pub optimized_status: AnomalyStatus,
    pub optimized_score: f64,
}

impl StrategyComparison {
    pub fn agrees(&self) -> bool {
        self.legacy_status == self.optimized_status
    }
}

/// Pair up two per-item report lists produced from the same batch.
pub fn pair_reports(legacy: &[ItemReport], optimized: &[ItemReport]) -> Vec<StrategyComparison> {
    legacy
        .iter()
        .zip(optimized)
        .map(|(l, o)| StrategyComparison {
            item_id: l.item_id.clone(),
            legacy_status: l.report.overall_status,
            legacy_score: l.report.overall_score,
            optimized_status: o.report.overall_status,
            optimized_score: o.report.overall_score,
        })
        .collect()
}
