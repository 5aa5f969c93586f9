//! Absolute-threshold classification for batches too small for statistics.

use postpulse_core::ContentItem;
use postpulse_rules::scoring_config::FallbackParams;

use crate::types::{AnomalyReport, AnomalyStatus, ReportBasis};

/// Whether a batch has too few usable read counts for the statistical path.
pub fn needs_fallback(batch: &[ContentItem], params: &FallbackParams) -> bool {
    batch.iter().filter(|item| item.usable_reads().is_some()).count() < params.min_items
}

/// Classify by read-count band, nudged by interaction rate.
#[derive(Debug, Clone)]
pub struct AbsoluteThresholdClassifier {
    params: FallbackParams,
}

impl AbsoluteThresholdClassifier {
    pub fn new(params: FallbackParams) -> Self {
        Self { params }
    }

    fn read_band(&self, reads: f64) -> (f64, AnomalyStatus) {
        let p = &self.params;
        if reads > p.high_reads {
            (p.high_score, AnomalyStatus::GoodAnomaly)
        } else if reads >= p.solid_reads {
            (p.solid_score, AnomalyStatus::Normal)
        } else if reads > p.fair_reads {
            (p.middle_score, AnomalyStatus::Normal)
        } else if reads >= p.low_reads {
            (p.fair_score, AnomalyStatus::Normal)
        } else {
            (p.low_score, AnomalyStatus::BadAnomaly)
        }
    }

    pub fn classify(&self, target: &ContentItem) -> AnomalyReport {
        let p = &self.params;
        let reads = target.read_count.filter(|r| *r >= 0).unwrap_or(0) as f64;
        let (mut score, status) = self.read_band(reads);

        if reads > 0.0 {
            let interactions = target.interaction_count.filter(|i| *i >= 0).unwrap_or(0) as f64;
            let rate = interactions / reads * 100.0;
            if rate > p.rate_bonus_pct {
                score += p.rate_adjustment;
            } else if rate < p.rate_penalty_pct {
                score -= p.rate_adjustment;
            }
        }

        AnomalyReport {
            results: Vec::new(),
            overall_status: status,
            overall_score: score.clamp(0.0, 100.0),
            basis: ReportBasis::AbsoluteThreshold,
        }
    }
}
