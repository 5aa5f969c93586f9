//! Sequential threshold detector on read, interaction and share counts.
//!
//! Each rule stage emits a [`Candidate`] verdict tagged with its stage
//! priority and a guard. [`fold_candidates`] applies them in priority order,
//! so a later stage overwrites an earlier one unless its guard forbids it.

use postpulse_core::{ContentItem, MetricKind};
use postpulse_rules::scoring_config::{CompiledScoringConfig, LegacyParams, SeverityBands};

use super::evaluator::build_result;
use super::population::SampleStats;
use crate::types::{AnomalyReport, AnomalyStatus, MetricResult, ReportBasis};

/// Metrics checked by the legacy rules, in stage order.
pub const LEGACY_METRICS: [MetricKind; 3] = [
    MetricKind::ReadCount,
    MetricKind::InteractionCount,
    MetricKind::ShareCount,
];

/// Condition under which a candidate may replace the running verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Always,
    /// Never replaces an existing BAD_ANOMALY.
    UnlessBad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    /// Stage order; higher applies later.
    pub priority: u8,
    pub status: AnomalyStatus,
    pub guard: Guard,
}

/// Reduce candidates to a final status, starting from NORMAL.
pub fn fold_candidates(mut candidates: Vec<Candidate>) -> AnomalyStatus {
    candidates.sort_by_key(|c| c.priority);
    candidates.into_iter().fold(AnomalyStatus::Normal, |current, c| {
        match (c.guard, current) {
            (Guard::UnlessBad, AnomalyStatus::BadAnomaly) => current,
            _ => c.status,
        }
    })
}

const COMPOSITE_PRIORITY: u8 = (LEGACY_METRICS.len() * 2) as u8;

#[derive(Debug, Clone)]
struct LegacyMetric {
    metric: MetricKind,
    /// Positive batch values only.
    stats: SampleStats,
    /// Weight in the legacy composite sum.
    factor: f64,
}

/// Legacy threshold classifier over precomputed positive-value samples.
#[derive(Debug, Clone)]
pub struct LegacyDetector {
    metrics: Vec<LegacyMetric>,
    params: LegacyParams,
    bands: SeverityBands,
}

fn positive_value(metric: MetricKind, item: &ContentItem) -> Option<f64> {
    metric.raw_count(item).filter(|v| *v > 0).map(|v| v as f64)
}

impl LegacyDetector {
    pub fn new(batch: &[ContentItem], config: &CompiledScoringConfig) -> Self {
        let params = config.legacy.clone();
        let metrics = LEGACY_METRICS
            .iter()
            .map(|&metric| LegacyMetric {
                metric,
                stats: SampleStats::from_values(batch.iter().filter_map(|i| positive_value(metric, i))),
                factor: match metric {
                    MetricKind::InteractionCount => params.interaction_factor,
                    MetricKind::ShareCount => params.share_factor,
                    _ => 1.0,
                },
            })
            .collect();
        Self {
            metrics,
            params,
            bands: config.severity.clone(),
        }
    }

    /// Candidates from the z and IQR rules of one metric stage.
    fn metric_candidates(&self, stage: usize, m: &LegacyMetric, value: f64, z: f64) -> Vec<Candidate> {
        // Only the read stage may promote over an earlier BAD.
        let good_guard = if m.metric == MetricKind::ReadCount {
            Guard::Always
        } else {
            Guard::UnlessBad
        };
        let verdict = |priority: u8, good: bool| Candidate {
            priority,
            status: if good {
                AnomalyStatus::GoodAnomaly
            } else {
                AnomalyStatus::BadAnomaly
            },
            guard: if good { good_guard } else { Guard::Always },
        };

        let mut out = Vec::new();
        let z_priority = (stage * 2) as u8;
        if z.abs() > self.params.z_threshold {
            out.push(verdict(z_priority, value > m.stats.mean()));
        }
        if !m.stats.is_empty() {
            let (low, high) = m.stats.iqr_fences(self.params.iqr_multiplier);
            if value > high {
                out.push(verdict(z_priority + 1, true));
            } else if value < low {
                out.push(verdict(z_priority + 1, false));
            }
        }
        out
    }

    pub fn classify(&self, target: &ContentItem) -> AnomalyReport {
        let mut candidates = Vec::new();
        let mut results = Vec::new();
        let mut composite_sum = 0.0;
        let mut valid_metrics = 0usize;

        for (stage, m) in self.metrics.iter().enumerate() {
            let Some(value) = positive_value(m.metric, target) else {
                continue;
            };
            let z = if m.stats.std_dev() > 0.0 {
                (value - m.stats.mean()) / m.stats.std_dev()
            } else {
                0.0
            };
            candidates.extend(self.metric_candidates(stage, m, value, z));
            results.push(build_result(m.metric, value, z, &m.stats, &self.bands));
            composite_sum += m.factor * value;
            valid_metrics += 1;
        }

        if valid_metrics > 0 {
            let composite = composite_sum / valid_metrics as f64;
            if composite > self.params.good_average {
                candidates.push(Candidate {
                    priority: COMPOSITE_PRIORITY,
                    status: AnomalyStatus::GoodAnomaly,
                    guard: Guard::UnlessBad,
                });
            } else if composite < self.params.bad_average {
                candidates.push(Candidate {
                    priority: COMPOSITE_PRIORITY,
                    status: AnomalyStatus::BadAnomaly,
                    guard: Guard::Always,
                });
            }
        }

        AnomalyReport {
            overall_score: legacy_score(&results),
            overall_status: fold_candidates(candidates),
            results,
            basis: ReportBasis::LegacyThreshold,
        }
    }
}

/// Mean of `clamp((z + 3) / 6 · 100)` over results; 50 with no results.
fn legacy_score(results: &[MetricResult]) -> f64 {
    if results.is_empty() {
        return 50.0;
    }
    let total: f64 = results
        .iter()
        .map(|r| ((r.z_score + 3.0) / 6.0 * 100.0).clamp(0.0, 100.0))
        .sum();
    total / results.len() as f64
}
