//! Weighted composite classification over per-metric results.

use postpulse_rules::scoring_config::{CompositeBands, MetricWeights};

use crate::types::{AnomalyLevel, AnomalyReport, AnomalyStatus, MetricResult, ReportBasis};

/// Per-direction anomaly counts over one item's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionCounts {
    pub severe_positive: usize,
    pub severe_negative: usize,
    pub positive: usize,
    pub negative: usize,
}

impl DirectionCounts {
    pub fn tally(results: &[MetricResult]) -> Self {
        results
            .iter()
            .filter(|r| r.is_anomalous())
            .fold(Self::default(), |mut acc, r| {
                let severe = r.level == AnomalyLevel::Severe;
                if r.is_positive() {
                    acc.positive += 1;
                    acc.severe_positive += usize::from(severe);
                } else {
                    acc.negative += 1;
                    acc.severe_negative += usize::from(severe);
                }
                acc
            })
    }
}

/// Aggregates metric results into one score and status.
///
/// Stateless apart from its immutable weights and bands, so classifying the
/// `results` of a report it produced yields the same report again.
#[derive(Debug, Clone)]
pub struct CompositeClassifier {
    weights: MetricWeights,
    bands: CompositeBands,
}

impl CompositeClassifier {
    pub fn new(weights: MetricWeights, bands: CompositeBands) -> Self {
        Self { weights, bands }
    }

    /// `clamp(percentile + factor·z, 0, 100)`.
    pub fn metric_score(&self, result: &MetricResult) -> f64 {
        (result.percentile + self.bands.z_score_factor * result.z_score).clamp(0.0, 100.0)
    }

    /// Weighted mean of metric scores over results that carry a weight.
    pub fn overall_score(&self, results: &[MetricResult]) -> f64 {
        let (weighted, total_weight) = results
            .iter()
            .filter_map(|r| r.weight.map(|w| (self.metric_score(r), w)))
            .fold((0.0, 0.0), |(sum, tw), (score, w)| (sum + score * w, tw + w));
        if total_weight > 0.0 {
            (weighted / total_weight).clamp(0.0, 100.0)
        } else {
            self.bands.neutral
        }
    }

    /// First matching rule of the decision tree wins.
    pub fn decide(&self, score: f64, counts: DirectionCounts) -> AnomalyStatus {
        let b = &self.bands;
        let DirectionCounts {
            severe_positive,
            severe_negative,
            positive,
            negative,
        } = counts;

        if severe_negative >= b.severe_majority {
            AnomalyStatus::BadAnomaly
        } else if severe_positive >= b.severe_majority {
            AnomalyStatus::GoodAnomaly
        } else if score >= b.good {
            AnomalyStatus::GoodAnomaly
        } else if score <= b.bad {
            AnomalyStatus::BadAnomaly
        } else if score >= b.leaning_good && positive > negative {
            AnomalyStatus::GoodAnomaly
        } else if score <= b.leaning_bad && negative > positive {
            AnomalyStatus::BadAnomaly
        } else if negative >= b.anomaly_majority && positive <= b.opposing_tolerance {
            AnomalyStatus::BadAnomaly
        } else if positive >= b.anomaly_majority && negative <= b.opposing_tolerance {
            AnomalyStatus::GoodAnomaly
        } else {
            AnomalyStatus::Normal
        }
    }

    /// Attach weights (only to metrics that had data) and classify.
    pub fn classify(&self, mut results: Vec<MetricResult>) -> AnomalyReport {
        for r in &mut results {
            r.weight = if r.sample_size > 0 {
                self.weights.get(r.metric)
            } else {
                None
            };
        }
        let overall_score = self.overall_score(&results);
        let overall_status = self.decide(overall_score, DirectionCounts::tally(&results));
        AnomalyReport {
            results,
            overall_status,
            overall_score,
            basis: ReportBasis::Statistical,
        }
    }
}

impl Default for CompositeClassifier {
    fn default() -> Self {
        Self::new(MetricWeights::default(), CompositeBands::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postpulse_core::MetricKind;

    fn result(metric: MetricKind, percentile: f64, z: f64, level: AnomalyLevel) -> MetricResult {
        MetricResult {
            metric,
            value: 0.0,
            mean: 0.0,
            std_dev: 0.0,
            z_score: z,
            percentile,
            weight: None,
            deviation_text: String::new(),
            level,
            sample_size: 10,
        }
    }

    fn all_scored(percentile: f64, z: f64, level: AnomalyLevel) -> Vec<MetricResult> {
        MetricWeights::SCORED
            .iter()
            .map(|m| result(*m, percentile, z, level))
            .collect()
    }

    #[test]
    fn metric_score_is_clamped() {
        let c = CompositeClassifier::default();
        assert_eq!(c.metric_score(&result(MetricKind::ReadCount, 100.0, 3.0, AnomalyLevel::Severe)), 100.0);
        assert_eq!(c.metric_score(&result(MetricKind::ReadCount, 0.0, -2.0, AnomalyLevel::Severe)), 0.0);
        assert_eq!(c.metric_score(&result(MetricKind::ReadCount, 50.0, 1.0, AnomalyLevel::Normal)), 52.0);
    }

    #[test]
    fn no_weighted_metric_scores_neutral() {
        let c = CompositeClassifier::default();
        let mut r = result(MetricKind::ReadCount, 100.0, 3.0, AnomalyLevel::Severe);
        r.sample_size = 0;
        let report = c.classify(vec![r]);
        assert_eq!(report.overall_score, 50.0);
        assert!(report.results[0].weight.is_none());
    }

    #[test]
    fn two_severe_negatives_win_over_high_score() {
        let c = CompositeClassifier::default();
        let counts = DirectionCounts {
            severe_negative: 2,
            severe_positive: 3,
            ..Default::default()
        };
        assert_eq!(c.decide(90.0, counts), AnomalyStatus::BadAnomaly);
    }

    #[test]
    fn score_bands() {
        let c = CompositeClassifier::default();
        let none = DirectionCounts::default();
        assert_eq!(c.decide(75.0, none), AnomalyStatus::GoodAnomaly);
        assert_eq!(c.decide(25.0, none), AnomalyStatus::BadAnomaly);
        assert_eq!(c.decide(70.0, none), AnomalyStatus::Normal);
        let leaning_up = DirectionCounts {
            positive: 2,
            negative: 1,
            ..Default::default()
        };
        assert_eq!(c.decide(65.0, leaning_up), AnomalyStatus::GoodAnomaly);
        let leaning_down = DirectionCounts {
            positive: 0,
            negative: 1,
            ..Default::default()
        };
        assert_eq!(c.decide(35.0, leaning_down), AnomalyStatus::BadAnomaly);
    }

    #[test]
    fn anomaly_majority_with_mid_score() {
        let c = CompositeClassifier::default();
        let bad = DirectionCounts {
            negative: 3,
            positive: 1,
            ..Default::default()
        };
        assert_eq!(c.decide(50.0, bad), AnomalyStatus::BadAnomaly);
        let mixed = DirectionCounts {
            negative: 3,
            positive: 2,
            ..Default::default()
        };
        assert_eq!(c.decide(50.0, mixed), AnomalyStatus::Normal);
    }

    #[test]
    fn direction_uses_z_or_percentile() {
        let results = vec![
            result(MetricKind::ReadCount, 90.0, -0.1, AnomalyLevel::Severe),
            result(MetricKind::InteractionCount, 10.0, -2.0, AnomalyLevel::Severe),
            result(MetricKind::InteractionRate, 10.0, 0.4, AnomalyLevel::Mild),
            result(MetricKind::ConversionRate, 99.0, 3.0, AnomalyLevel::Normal),
        ];
        let counts = DirectionCounts::tally(&results);
        assert_eq!(counts.severe_positive, 1);
        assert_eq!(counts.severe_negative, 1);
        assert_eq!(counts.positive, 2);
        assert_eq!(counts.negative, 1);
    }

    #[test]
    fn classification_is_idempotent() {
        let c = CompositeClassifier::default();
        let first = c.classify(all_scored(92.0, 1.4, AnomalyLevel::Severe));
        let second = c.classify(first.results.clone());
        assert_eq!(first, second);
        assert_eq!(first.overall_status, AnomalyStatus::GoodAnomaly);
        assert!((first.overall_score - 94.8).abs() < 1e-9);
    }
}
