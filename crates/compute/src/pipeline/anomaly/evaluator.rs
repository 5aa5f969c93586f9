//! Per-metric evaluators.
//!
//! Each evaluator owns the [`SampleStats`] for its metric, computed once
//! from the batch, and turns a target item into a [`MetricResult`].

use tracing::debug;

use postpulse_core::{ContentItem, MetricKind};
use postpulse_rules::scoring_config::{CompiledScoringConfig, SeverityBands, ZScoreBlend};

use super::population::SampleStats;
use super::severity::{classify_level, deviation_text};
use crate::types::{AnomalyLevel, MetricResult};

/// Evaluates one metric of a target item against precomputed batch statistics.
///
/// Implementations are shared across rayon workers, hence `Send + Sync`.
pub trait ItemEvaluator: Send + Sync {
    fn evaluate(&self, target: &ContentItem) -> MetricResult;
}

/// Non-negative counter value, or `None` when absent or negative.
fn usable_count(metric: MetricKind, item: &ContentItem) -> Option<f64> {
    metric.raw_count(item).filter(|v| *v >= 0).map(|v| v as f64)
}

/// Plain z-score, falling back to ±`median_sign_z` by median side when the
/// sample has no spread.
fn plain_z(value: f64, stats: &SampleStats, median_sign_z: f64) -> f64 {
    if stats.std_dev() > 0.0 {
        (value - stats.mean()) / stats.std_dev()
    } else if value > stats.median() {
        median_sign_z
    } else if value < stats.median() {
        -median_sign_z
    } else {
        0.0
    }
}

/// Assemble a result from a value, its z-score and the batch sample.
pub(crate) fn build_result(
    metric: MetricKind,
    value: f64,
    z_score: f64,
    stats: &SampleStats,
    bands: &SeverityBands,
) -> MetricResult {
    if stats.is_empty() {
        return insufficient_data(metric, value);
    }

    let percentile = stats.percentile_of(value);
    let iqr_outlier = stats.is_iqr_outlier(value, bands.iqr_multiplier);

    MetricResult {
        metric,
        value,
        mean: stats.mean(),
        std_dev: stats.std_dev(),
        z_score,
        percentile,
        weight: None,
        deviation_text: deviation_text(value, stats.mean(), &bands.deviation_pct),
        level: classify_level(z_score, percentile, iqr_outlier, bands),
        sample_size: stats.len(),
    }
}

fn insufficient_data(metric: MetricKind, value: f64) -> MetricResult {
    MetricResult {
        metric,
        value,
        mean: 0.0,
        std_dev: 0.0,
        z_score: 0.0,
        percentile: 50.0,
        weight: None,
        deviation_text: "insufficient data".to_string(),
        level: AnomalyLevel::Normal,
        sample_size: 0,
    }
}

// ── Count metrics ───────────────────────────────────────────────────

/// Evaluator for raw counters: blended plain / robust z-score.
#[derive(Debug, Clone)]
pub struct MetricEvaluator {
    metric: MetricKind,
    stats: SampleStats,
    blend: ZScoreBlend,
    bands: SeverityBands,
}

impl MetricEvaluator {
    /// Build the sample from every batch item with a present, non-negative value.
    pub fn new(metric: MetricKind, batch: &[ContentItem], config: &CompiledScoringConfig) -> Self {
        let stats = SampleStats::from_values(batch.iter().filter_map(|item| usable_count(metric, item)));
        debug!(
            metric = %metric,
            n = stats.len(),
            mean = stats.mean(),
            std_dev = stats.std_dev(),
            median = stats.median(),
            mad = stats.mad(),
            "metric sample built"
        );
        Self {
            metric,
            stats,
            blend: config.z_score.clone(),
            bands: config.severity.clone(),
        }
    }

    pub fn stats(&self) -> &SampleStats {
        &self.stats
    }

    /// `plain·w_p + robust·w_r` when the sample has spread, else the robust z alone.
    pub fn blended_z(&self, value: f64) -> f64 {
        let robust = if self.stats.mad() > 0.0 {
            self.blend.mad_consistency * (value - self.stats.median()) / self.stats.mad()
        } else {
            0.0
        };
        if self.stats.std_dev() > 0.0 {
            let plain = plain_z(value, &self.stats, self.blend.median_sign_z);
            self.blend.plain_weight * plain + self.blend.robust_weight * robust
        } else {
            robust
        }
    }
}

impl ItemEvaluator for MetricEvaluator {
    fn evaluate(&self, target: &ContentItem) -> MetricResult {
        let value = usable_count(self.metric, target).unwrap_or(0.0);
        build_result(self.metric, value, self.blended_z(value), &self.stats, &self.bands)
    }
}

// ── Rate metrics ────────────────────────────────────────────────────

/// Evaluator for ratio metrics (`numerator / reads × 100`), plain z only.
#[derive(Debug, Clone)]
pub struct RateMetricEvaluator {
    metric: MetricKind,
    numerator: MetricKind,
    stats: SampleStats,
    median_sign_z: f64,
    bands: SeverityBands,
}

impl RateMetricEvaluator {
    /// Returns `None` for metrics that are not rates.
    pub fn new(metric: MetricKind, batch: &[ContentItem], config: &CompiledScoringConfig) -> Option<Self> {
        let numerator = metric.rate_numerator()?;
        let min_reads = config.rates.min_reads;

        let stats = SampleStats::from_values(batch.iter().filter_map(|item| {
            let reads = usable_count(MetricKind::ReadCount, item).filter(|r| *r > min_reads)?;
            let num = usable_count(numerator, item)?;
            Some(num / reads * 100.0)
        }));
        debug!(
            metric = %metric,
            n = stats.len(),
            mean = stats.mean(),
            std_dev = stats.std_dev(),
            min_reads,
            "rate sample built"
        );

        Some(Self {
            metric,
            numerator,
            stats,
            median_sign_z: config.z_score.median_sign_z,
            bands: config.severity.clone(),
        })
    }

    pub fn stats(&self) -> &SampleStats {
        &self.stats
    }

    /// The target's own rate; 0 when it has no reads.
    pub fn rate_of(&self, target: &ContentItem) -> f64 {
        match usable_count(MetricKind::ReadCount, target) {
            Some(reads) if reads > 0.0 => {
                usable_count(self.numerator, target).unwrap_or(0.0) / reads * 100.0
            }
            _ => 0.0,
        }
    }
}

impl ItemEvaluator for RateMetricEvaluator {
    fn evaluate(&self, target: &ContentItem) -> MetricResult {
        let value = self.rate_of(target);
        let z = plain_z(value, &self.stats, self.median_sign_z);
        build_result(self.metric, value, z, &self.stats, &self.bands)
    }
}

/// Evaluator for any metric: rates get a [`RateMetricEvaluator`].
pub fn evaluator_for(
    metric: MetricKind,
    batch: &[ContentItem],
    config: &CompiledScoringConfig,
) -> Box<dyn ItemEvaluator> {
    match RateMetricEvaluator::new(metric, batch, config) {
        Some(rate) => Box::new(rate),
        None => Box::new(MetricEvaluator::new(metric, batch, config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CompiledScoringConfig {
        CompiledScoringConfig::default()
    }

    fn reads_batch(values: &[i64]) -> Vec<ContentItem> {
        values
            .iter()
            .enumerate()
            .map(|(i, r)| ContentItem::new(format!("p{i}")).with_reads(*r))
            .collect()
    }

    #[test]
    fn constant_sample_gives_zero_z_and_normal() {
        let batch = reads_batch(&[5, 5, 5]);
        let eval = MetricEvaluator::new(MetricKind::ReadCount, &batch, &config());
        let r = eval.evaluate(&batch[0]);
        assert_eq!(r.std_dev, 0.0);
        assert_eq!(r.z_score, 0.0);
        assert_eq!(r.level, AnomalyLevel::Normal);
        assert_eq!(r.sample_size, 3);
    }

    #[test]
    fn blended_z_mixes_plain_and_robust() {
        let batch = reads_batch(&[1, 2, 3, 4, 100]);
        let eval = MetricEvaluator::new(MetricKind::ReadCount, &batch, &config());
        let stats = eval.stats();
        let plain = (100.0 - stats.mean()) / stats.std_dev();
        let robust = 0.6745 * (100.0 - 3.0) / 1.0;
        assert!((eval.blended_z(100.0) - (0.6 * plain + 0.4 * robust)).abs() < 1e-9);
    }

    #[test]
    fn empty_sample_is_insufficient_data() {
        let batch = vec![ContentItem::new("a"), ContentItem::new("b").with_reads(-3)];
        let eval = MetricEvaluator::new(MetricKind::ReadCount, &batch, &config());
        let r = eval.evaluate(&batch[0]);
        assert_eq!(r.sample_size, 0);
        assert_eq!(r.percentile, 50.0);
        assert_eq!(r.level, AnomalyLevel::Normal);
        assert_eq!(r.deviation_text, "insufficient data");
    }

    #[test]
    fn negative_values_excluded_and_target_treated_as_zero() {
        let batch = reads_batch(&[-10, 100, 200, 300]);
        let eval = MetricEvaluator::new(MetricKind::ReadCount, &batch, &config());
        assert_eq!(eval.stats().len(), 3);
        assert_eq!(eval.evaluate(&batch[0]).value, 0.0);
    }

    #[test]
    fn rate_sample_requires_reads_above_floor() {
        let batch = vec![
            ContentItem::new("a").with_reads(50).with_interactions(40),
            ContentItem::new("b").with_reads(100).with_interactions(5),
            ContentItem::new("c").with_reads(200).with_interactions(20),
            ContentItem::new("d").with_reads(1000),
        ];
        let eval = RateMetricEvaluator::new(MetricKind::InteractionRate, &batch, &config()).unwrap();
        // a: reads not above 50; d: no interactions
        assert_eq!(eval.stats().len(), 2);
        assert!((eval.stats().mean() - 7.5).abs() < 1e-12);

        // Target rate still computed below the floor.
        assert!((eval.rate_of(&batch[0]) - 80.0).abs() < 1e-12);
        assert_eq!(eval.rate_of(&ContentItem::new("z")), 0.0);
    }

    #[test]
    fn rate_uses_plain_z_with_median_sign_fallback() {
        let batch = vec![
            ContentItem::new("a").with_reads(100).with_interactions(5),
            ContentItem::new("b").with_reads(200).with_interactions(10),
            ContentItem::new("c").with_reads(400).with_interactions(60),
        ];
        let eval = RateMetricEvaluator::new(MetricKind::InteractionRate, &batch, &config()).unwrap();
        // Sample 5, 5, 15: std > 0, so plain z.
        let r = eval.evaluate(&batch[2]);
        let stats = eval.stats();
        assert!((r.z_score - (15.0 - stats.mean()) / stats.std_dev()).abs() < 1e-12);

        let flat = vec![
            ContentItem::new("a").with_reads(100).with_interactions(5),
            ContentItem::new("b").with_reads(200).with_interactions(10),
        ];
        let eval = RateMetricEvaluator::new(MetricKind::InteractionRate, &flat, &config()).unwrap();
        let above = ContentItem::new("t").with_reads(100).with_interactions(9);
        assert_eq!(eval.evaluate(&above).z_score, 0.5);
    }

    #[test]
    fn count_metric_has_no_rate_evaluator() {
        assert!(RateMetricEvaluator::new(MetricKind::ReadCount, &[], &config()).is_none());
        let result = evaluator_for(MetricKind::ConversionRate, &[], &config())
            .evaluate(&ContentItem::new("t").with_reads(100).with_product_visits(3));
        assert_eq!(result.metric, MetricKind::ConversionRate);
        assert!((result.value - 3.0).abs() < 1e-12);
    }
}
