use chrono::Utc;
use rayon::prelude::*;
use tracing::{info, warn};
use uuid::Uuid;

use postpulse_core::config::{DetectionConfig, DEFAULT_PARALLEL_THRESHOLD};
use postpulse_core::{ContentItem, DetectionStrategy};
use postpulse_rules::CompiledScoringConfig;

use crate::pipeline::anomaly::BatchModel;
use crate::pipeline::compare::{pair_reports, StrategyComparison};
use crate::pipeline::metrics::BatchTiming;
use crate::types::{AnomalyReport, BatchReport, BatchSummary, ItemReport};

/// Batch orchestrator: statistics once per batch, then a per-item map.
///
/// Holds only immutable configuration, so one engine can serve any number
/// of independent batches concurrently.
#[derive(Debug, Clone)]
pub struct DetectionEngine {
    config: CompiledScoringConfig,
    parallel_threshold: usize,
}

impl Default for DetectionEngine {
    fn default() -> Self {
        Self::new(CompiledScoringConfig::default())
    }
}

impl DetectionEngine {
    pub fn new(config: CompiledScoringConfig) -> Self {
        Self {
            config,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Engine using the environment's parallel threshold.
    pub fn from_config(detection: &DetectionConfig, config: CompiledScoringConfig) -> Self {
        Self::new(config).with_parallel_threshold(detection.parallel_threshold)
    }

    /// Batches with at least this many items classify on the rayon pool.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn config(&self) -> &CompiledScoringConfig {
        &self.config
    }

    /// Classify every item of `batch` against the batch itself.
    ///
    /// Output order always equals input order, sequential or parallel.
    pub fn detect(&self, batch: &[ContentItem], strategy: DetectionStrategy) -> BatchReport {
        let mut timing = BatchTiming::default();

        let timer = timing.timer();
        let model = BatchModel::build(batch, strategy, &self.config);
        timer.finish_stats(&mut timing);

        let parallel = batch.len() >= self.parallel_threshold;
        let classify = |item: &ContentItem| ItemReport {
            item_id: item.id.clone(),
            report: model.classify(item),
        };

        let timer = timing.timer();
        let items: Vec<ItemReport> = if parallel {
            batch.par_iter().map(classify).collect()
        } else {
            batch.iter().map(classify).collect()
        };
        timer.finish_classify(&mut timing, items.len() as u64);

        let summary = BatchSummary::from_reports(&items);
        info!(
            %strategy,
            basis = ?model.basis(),
            total = summary.total,
            good = summary.good_anomaly,
            bad = summary.bad_anomaly,
            parallel,
            stats_us = timing.stats_micros,
            classify_us = timing.classify_micros,
            "batch classified"
        );

        BatchReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            strategy,
            items,
            summary,
            timing,
        }
    }

    /// Classify one target against `batch`; the target need not be a member.
    pub fn classify(
        &self,
        target: &ContentItem,
        batch: &[ContentItem],
        strategy: DetectionStrategy,
    ) -> AnomalyReport {
        BatchModel::build(batch, strategy, &self.config).classify(target)
    }

    /// Run both strategies and log every item where they disagree.
    pub fn compare(&self, batch: &[ContentItem]) -> Vec<StrategyComparison> {
        let legacy = self.detect(batch, DetectionStrategy::Legacy);
        let optimized = self.detect(batch, DetectionStrategy::Optimized);
        let comparisons = pair_reports(&legacy.items, &optimized.items);

        let mut disagreements = 0usize;
        for c in comparisons.iter().filter(|c| !c.agrees()) {
            disagreements += 1;
            warn!(
                item = %c.item_id,
                legacy = %c.legacy_status,
                optimized = %c.optimized_status,
                legacy_score = c.legacy_score,
                optimized_score = c.optimized_score,
                "strategies disagree"
            );
        }
        info!(total = comparisons.len(), disagreements, "strategy comparison complete");
        comparisons
    }
}
