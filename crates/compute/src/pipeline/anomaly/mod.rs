//! Anomaly detection pipeline: batch statistics, evaluators and classifiers.
//!
//! Sub-modules:
//! - [`population`]: sample statistics (mean, std-dev, median, MAD, quartiles)
//! - [`evaluator`]: per-metric count and rate evaluators
//! - [`severity`]: level bands and deviation text
//! - [`composite`]: weighted multi-metric classification
//! - [`fallback`]: absolute read-count bands for small batches
//! - [`legacy`]: sequential threshold rules folded by priority

pub mod composite;
pub mod evaluator;
pub mod fallback;
pub mod legacy;
pub mod population;
pub mod severity;

use tracing::debug;

use postpulse_core::{ContentItem, DetectionStrategy};
use postpulse_rules::scoring_config::{CompiledScoringConfig, MetricWeights};

use crate::types::{AnomalyReport, ReportBasis};

pub use composite::CompositeClassifier;
pub use evaluator::{ItemEvaluator, MetricEvaluator, RateMetricEvaluator};
pub use fallback::AbsoluteThresholdClassifier;
pub use legacy::LegacyDetector;
pub use population::SampleStats;

/// Statistical path: one evaluator per scored metric plus the composite.
pub struct StatisticalModel {
    evaluators: Vec<Box<dyn ItemEvaluator>>,
    classifier: CompositeClassifier,
}

impl StatisticalModel {
    pub fn new(batch: &[ContentItem], config: &CompiledScoringConfig) -> Self {
        let evaluators = MetricWeights::SCORED
            .iter()
            .map(|&metric| evaluator::evaluator_for(metric, batch, config))
            .collect();
        Self {
            evaluators,
            classifier: CompositeClassifier::new(config.weights.clone(), config.composite.clone()),
        }
    }

    pub fn classify(&self, target: &ContentItem) -> AnomalyReport {
        let results = self.evaluators.iter().map(|e| e.evaluate(target)).collect();
        self.classifier.classify(results)
    }
}

/// Everything derived from a batch before any item is classified.
///
/// Built once per batch and strategy; classification only reads it, so one
/// model serves every item and every rayon worker.
pub enum BatchModel {
    Statistical(StatisticalModel),
    AbsoluteThreshold(AbsoluteThresholdClassifier),
    Legacy(LegacyDetector),
}

impl BatchModel {
    pub fn build(batch: &[ContentItem], strategy: DetectionStrategy, config: &CompiledScoringConfig) -> Self {
        let model = match strategy {
            DetectionStrategy::Legacy => BatchModel::Legacy(LegacyDetector::new(batch, config)),
            DetectionStrategy::Optimized if fallback::needs_fallback(batch, &config.fallback) => {
                BatchModel::AbsoluteThreshold(AbsoluteThresholdClassifier::new(config.fallback.clone()))
            }
            DetectionStrategy::Optimized => BatchModel::Statistical(StatisticalModel::new(batch, config)),
        };
        debug!(items = batch.len(), %strategy, basis = ?model.basis(), "batch model built");
        model
    }

    pub fn basis(&self) -> ReportBasis {
        match self {
            BatchModel::Statistical(_) => ReportBasis::Statistical,
            BatchModel::AbsoluteThreshold(_) => ReportBasis::AbsoluteThreshold,
            BatchModel::Legacy(_) => ReportBasis::LegacyThreshold,
        }
    }

    pub fn classify(&self, target: &ContentItem) -> AnomalyReport {
        match self {
            BatchModel::Statistical(m) => m.classify(target),
            BatchModel::AbsoluteThreshold(c) => c.classify(target),
            BatchModel::Legacy(d) => d.classify(target),
        }
    }
}
