//! Checks for the EngagementScoring rule kind.

use super::fuzzy::{fuzzy_match, is_kebab_case};
use super::ValidationResult;

use crate::scoring_config::{Bands, EngagementScoringRule, EngagementScoringSpec, MetricWeights, KIND};

/// Weight sums further than this from 1.0 are rejected.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

pub(super) fn validate_header(rule: &EngagementScoringRule, result: &mut ValidationResult) {
    if rule.api_version != "v1" {
        result.error(
            "apiVersion",
            format!("apiVersion must be 'v1', got '{}'", rule.api_version),
        );
    }
    if rule.kind != KIND {
        match fuzzy_match(&rule.kind, &[KIND]) {
            Some(s) => result.error_with_suggestion(
                "kind",
                format!("kind must be '{}', got '{}'", KIND, rule.kind),
                format!("did you mean '{}'?", s),
            ),
            None => result.error("kind", format!("kind must be '{}', got '{}'", KIND, rule.kind)),
        }
    }
    if !is_kebab_case(&rule.metadata.id) {
        result.error(
            "metadata.id",
            format!(
                "id must be kebab-case (lowercase alphanumeric + hyphens), got '{}'",
                rule.metadata.id
            ),
        );
    }
}

pub(super) fn validate_weights(spec: &EngagementScoringSpec, result: &mut ValidationResult) {
    let w = &spec.weights;
    for metric in MetricWeights::SCORED {
        if let Some(weight) = w.get(metric) {
            if !weight.is_finite() || weight < 0.0 {
                result.error(
                    format!("spec.weights.{}", metric),
                    format!("weight must be a non-negative number, got {}", weight),
                );
            }
        }
    }

    let sum = w.sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        result.error(
            "spec.weights",
            format!("metric weights sum to {:.6} (expected 1.0)", sum),
        );
    }

    let blend = &spec.z_score;
    if ((blend.plain_weight + blend.robust_weight) - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        result.warn(
            "spec.z_score",
            format!(
                "plain_weight + robust_weight = {:.3}; blended z-scores are not normalized",
                blend.plain_weight + blend.robust_weight
            ),
        );
    }
}

fn descending(bands: &Bands) -> bool {
    bands.severe > bands.moderate && bands.moderate > bands.mild
}

fn ascending(bands: &Bands) -> bool {
    bands.severe < bands.moderate && bands.moderate < bands.mild
}

fn in_percentile_range(bands: &Bands) -> bool {
    [bands.severe, bands.moderate, bands.mild]
        .iter()
        .all(|p| (0.0..=100.0).contains(p))
}

pub(super) fn validate_bands(spec: &EngagementScoringSpec, result: &mut ValidationResult) {
    let s = &spec.severity;
    if !descending(&s.z) {
        result.error(
            "spec.severity.z",
            format!(
                "z bands must be descending: severe({}) > moderate({}) > mild({})",
                s.z.severe, s.z.moderate, s.z.mild
            ),
        );
    }
    if !descending(&s.high_percentile) || !in_percentile_range(&s.high_percentile) {
        result.error(
            "spec.severity.high_percentile",
            "high percentile bands must be descending and within [0, 100]",
        );
    }
    if !ascending(&s.low_percentile) || !in_percentile_range(&s.low_percentile) {
        result.error(
            "spec.severity.low_percentile",
            "low percentile bands must be ascending and within [0, 100]",
        );
    }
    if !descending(&s.deviation_pct) {
        result.error(
            "spec.severity.deviation_pct",
            "deviation qualifiers must be descending: large > significant > noticeable",
        );
    }

    let c = &spec.composite;
    if !(c.bad <= c.leaning_bad && c.leaning_bad < c.leaning_good && c.leaning_good <= c.good) {
        result.error(
            "spec.composite",
            format!(
                "score bands must be ordered: bad({}) <= leaning_bad({}) < leaning_good({}) <= good({})",
                c.bad, c.leaning_bad, c.leaning_good, c.good
            ),
        );
    }
    if !(0.0..=100.0).contains(&c.neutral) {
        result.error("spec.composite.neutral", "neutral score must be within [0, 100]");
    }
    if spec.rates.min_reads < 0.0 {
        result.error("spec.rates.min_reads", "minimum read floor cannot be negative");
    }
}

pub(super) fn validate_fallback(spec: &EngagementScoringSpec, result: &mut ValidationResult) {
    let f = &spec.fallback;
    if !(f.low_reads <= f.fair_reads && f.fair_reads <= f.solid_reads && f.solid_reads <= f.high_reads) {
        result.error(
            "spec.fallback",
            format!(
                "read bands must be ascending: low({}) <= fair({}) <= solid({}) <= high({})",
                f.low_reads, f.fair_reads, f.solid_reads, f.high_reads
            ),
        );
    }
    if f.min_items == 0 {
        result.warn(
            "spec.fallback.min_items",
            "min_items = 0 disables the small-sample fallback entirely",
        );
    }
    if spec.legacy.bad_average >= spec.legacy.good_average {
        result.error(
            "spec.legacy",
            format!(
                "bad_average({}) must be below good_average({})",
                spec.legacy.bad_average, spec.legacy.good_average
            ),
        );
    }
}
