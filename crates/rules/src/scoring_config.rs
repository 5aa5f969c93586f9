//! EngagementScoring rule kind: metric weights, z-score blending, severity
//! bands, composite decision bands, small-sample fallback and legacy
//! detector thresholds.
//!
//! Every field has a serde default equal to the product-tuned constant of
//! the same name below, so an empty `spec:` (or no file at all) yields the
//! stock behaviour. The constants are behavioural contracts; tune them only
//! through a YAML override.

use serde::{Deserialize, Serialize};

use postpulse_core::MetricKind;

use crate::schema::RuleMetadata;

pub const KIND: &str = "EngagementScoring";

// ── Composite weights ───────────────────────────────────────────────

pub const WEIGHT_READ_COUNT: f64 = 0.35;
pub const WEIGHT_INTERACTION_COUNT: f64 = 0.25;
pub const WEIGHT_INTERACTION_RATE: f64 = 0.20;
pub const WEIGHT_PRODUCT_VISIT_COUNT: f64 = 0.12;
pub const WEIGHT_CONVERSION_RATE: f64 = 0.08;

// ── Z-score blending ────────────────────────────────────────────────

pub const PLAIN_Z_WEIGHT: f64 = 0.6;
pub const ROBUST_Z_WEIGHT: f64 = 0.4;
/// Scales MAD to the standard deviation of a normal distribution.
pub const MAD_CONSISTENCY: f64 = 0.6745;
/// Plain z-score used when the sample has no spread: ± this, by median side.
pub const MEDIAN_SIGN_Z: f64 = 0.5;

// ── Severity bands ──────────────────────────────────────────────────

pub const Z_SEVERE: f64 = 2.5;
pub const Z_MODERATE: f64 = 1.8;
pub const Z_MILD: f64 = 1.2;

pub const HIGH_PERCENTILE_SEVERE: f64 = 85.0;
pub const HIGH_PERCENTILE_MODERATE: f64 = 70.0;
pub const HIGH_PERCENTILE_MILD: f64 = 60.0;

pub const LOW_PERCENTILE_SEVERE: f64 = 15.0;
pub const LOW_PERCENTILE_MODERATE: f64 = 30.0;
pub const LOW_PERCENTILE_MILD: f64 = 40.0;

pub const IQR_MULTIPLIER: f64 = 1.5;
/// Minimum |z| for an IQR outlier to be promoted from NORMAL to MILD.
pub const IQR_PROMOTION_Z: f64 = 1.0;

pub const DEVIATION_LARGE_PCT: f64 = 100.0;
pub const DEVIATION_SIGNIFICANT_PCT: f64 = 50.0;
pub const DEVIATION_NOTICEABLE_PCT: f64 = 20.0;

// ── Composite decision bands ────────────────────────────────────────

pub const SCORE_Z_FACTOR: f64 = 2.0;
pub const SCORE_GOOD: f64 = 75.0;
pub const SCORE_BAD: f64 = 25.0;
pub const SCORE_LEANING_GOOD: f64 = 65.0;
pub const SCORE_LEANING_BAD: f64 = 35.0;
pub const SCORE_NEUTRAL: f64 = 50.0;
pub const SEVERE_MAJORITY: usize = 2;
pub const ANOMALY_MAJORITY: usize = 3;
pub const OPPOSING_TOLERANCE: usize = 1;

// ── Rate metrics ────────────────────────────────────────────────────

/// Items at or below this read count are left out of rate samples.
pub const RATE_MIN_READS: f64 = 50.0;

// ── Small-sample fallback ───────────────────────────────────────────

pub const FALLBACK_MIN_ITEMS: usize = 3;
pub const FALLBACK_HIGH_READS: f64 = 10_000.0;
pub const FALLBACK_SOLID_READS: f64 = 5_000.0;
pub const FALLBACK_FAIR_READS: f64 = 1_000.0;
pub const FALLBACK_LOW_READS: f64 = 500.0;
pub const FALLBACK_HIGH_SCORE: f64 = 80.0;
pub const FALLBACK_SOLID_SCORE: f64 = 65.0;
pub const FALLBACK_MIDDLE_SCORE: f64 = 50.0;
pub const FALLBACK_FAIR_SCORE: f64 = 40.0;
pub const FALLBACK_LOW_SCORE: f64 = 30.0;
pub const FALLBACK_RATE_BONUS_PCT: f64 = 8.0;
pub const FALLBACK_RATE_PENALTY_PCT: f64 = 2.0;
pub const FALLBACK_RATE_ADJUSTMENT: f64 = 10.0;

// ── Legacy detector ─────────────────────────────────────────────────

pub const LEGACY_Z_THRESHOLD: f64 = 2.0;
pub const LEGACY_IQR_MULTIPLIER: f64 = 1.5;
pub const LEGACY_INTERACTION_FACTOR: f64 = 10.0;
pub const LEGACY_SHARE_FACTOR: f64 = 20.0;
pub const LEGACY_GOOD_AVERAGE: f64 = 10_000.0;
pub const LEGACY_BAD_AVERAGE: f64 = 100.0;

// ── YAML-level types ────────────────────────────────────────────────

/// Top-level EngagementScoring rule document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngagementScoringRule {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: RuleMetadata,
    #[serde(default)]
    pub spec: EngagementScoringSpec,
}

/// Specification section of an EngagementScoring rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngagementScoringSpec {
    /// Composite weights for the five scored metrics (must sum to 1.0).
    pub weights: MetricWeights,
    /// Plain / robust z-score blending.
    pub z_score: ZScoreBlend,
    /// Per-metric severity bands.
    pub severity: SeverityBands,
    /// Composite score decision tree.
    pub composite: CompositeBands,
    /// Ratio metric sample restrictions.
    pub rates: RateParams,
    /// Absolute thresholds used when the batch is too small for statistics.
    pub fallback: FallbackParams,
    /// Thresholds for the sequential legacy detector.
    pub legacy: LegacyParams,
}

/// Composite weights, one per scored metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MetricWeights {
    pub read_count: f64,
    pub interaction_count: f64,
    pub interaction_rate: f64,
    pub product_visit_count: f64,
    pub conversion_rate: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            read_count: WEIGHT_READ_COUNT,
            interaction_count: WEIGHT_INTERACTION_COUNT,
            interaction_rate: WEIGHT_INTERACTION_RATE,
            product_visit_count: WEIGHT_PRODUCT_VISIT_COUNT,
            conversion_rate: WEIGHT_CONVERSION_RATE,
        }
    }
}

impl MetricWeights {
    /// Metrics scored by the composite classifier, in report order.
    pub const SCORED: [MetricKind; 5] = [
        MetricKind::ReadCount,
        MetricKind::InteractionCount,
        MetricKind::InteractionRate,
        MetricKind::ProductVisitCount,
        MetricKind::ConversionRate,
    ];

    /// Weight of a metric; `None` for metrics the composite does not score.
    pub fn get(&self, metric: MetricKind) -> Option<f64> {
        match metric {
            MetricKind::ReadCount => Some(self.read_count),
            MetricKind::InteractionCount => Some(self.interaction_count),
            MetricKind::InteractionRate => Some(self.interaction_rate),
            MetricKind::ProductVisitCount => Some(self.product_visit_count),
            MetricKind::ConversionRate => Some(self.conversion_rate),
            MetricKind::ShareCount | MetricKind::ProductWantCount => None,
        }
    }

    pub fn sum(&self) -> f64 {
        Self::SCORED.iter().filter_map(|m| self.get(*m)).sum()
    }
}

/// How plain and robust z-scores are blended for count metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ZScoreBlend {
    pub plain_weight: f64,
    pub robust_weight: f64,
    pub mad_consistency: f64,
    pub median_sign_z: f64,
}

impl Default for ZScoreBlend {
    fn default() -> Self {
        Self {
            plain_weight: PLAIN_Z_WEIGHT,
            robust_weight: ROBUST_Z_WEIGHT,
            mad_consistency: MAD_CONSISTENCY,
            median_sign_z: MEDIAN_SIGN_Z,
        }
    }
}

/// Three descending cut-offs, SEVERE first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Bands {
    pub severe: f64,
    pub moderate: f64,
    pub mild: f64,
}

/// Severity classification bands for a single metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SeverityBands {
    /// |z| strictly above these.
    pub z: Bands,
    /// Percentile at or above these (value above the comparison point).
    pub high_percentile: Bands,
    /// Percentile at or below these (value below the comparison point).
    pub low_percentile: Bands,
    pub iqr_multiplier: f64,
    pub iqr_promotion_z: f64,
    /// Deviation-text qualifiers: large / significant / noticeable.
    pub deviation_pct: Bands,
}

impl Default for SeverityBands {
    fn default() -> Self {
        Self {
            z: Bands {
                severe: Z_SEVERE,
                moderate: Z_MODERATE,
                mild: Z_MILD,
            },
            high_percentile: Bands {
                severe: HIGH_PERCENTILE_SEVERE,
                moderate: HIGH_PERCENTILE_MODERATE,
                mild: HIGH_PERCENTILE_MILD,
            },
            low_percentile: Bands {
                severe: LOW_PERCENTILE_SEVERE,
                moderate: LOW_PERCENTILE_MODERATE,
                mild: LOW_PERCENTILE_MILD,
            },
            iqr_multiplier: IQR_MULTIPLIER,
            iqr_promotion_z: IQR_PROMOTION_Z,
            deviation_pct: Bands {
                severe: DEVIATION_LARGE_PCT,
                moderate: DEVIATION_SIGNIFICANT_PCT,
                mild: DEVIATION_NOTICEABLE_PCT,
            },
        }
    }
}

/// Composite score bands and per-metric vote thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CompositeBands {
    pub z_score_factor: f64,
    pub good: f64,
    pub bad: f64,
    pub leaning_good: f64,
    pub leaning_bad: f64,
    pub neutral: f64,
    pub severe_majority: usize,
    pub anomaly_majority: usize,
    pub opposing_tolerance: usize,
}

impl Default for CompositeBands {
    fn default() -> Self {
        Self {
            z_score_factor: SCORE_Z_FACTOR,
            good: SCORE_GOOD,
            bad: SCORE_BAD,
            leaning_good: SCORE_LEANING_GOOD,
            leaning_bad: SCORE_LEANING_BAD,
            neutral: SCORE_NEUTRAL,
            severe_majority: SEVERE_MAJORITY,
            anomaly_majority: ANOMALY_MAJORITY,
            opposing_tolerance: OPPOSING_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RateParams {
    pub min_reads: f64,
}

impl Default for RateParams {
    fn default() -> Self {
        Self {
            min_reads: RATE_MIN_READS,
        }
    }
}

/// Absolute read-count bands for batches too small for statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackParams {
    /// Fewer items than this with a positive read count triggers the fallback.
    pub min_items: usize,
    pub high_reads: f64,
    pub solid_reads: f64,
    pub fair_reads: f64,
    pub low_reads: f64,
    pub high_score: f64,
    pub solid_score: f64,
    pub middle_score: f64,
    pub fair_score: f64,
    pub low_score: f64,
    pub rate_bonus_pct: f64,
    pub rate_penalty_pct: f64,
    pub rate_adjustment: f64,
}

impl Default for FallbackParams {
    fn default() -> Self {
        Self {
            min_items: FALLBACK_MIN_ITEMS,
            high_reads: FALLBACK_HIGH_READS,
            solid_reads: FALLBACK_SOLID_READS,
            fair_reads: FALLBACK_FAIR_READS,
            low_reads: FALLBACK_LOW_READS,
            high_score: FALLBACK_HIGH_SCORE,
            solid_score: FALLBACK_SOLID_SCORE,
            middle_score: FALLBACK_MIDDLE_SCORE,
            fair_score: FALLBACK_FAIR_SCORE,
            low_score: FALLBACK_LOW_SCORE,
            rate_bonus_pct: FALLBACK_RATE_BONUS_PCT,
            rate_penalty_pct: FALLBACK_RATE_PENALTY_PCT,
            rate_adjustment: FALLBACK_RATE_ADJUSTMENT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LegacyParams {
    pub z_threshold: f64,
    pub iqr_multiplier: f64,
    pub interaction_factor: f64,
    pub share_factor: f64,
    pub good_average: f64,
    pub bad_average: f64,
}

impl Default for LegacyParams {
    fn default() -> Self {
        Self {
            z_threshold: LEGACY_Z_THRESHOLD,
            iqr_multiplier: LEGACY_IQR_MULTIPLIER,
            interaction_factor: LEGACY_INTERACTION_FACTOR,
            share_factor: LEGACY_SHARE_FACTOR,
            good_average: LEGACY_GOOD_AVERAGE,
            bad_average: LEGACY_BAD_AVERAGE,
        }
    }
}

// ── Compiled (hot-path) types ───────────────────────────────────────

/// Pre-compiled scoring config. All fields are already typed.
pub type CompiledScoringConfig = EngagementScoringSpec;

impl EngagementScoringRule {
    /// Compile the YAML config. The `spec` section is already typed, so this is a clone.
    pub fn compile(&self) -> CompiledScoringConfig {
        self.spec.clone()
    }
}
