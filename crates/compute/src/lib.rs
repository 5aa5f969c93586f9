//! Engagement anomaly detection engine.
//!
//! [`DetectionEngine`] classifies every item of a batch as NORMAL,
//! GOOD_ANOMALY or BAD_ANOMALY relative to the rest of the batch, using
//! either the robust-statistics composite path or the legacy threshold
//! rules ([`postpulse_core::DetectionStrategy`]).

pub mod engine;
pub mod pipeline;
pub mod types;

pub use engine::DetectionEngine;
pub use pipeline::benchmark::{brand_benchmarks, BrandBenchmark};
pub use pipeline::compare::StrategyComparison;
pub use pipeline::metrics::BatchTiming;
pub use types::{
    AnomalyLevel, AnomalyReport, AnomalyStatus, BatchReport, BatchSummary, ItemReport,
    MetricResult, ReportBasis,
};
