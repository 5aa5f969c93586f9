//! Detection pipeline stages.
//!
//! - **Stats**: build per-metric batch statistics once ([`anomaly::BatchModel`]).
//! - **Classify**: map every item through the model, optionally on rayon.
//! - **Report**: summary counts, strategy comparison, brand benchmarks.

pub mod anomaly;
pub mod benchmark;
pub mod compare;
pub mod metrics;
