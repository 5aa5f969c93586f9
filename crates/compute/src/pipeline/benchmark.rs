//! Per-brand engagement averages and top performers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use postpulse_core::{ContentItem, ItemId};

use crate::types::{AnomalyStatus, ItemReport};

/// Aggregates for one brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandBenchmark {
    pub brand: String,
    pub item_count: usize,
    /// `None` when no item of the brand reports the counter.
    pub avg_reads: Option<f64>,
    pub avg_interactions: Option<f64>,
    pub avg_shares: Option<f64>,
    /// GOOD_ANOMALY items, most reads first.
    pub top_good: Vec<ItemId>,
}

#[derive(Default)]
struct Accumulator<'a> {
    items: usize,
    reads: Vec<i64>,
    interactions: Vec<i64>,
    shares: Vec<i64>,
    good: Vec<&'a ContentItem>,
}

fn average(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        // Summed as f64: counters are unbounded and an i64 sum can overflow.
        Some(values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64)
    }
}

/// Group `batch` by brand in first-seen order.
///
/// `reports` must be in batch order, as returned by `detect`. Items without
/// a brand are left out.
pub fn brand_benchmarks(batch: &[ContentItem], reports: &[ItemReport], limit: usize) -> Vec<BrandBenchmark> {
    let mut brands: IndexMap<&str, Accumulator<'_>> = IndexMap::new();

    for (item, report) in batch.iter().zip(reports) {
        if item.id != report.item_id {
            warn!(item = %item.id, report = %report.item_id, "report out of batch order, skipping");
            continue;
        }
        let Some(brand) = item.brand.as_deref().filter(|b| !b.is_empty()) else {
            continue;
        };
        let acc = brands.entry(brand).or_default();
        acc.items += 1;
        acc.reads.extend(item.read_count.filter(|v| *v >= 0));
        acc.interactions.extend(item.interaction_count.filter(|v| *v >= 0));
        acc.shares.extend(item.share_count.filter(|v| *v >= 0));
        if report.report.overall_status == AnomalyStatus::GoodAnomaly {
            acc.good.push(item);
        }
    }

    brands
        .into_iter()
        .map(|(brand, mut acc)| {
            acc.good
                .sort_by_key(|item| std::cmp::Reverse(item.read_count.unwrap_or(0)));
            BrandBenchmark {
                brand: brand.to_string(),
                item_count: acc.items,
                avg_reads: average(&acc.reads),
                avg_interactions: average(&acc.interactions),
                avg_shares: average(&acc.shares),
                top_good: acc.good.iter().take(limit).map(|i| i.id.clone()).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnomalyReport, ReportBasis};

    fn report(id: &str, status: AnomalyStatus) -> ItemReport {
        ItemReport {
            item_id: id.to_string(),
            report: AnomalyReport {
                results: Vec::new(),
                overall_status: status,
                overall_score: 50.0,
                basis: ReportBasis::Statistical,
            },
        }
    }

    #[test]
    fn groups_in_first_seen_order_with_top_good() {
        let batch = vec![
            ContentItem::new("a1").with_brand("Acme").with_reads(100).with_shares(4),
            ContentItem::new("b1").with_brand("Bolt").with_reads(900),
            ContentItem::new("a2").with_brand("Acme").with_reads(300).with_interactions(30),
            ContentItem::new("a3").with_brand("Acme").with_reads(500),
            ContentItem::new("x").with_reads(10_000),
        ];
        let reports = vec![
            report("a1", AnomalyStatus::GoodAnomaly),
            report("b1", AnomalyStatus::Normal),
            report("a2", AnomalyStatus::GoodAnomaly),
            report("a3", AnomalyStatus::GoodAnomaly),
            report("x", AnomalyStatus::GoodAnomaly),
        ];

        let out = brand_benchmarks(&batch, &reports, 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].brand, "Acme");
        assert_eq!(out[0].item_count, 3);
        assert_eq!(out[0].avg_reads, Some(300.0));
        assert_eq!(out[0].avg_interactions, Some(30.0));
        assert_eq!(out[0].avg_shares, Some(4.0));
        assert_eq!(out[0].top_good, vec!["a3".to_string(), "a2".to_string()]);

        assert_eq!(out[1].brand, "Bolt");
        assert!(out[1].top_good.is_empty());
        assert_eq!(out[1].avg_shares, None);
    }

    #[test]
    fn huge_counters_average_without_overflow() {
        let base = i64::MAX / 2;
        let batch: Vec<_> = (0..4)
            .map(|i| ContentItem::new(format!("a{i}")).with_brand("Acme").with_reads(base + i))
            .collect();
        let reports: Vec<_> = batch
            .iter()
            .map(|item| report(&item.id, AnomalyStatus::Normal))
            .collect();

        let out = brand_benchmarks(&batch, &reports, 5);
        let avg = out[0].avg_reads.unwrap();
        let expected = base as f64 + 1.5;
        assert!((avg - expected).abs() / expected < 1e-12, "avg {avg}");
    }

    #[test]
    fn misaligned_reports_are_skipped() {
        let batch = vec![ContentItem::new("a").with_brand("Acme").with_reads(1)];
        let reports = vec![report("zzz", AnomalyStatus::Normal)];
        assert!(brand_benchmarks(&batch, &reports, 5).is_empty());
    }
}
