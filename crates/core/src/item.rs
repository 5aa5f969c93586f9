use std::io::Read;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PulseError;

/// Identifier of a content item, as assigned by the ingestion layer.
pub type ItemId = String;

/// A single social-content post with its engagement counters.
///
/// Counters are optional: spreadsheets routinely leave cells empty, and the
/// crawler only fills in what it could scrape. Absent counters are excluded
/// from batch samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: ItemId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub publish_time: Option<DateTime<Utc>>,

    // 7-day window
    #[serde(default)]
    pub read_count: Option<i64>,
    #[serde(default)]
    pub interaction_count: Option<i64>,
    #[serde(default)]
    pub share_count: Option<i64>,
    #[serde(default)]
    pub product_visit_count: Option<i64>,
    #[serde(default)]
    pub product_want_count: Option<i64>,

    // 14-day window (carried through, not scored)
    #[serde(default, rename = "readCount14d")]
    pub read_count_14d: Option<i64>,
    #[serde(default, rename = "interactionCount14d")]
    pub interaction_count_14d: Option<i64>,
    #[serde(default, rename = "shareCount14d")]
    pub share_count_14d: Option<i64>,
    #[serde(default, rename = "productWantCount14d")]
    pub product_want_count_14d: Option<i64>,
}

impl ContentItem {
    /// Create an item with only an id; counters start absent.
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_reads(mut self, reads: i64) -> Self {
        self.read_count = Some(reads);
        self
    }

    pub fn with_interactions(mut self, interactions: i64) -> Self {
        self.interaction_count = Some(interactions);
        self
    }

    pub fn with_shares(mut self, shares: i64) -> Self {
        self.share_count = Some(shares);
        self
    }

    pub fn with_product_visits(mut self, visits: i64) -> Self {
        self.product_visit_count = Some(visits);
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Read-count if present and strictly positive.
    pub fn usable_reads(&self) -> Option<f64> {
        self.read_count.filter(|&v| v > 0).map(|v| v as f64)
    }

    /// Decode a JSON array of items.
    ///
    /// An empty array is rejected: the engine classifies items relative to
    /// their batch, and an empty batch has nothing to compare against.
    pub fn read_batch<R: Read>(reader: R) -> Result<Vec<ContentItem>, PulseError> {
        let items: Vec<ContentItem> =
            serde_json::from_reader(reader).map_err(|e| PulseError::Serialize(e.to_string()))?;
        if items.is_empty() {
            return Err(PulseError::EmptyBatch);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case_fields() {
        let json = r#"[
            {"id": "a1", "brand": "Acme", "readCount": 1200, "interactionCount": 80,
             "readCount14d": 2000, "productVisitCount": 12}
        ]"#;
        let items = ContentItem::read_batch(json.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.id, "a1");
        assert_eq!(item.brand.as_deref(), Some("Acme"));
        assert_eq!(item.read_count, Some(1200));
        assert_eq!(item.read_count_14d, Some(2000));
        assert_eq!(item.product_visit_count, Some(12));
        assert_eq!(item.share_count, None);
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err = ContentItem::read_batch("[]".as_bytes()).unwrap_err();
        assert!(matches!(err, PulseError::EmptyBatch));
    }

    #[test]
    fn malformed_json_is_a_serialize_error() {
        let err = ContentItem::read_batch("{not json".as_bytes()).unwrap_err();
        assert!(matches!(err, PulseError::Serialize(_)));
    }

    #[test]
    fn usable_reads_requires_positive_count() {
        assert_eq!(ContentItem::new("x").usable_reads(), None);
        assert_eq!(ContentItem::new("x").with_reads(0).usable_reads(), None);
        assert_eq!(ContentItem::new("x").with_reads(-3).usable_reads(), None);
        assert_eq!(ContentItem::new("x").with_reads(40).usable_reads(), Some(40.0));
    }
}
