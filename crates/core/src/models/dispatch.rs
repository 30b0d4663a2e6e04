//! Persisted dispatch models.
//!
//! The persistence service stores one detail row per batch it debited. A
//! [`Dispatch`] is the header plus those flat rows; [`DispatchSummary`] is the
//! per-product view rebuilt from them by [`crate::aggregate::group`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::catalog::NO_BATCH_LABEL;
use crate::types::{DetailId, DispatchId, InventoryId, ProductCode, ServiceId, UserId};

/// A persisted dispatch: header plus per-batch detail rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    /// Dispatch ID.
    pub id: DispatchId,
    /// Date the dispatch was recorded.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Receiving hospital service, if any.
    #[serde(default)]
    pub service_id: Option<ServiceId>,
    /// Receiving service display name.
    #[serde(default)]
    pub service_name: Option<String>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// User who submitted the dispatch.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// One row per debited batch. Listings may omit them.
    #[serde(default)]
    pub details: Vec<DispatchRecord>,
}

/// One batch debited by a dispatch (flat, batch-granular row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRecord {
    /// Detail row ID.
    pub detail_id: DetailId,
    /// Inventory row (batch) debited.
    pub inventory_id: InventoryId,
    /// Product code.
    pub product_code: ProductCode,
    /// Product name.
    pub product_name: String,
    /// Product characteristics.
    #[serde(default)]
    pub features: String,
    /// Product presentation.
    #[serde(default)]
    pub presentation: String,
    /// Unit of measure.
    #[serde(default)]
    pub unit: String,
    /// Batch code, if the batch had one.
    #[serde(default)]
    pub batch_label: Option<String>,
    /// Batch expiry date.
    #[serde(default)]
    pub expiry: Option<NaiveDate>,
    /// Units debited from this batch.
    pub qty: i64,
    /// Unit price of the batch.
    pub unit_price: Decimal,
    /// Line value as recorded by the server.
    pub line_total: Decimal,
}

/// A batch-level line inside a [`DispatchSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLine {
    /// Detail row ID.
    pub detail_id: DetailId,
    /// Inventory row (batch) debited.
    pub inventory_id: InventoryId,
    /// Batch label, [`NO_BATCH_LABEL`] when the batch had no code.
    pub batch_label: String,
    /// Batch expiry date.
    pub expiry: Option<NaiveDate>,
    /// Units debited.
    pub qty: i64,
    /// Unit price.
    pub unit_price: Decimal,
    /// Line value.
    pub line_total: Decimal,
}

impl From<&DispatchRecord> for BatchLine {
    fn from(record: &DispatchRecord) -> Self {
        let batch_label = match record.batch_label.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => NO_BATCH_LABEL.to_string(),
        };
        Self {
            detail_id: record.detail_id,
            inventory_id: record.inventory_id,
            batch_label,
            expiry: record.expiry,
            qty: record.qty,
            unit_price: record.unit_price,
            line_total: record.line_total,
        }
    }
}

/// Per-product view of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    /// Product code.
    pub product_code: ProductCode,
    /// Product name.
    pub product_name: String,
    /// Product characteristics.
    pub features: String,
    /// Product presentation.
    pub presentation: String,
    /// Unit of measure.
    pub unit: String,
    /// Units dispatched across all batches.
    pub total_qty: i64,
    /// Sum of the batch line values.
    pub total_line_value: Decimal,
    /// Batch lines in record order.
    pub batch_lines: Vec<BatchLine>,
}

/// A `{product_code, qty}` pair sent when creating a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product code.
    pub product_code: ProductCode,
    /// Requested units.
    pub qty: i64,
}

/// Paging metadata returned by the dispatch listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page (1-indexed).
    #[serde(default)]
    pub page: u32,
    /// Page size.
    #[serde(default)]
    pub limit: u32,
    /// Total number of dispatches matching the filters.
    #[serde(default)]
    pub total: u64,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
}

/// One page of dispatches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchPage {
    /// Dispatches on this page.
    #[serde(default)]
    pub records: Vec<Dispatch>,
    /// Paging metadata.
    #[serde(default)]
    pub pagination: Pagination,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_dispatch_deserializes() {
        let json = r#"{
            "id": 42,
            "date": "2026-10-19",
            "service_id": 3,
            "notes": null,
            "details": [{
                "detail_id": 1,
                "inventory_id": 10,
                "product_code": 101,
                "product_name": "Gauze",
                "batch_label": "L-9",
                "qty": 4,
                "unit_price": "2.5",
                "line_total": "10.0"
            }]
        }"#;

        let dispatch: Dispatch = serde_json::from_str(json).unwrap();
        assert_eq!(dispatch.id, DispatchId::new(42));
        assert_eq!(dispatch.service_id, Some(ServiceId::new(3)));
        assert_eq!(dispatch.details.len(), 1);
        assert_eq!(dispatch.details[0].line_total, dec!(10.0));
    }

    #[test]
    fn test_batch_line_uses_sentinel_for_missing_label() {
        let record = DispatchRecord {
            detail_id: DetailId::new(1),
            inventory_id: InventoryId::new(2),
            product_code: ProductCode::new(3),
            product_name: "Gloves".to_string(),
            features: String::new(),
            presentation: String::new(),
            unit: String::new(),
            batch_label: Some(String::new()),
            expiry: None,
            qty: 1,
            unit_price: dec!(1),
            line_total: dec!(1),
        };
        assert_eq!(BatchLine::from(&record).batch_label, NO_BATCH_LABEL);
    }
}
