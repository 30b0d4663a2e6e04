//! Lot allocation forecast.
//!
//! Predicts how a requested quantity would be drawn down across a product's
//! batches. Batches are consumed greedily in the order the catalog delivered
//! them; the order is trusted as-is and never re-sorted (by expiry or
//! otherwise). The forecast is display-only: the persistence service decides
//! which batches are actually debited.
//!
//! [`AllocationCache`] memoizes the last plan per product. A hit requires the
//! exact same requested quantity; any other quantity recomputes and replaces
//! the entry. Callers invalidate entries when the product's cart item changes
//! and drop everything when the catalog is refreshed.

use std::sync::Arc;

use chrono::NaiveDate;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Batch, Product};
use crate::types::{InventoryId, ProductCode};

/// Maximum number of products with a memoized plan.
const CACHE_CAPACITY: u64 = 1_000;

/// How one batch would be consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionPlanEntry {
    /// Inventory row of the batch.
    pub inventory_id: InventoryId,
    /// Batch label (sentinel when the batch has no code).
    pub batch_label: String,
    /// Batch expiry.
    pub expiry: Option<NaiveDate>,
    /// Whether the batch came under a commitment letter.
    pub commitment_letter: bool,
    /// Units available before the allocation.
    pub available_qty: i64,
    /// Units drawn from this batch.
    pub allocated_qty: i64,
    /// Units left in the batch afterwards.
    pub remaining_qty: i64,
}

/// Compute the greedy consumption plan for `requested_qty` units.
///
/// Emits one entry per batch, in input order, including batches that end up
/// untouched. Quantity beyond what the batches hold is left unallocated.
#[must_use]
pub fn allocate(batches: &[Batch], requested_qty: i64) -> Vec<ConsumptionPlanEntry> {
    let mut remaining = requested_qty.max(0);

    batches
        .iter()
        .map(|batch| {
            let available_qty = batch.available();
            let allocated_qty = remaining.min(available_qty);
            remaining -= allocated_qty;

            ConsumptionPlanEntry {
                inventory_id: batch.inventory_id,
                batch_label: batch.label().to_string(),
                expiry: batch.expiry,
                commitment_letter: batch.commitment_letter,
                available_qty,
                allocated_qty,
                remaining_qty: available_qty - allocated_qty,
            }
        })
        .collect()
}

/// A memoized plan and the quantity it was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionPlan {
    /// Quantity the plan was computed for.
    pub requested_qty: i64,
    /// Per-batch entries in batch order.
    pub entries: Vec<ConsumptionPlanEntry>,
}

impl ConsumptionPlan {
    /// Compute a fresh plan.
    #[must_use]
    pub fn compute(batches: &[Batch], requested_qty: i64) -> Self {
        Self {
            requested_qty,
            entries: allocate(batches, requested_qty),
        }
    }

    /// Units covered by the batches.
    #[must_use]
    pub fn total_allocated(&self) -> i64 {
        self.entries.iter().map(|e| e.allocated_qty).sum()
    }

    /// Units the batches cannot cover.
    #[must_use]
    pub fn shortfall(&self) -> i64 {
        (self.requested_qty.max(0) - self.total_allocated()).max(0)
    }
}

/// Per-product memo of the last computed [`ConsumptionPlan`].
pub struct AllocationCache {
    plans: Cache<ProductCode, Arc<ConsumptionPlan>>,
}

impl AllocationCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plans: Cache::builder().max_capacity(CACHE_CAPACITY).build(),
        }
    }

    /// Plan for `product` at `requested_qty`, reusing the memo when the
    /// quantity matches exactly.
    pub fn plan(&self, product: &Product, requested_qty: i64) -> Arc<ConsumptionPlan> {
        if let Some(cached) = self.plans.get(&product.code)
            && cached.requested_qty == requested_qty
        {
            debug!(product = %product.code, requested_qty, "allocation cache hit");
            return cached;
        }

        debug!(product = %product.code, requested_qty, "computing allocation plan");
        let plan = Arc::new(ConsumptionPlan::compute(&product.batches, requested_qty));
        self.plans.insert(product.code, Arc::clone(&plan));
        plan
    }

    /// Memoized plan for `code`, if any.
    #[must_use]
    pub fn lookup(&self, code: ProductCode) -> Option<Arc<ConsumptionPlan>> {
        self.plans.get(&code)
    }

    /// Drop the memo for one product.
    pub fn invalidate(&self, code: ProductCode) {
        self.plans.invalidate(&code);
    }

    /// Drop every memo (catalog refresh).
    pub fn invalidate_all(&self) {
        self.plans.invalidate_all();
    }
}

// A clone starts empty so two carts never share memoized plans.
impl Clone for AllocationCache {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl Default for AllocationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AllocationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocationCache")
            .field("entries", &self.plans.entry_count())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::NO_BATCH_LABEL;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn batch(id: i64, quantity: i64, price: Decimal) -> Batch {
        Batch {
            inventory_id: InventoryId::new(id),
            code: Some(format!("L-{id}")),
            expiry: None,
            quantity,
            unit_price: price,
            commitment_letter: false,
        }
    }

    fn scenario_product() -> Product {
        Product {
            code: ProductCode::new(1),
            name: "Saline 500ml".to_string(),
            features: String::new(),
            presentation: "Bag".to_string(),
            unit: "u".to_string(),
            total_stock: 10,
            batches: vec![batch(1, 6, dec!(20)), batch(2, 4, dec!(30))],
        }
    }

    #[test]
    fn test_greedy_allocation_in_batch_order() {
        let plan = allocate(&scenario_product().batches, 8);

        assert_eq!(plan.len(), 2);
        assert_eq!((plan[0].allocated_qty, plan[0].remaining_qty), (6, 0));
        assert_eq!((plan[1].allocated_qty, plan[1].remaining_qty), (2, 2));
    }

    #[test]
    fn test_untouched_batches_are_still_listed() {
        let plan = allocate(&scenario_product().batches, 3);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].allocated_qty, 3);
        assert_eq!(plan[1].allocated_qty, 0);
        assert_eq!(plan[1].remaining_qty, 4);
    }

    #[test]
    fn test_excess_request_is_left_unallocated() {
        let plan = ConsumptionPlan::compute(&scenario_product().batches, 15);
        assert_eq!(plan.total_allocated(), 10);
        assert_eq!(plan.shortfall(), 5);
    }

    #[test]
    fn test_input_order_is_trusted_over_expiry() {
        let mut later = batch(1, 5, dec!(1));
        later.expiry = NaiveDate::from_ymd_opt(2030, 1, 1);
        let mut sooner = batch(2, 5, dec!(1));
        sooner.expiry = NaiveDate::from_ymd_opt(2026, 1, 1);

        let plan = allocate(&[later, sooner], 5);
        assert_eq!(plan[0].inventory_id, InventoryId::new(1));
        assert_eq!(plan[0].allocated_qty, 5);
        assert_eq!(plan[1].allocated_qty, 0);
    }

    #[test]
    fn test_unlabelled_batch_participates() {
        let mut unlabelled = batch(1, 2, dec!(1));
        unlabelled.code = None;

        let plan = allocate(&[unlabelled, batch(2, 2, dec!(1))], 3);
        assert_eq!(plan[0].batch_label, NO_BATCH_LABEL);
        assert_eq!(plan[0].allocated_qty, 2);
        assert_eq!(plan[1].allocated_qty, 1);
    }

    #[test]
    fn test_negative_request_allocates_nothing() {
        let plan = ConsumptionPlan::compute(&scenario_product().batches, -4);
        assert_eq!(plan.total_allocated(), 0);
        assert_eq!(plan.shortfall(), 0);
    }

    #[test]
    fn test_cache_hit_returns_same_plan() {
        let cache = AllocationCache::new();
        let product = scenario_product();

        let first = cache.plan(&product, 8);
        let second = cache.plan(&product, 8);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cache_recomputes_on_quantity_change() {
        let cache = AllocationCache::new();
        let product = scenario_product();

        let first = cache.plan(&product, 8);
        let second = cache.plan(&product, 9);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.requested_qty, 9);
        assert_eq!(cache.lookup(product.code).unwrap().requested_qty, 9);
    }

    #[test]
    fn test_cache_invalidation() {
        let cache = AllocationCache::new();
        let product = scenario_product();

        let first = cache.plan(&product, 8);
        cache.invalidate(product.code);
        assert!(cache.lookup(product.code).is_none());

        let second = cache.plan(&product, 8);
        assert!(!Arc::ptr_eq(&first, &second));

        cache.invalidate_all();
        assert!(cache.lookup(product.code).is_none());
    }

    fn batches_strategy() -> impl Strategy<Value = Vec<Batch>> {
        prop::collection::vec(0_i64..500, 0..8).prop_map(|quantities| {
            quantities
                .into_iter()
                .enumerate()
                .map(|(i, qty)| batch(i64::try_from(i).unwrap(), qty, dec!(1)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn allocation_conserves_quantity(batches in batches_strategy(), requested in 0_i64..5_000) {
            let plan = allocate(&batches, requested);
            let available: i64 = batches.iter().map(|b| b.quantity).sum();
            let allocated: i64 = plan.iter().map(|e| e.allocated_qty).sum();
            prop_assert_eq!(allocated, requested.min(available));
        }

        #[test]
        fn allocation_respects_each_batch(batches in batches_strategy(), requested in 0_i64..5_000) {
            let plan = allocate(&batches, requested);
            prop_assert_eq!(plan.len(), batches.len());
            for (entry, batch) in plan.iter().zip(&batches) {
                prop_assert!(entry.allocated_qty <= batch.quantity);
                prop_assert_eq!(entry.remaining_qty, batch.quantity - entry.allocated_qty);
            }
        }

        #[test]
        fn allocation_is_idempotent(batches in batches_strategy(), requested in 0_i64..5_000) {
            prop_assert_eq!(allocate(&batches, requested), allocate(&batches, requested));
        }
    }
}
