//! Pending dispatch cart.
//!
//! Holds at most one [`CartItem`] per product. Every item satisfies
//! `0 < requested_qty <= total_stock`, where `total_stock` is the snapshot
//! taken when the product was selected; operations that would break this are
//! rejected with a [`DispatchWarning`] and leave the cart untouched, and
//! quantity edits that clamp to zero remove the item.
//!
//! The cart owns the [`AllocationCache`] so every mutation of an item drops
//! that product's memoized forecast.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::allocation::{AllocationCache, ConsumptionPlan};
use crate::models::{LineItem, Product};
use crate::types::{ProductCode, line_total};
use crate::warning::DispatchWarning;

/// A requested quantity of one product, with the product snapshot it was
/// validated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product code.
    pub product_code: ProductCode,
    /// Requested units (always > 0).
    pub requested_qty: i64,
    /// Product name at selection time.
    pub name: String,
    /// Product characteristics at selection time.
    pub features: String,
    /// Product presentation at selection time.
    pub presentation: String,
    /// Unit of measure at selection time.
    pub unit: String,
    /// Stock ceiling captured at selection time.
    pub total_stock: i64,
    /// Weighted average unit price captured at selection time.
    pub average_unit_price: Decimal,
}

impl CartItem {
    fn snapshot(product: &Product, requested_qty: i64) -> Self {
        Self {
            product_code: product.code,
            requested_qty,
            name: product.name.clone(),
            features: product.features.clone(),
            presentation: product.presentation.clone(),
            unit: product.unit.clone(),
            total_stock: product.total_stock,
            average_unit_price: product.average_unit_price(),
        }
    }

    /// Estimated value of this item.
    #[must_use]
    pub fn estimated_value(&self) -> Decimal {
        line_total(self.requested_qty, self.average_unit_price)
    }
}

/// The in-progress set of per-product requests.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    plans: AllocationCache,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `qty` units of `product`, merging with an existing item.
    ///
    /// # Errors
    ///
    /// Returns `DispatchWarning::NonPositiveQuantity` if `qty <= 0`, or
    /// `DispatchWarning::ExceedsRemaining` with the addable remainder if the
    /// combined quantity would exceed the product's stock.
    #[instrument(skip(self, product), fields(product = %product.code))]
    pub fn add(&mut self, product: &Product, qty: i64) -> Result<(), DispatchWarning> {
        if qty <= 0 {
            debug!(qty, "rejected non-positive quantity");
            return Err(DispatchWarning::NonPositiveQuantity);
        }

        let remaining = self.remaining_addable(product);
        if qty > remaining {
            debug!(qty, remaining, "rejected quantity over remaining stock");
            return Err(DispatchWarning::ExceedsRemaining {
                product: product.name.clone(),
                remaining,
            });
        }

        let combined = self.requested_qty(product.code) + qty;
        let item = CartItem::snapshot(product, combined);
        match self.position(product.code) {
            Some(index) => {
                if let Some(slot) = self.items.get_mut(index) {
                    *slot = item;
                }
            }
            None => self.items.push(item),
        }
        self.plans.invalidate(product.code);

        debug!(requested_qty = combined, "cart item updated");
        Ok(())
    }

    /// Set the requested quantity from raw numeric input.
    ///
    /// The value is truncated to an integer and clamped into
    /// `[0, total_stock]`; a result of zero removes the item. Non-finite input
    /// counts as zero.
    ///
    /// # Errors
    ///
    /// Returns `DispatchWarning::NotInCart` if the product has no item.
    #[instrument(skip(self))]
    pub fn set_quantity(&mut self, code: ProductCode, qty: f64) -> Result<(), DispatchWarning> {
        let index = self
            .position(code)
            .ok_or(DispatchWarning::NotInCart(code))?;
        let Some(item) = self.items.get_mut(index) else {
            return Err(DispatchWarning::NotInCart(code));
        };

        let clamped = clamp_quantity(qty, item.total_stock);
        if clamped == 0 {
            self.items.remove(index);
            debug!("quantity clamped to zero, item removed");
        } else {
            item.requested_qty = clamped;
            debug!(requested_qty = clamped, "quantity set");
        }
        self.plans.invalidate(code);
        Ok(())
    }

    /// Remove the item for `code`. Returns whether an item was removed.
    pub fn remove(&mut self, code: ProductCode) -> bool {
        self.plans.invalidate(code);
        let before = self.items.len();
        self.items.retain(|item| item.product_code != code);
        let removed = self.items.len() != before;
        if removed {
            debug!(product = %code, "cart item removed");
        }
        removed
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.plans.invalidate_all();
    }

    /// Drop every memoized forecast; call whenever the catalog is refreshed.
    pub fn catalog_refreshed(&self) {
        self.plans.invalidate_all();
    }

    /// Forecast for `product` at its requested quantity, or `None` when the
    /// product is not in the cart.
    ///
    /// `product` must come from the current catalog snapshot.
    #[must_use]
    pub fn forecast(&self, product: &Product) -> Option<Arc<ConsumptionPlan>> {
        let qty = self.item(product.code)?.requested_qty;
        Some(self.plans.plan(product, qty))
    }

    /// The allocation memo owned by this cart.
    #[must_use]
    pub const fn plans(&self) -> &AllocationCache {
        &self.plans
    }

    /// Items in selection order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Item for `code`, if any.
    #[must_use]
    pub fn item(&self, code: ProductCode) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_code == code)
    }

    /// Requested units for `code` (0 when absent).
    #[must_use]
    pub fn requested_qty(&self, code: ProductCode) -> i64 {
        self.item(code).map_or(0, |item| item.requested_qty)
    }

    /// Units of `product` that can still be added.
    #[must_use]
    pub fn remaining_addable(&self, product: &Product) -> i64 {
        (product.total_stock - self.requested_qty(product.code)).max(0)
    }

    /// Sum of requested units.
    #[must_use]
    pub fn total_requested_qty(&self) -> i64 {
        self.items.iter().map(|item| item.requested_qty).sum()
    }

    /// Sum of `requested_qty x average_unit_price`.
    #[must_use]
    pub fn estimated_total_value(&self) -> Decimal {
        self.items.iter().map(CartItem::estimated_value).sum()
    }

    /// Submission lines: `{product_code, qty}` pairs only.
    #[must_use]
    pub fn line_items(&self) -> Vec<LineItem> {
        self.items
            .iter()
            .map(|item| LineItem {
                product_code: item.product_code,
                qty: item.requested_qty,
            })
            .collect()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, code: ProductCode) -> Option<usize> {
        self.items.iter().position(|item| item.product_code == code)
    }
}

/// Truncate raw input and clamp it into `[0, ceiling]`.
#[allow(clippy::cast_possible_truncation)] // Saturating cast after trunc()
pub(crate) fn clamp_quantity(qty: f64, ceiling: i64) -> i64 {
    if !qty.is_finite() {
        return 0;
    }
    (qty.trunc() as i64).clamp(0, ceiling.max(0))
}
