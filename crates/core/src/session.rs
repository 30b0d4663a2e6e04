//! One operator's dispatch session: catalog snapshot, cart and selection.
//!
//! All state is private to the session and mutated synchronously. Refreshing
//! the catalog goes through [`DispatchSession::refresh_catalog`], which drops
//! every memoized forecast so stale batch lists are never reused.

use std::sync::Arc;

use tracing::info;

use crate::allocation::ConsumptionPlan;
use crate::cart::Cart;
use crate::models::{AvailabilityCatalog, Product};
use crate::selection::SelectionWorkflow;
use crate::types::ProductCode;
use crate::warning::DispatchWarning;

/// Catalog, cart and selection workflow for a single session.
#[derive(Debug, Clone, Default)]
pub struct DispatchSession {
    catalog: AvailabilityCatalog,
    cart: Cart,
    selection: SelectionWorkflow,
}

impl DispatchSession {
    /// Start a session over a catalog snapshot.
    #[must_use]
    pub fn new(catalog: AvailabilityCatalog) -> Self {
        Self {
            catalog,
            cart: Cart::new(),
            selection: SelectionWorkflow::new(),
        }
    }

    /// Replace the catalog snapshot and drop every memoized forecast.
    ///
    /// Cart items keep the stock snapshot they were validated against.
    pub fn refresh_catalog(&mut self, products: Vec<Product>) {
        self.catalog = AvailabilityCatalog::new(products);
        self.cart.catalog_refreshed();
        info!(products = self.catalog.len(), "catalog refreshed");
    }

    /// Current catalog snapshot.
    #[must_use]
    pub const fn catalog(&self) -> &AvailabilityCatalog {
        &self.catalog
    }

    /// The cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Mutable access to the cart, for direct quantity edits.
    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// The selection workflow.
    #[must_use]
    pub const fn selection(&self) -> &SelectionWorkflow {
        &self.selection
    }

    /// Stage a catalog product for selection.
    ///
    /// # Errors
    ///
    /// Returns `DispatchWarning::UnknownProduct` when the code is not in the
    /// catalog, or `DispatchWarning::NothingAddable` when no stock is left.
    pub fn open(&mut self, code: ProductCode) -> Result<(), DispatchWarning> {
        let product = self
            .catalog
            .get(code)
            .ok_or(DispatchWarning::UnknownProduct(code))?;
        self.selection.open(product, &self.cart)
    }

    /// Edit the staged candidate quantity.
    ///
    /// # Errors
    ///
    /// Returns `DispatchWarning::NothingSelected` while idle.
    pub fn set_candidate(&mut self, qty: f64) -> Result<i64, DispatchWarning> {
        self.selection.set_candidate(qty)
    }

    /// Commit the staged candidate to the cart.
    ///
    /// # Errors
    ///
    /// Propagates the workflow's validation warnings.
    pub fn confirm(&mut self) -> Result<(), DispatchWarning> {
        self.selection.confirm(&mut self.cart)
    }

    /// Discard the staged candidate.
    pub fn cancel(&mut self) {
        self.selection.cancel();
    }

    /// Set a cart item's quantity from raw input.
    ///
    /// # Errors
    ///
    /// Returns `DispatchWarning::NotInCart` if the product has no item.
    pub fn set_quantity(&mut self, code: ProductCode, qty: f64) -> Result<(), DispatchWarning> {
        self.cart.set_quantity(code, qty)
    }

    /// Remove a cart item.
    pub fn remove(&mut self, code: ProductCode) -> bool {
        self.cart.remove(code)
    }

    /// Allocation forecast for a cart item against the current catalog.
    ///
    /// `None` when the product is not in the cart or no longer in the catalog.
    #[must_use]
    pub fn forecast(&self, code: ProductCode) -> Option<Arc<ConsumptionPlan>> {
        let product = self.catalog.get(code)?;
        self.cart.forecast(product)
    }
}
