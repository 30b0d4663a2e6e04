//! Product selection workflow: pick a product, choose a quantity, then commit
//! it to the cart or cancel.
//!
//! ```text
//!        open (stock left)            confirm (valid)
//!  Idle ──────────────────▶ Choosing ─────────────────▶ Idle
//!   ▲                          │  ▲
//!   └──────── cancel ──────────┘  └── set_candidate (re-clamped)
//! ```
//!
//! There is no terminal state.

use tracing::{debug, instrument};

use crate::cart::{Cart, clamp_quantity};
use crate::models::Product;
use crate::warning::DispatchWarning;

/// A product staged for selection with its candidate quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staged {
    product: Product,
    candidate: i64,
    already_in_cart: i64,
}

impl Staged {
    /// Product being selected.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Candidate quantity.
    #[must_use]
    pub const fn candidate(&self) -> i64 {
        self.candidate
    }

    /// Units of the product already in the cart when selection opened.
    #[must_use]
    pub const fn already_in_cart(&self) -> i64 {
        self.already_in_cart
    }

    /// Highest candidate that still fits in the product's stock.
    #[must_use]
    pub fn ceiling(&self) -> i64 {
        (self.product.total_stock - self.already_in_cart).max(0)
    }
}

/// Selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing is being edited.
    #[default]
    Idle,
    /// A product and candidate quantity are staged.
    Choosing(Staged),
}

/// Pick-quantity-commit state machine.
#[derive(Debug, Clone, Default)]
pub struct SelectionWorkflow {
    state: SelectionState,
}

impl SelectionWorkflow {
    /// Start in `Idle`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Whether a product is staged.
    #[must_use]
    pub const fn is_choosing(&self) -> bool {
        matches!(self.state, SelectionState::Choosing(_))
    }

    /// Staged candidate quantity, if choosing.
    #[must_use]
    pub const fn candidate(&self) -> Option<i64> {
        match &self.state {
            SelectionState::Choosing(staged) => Some(staged.candidate),
            SelectionState::Idle => None,
        }
    }

    /// Stage `product` with a candidate of one unit.
    ///
    /// Opening while another product is staged replaces it.
    ///
    /// # Errors
    ///
    /// Returns `DispatchWarning::NothingAddable` when the cart already holds
    /// the product's whole stock; the state is left unchanged.
    #[instrument(skip(self, product, cart), fields(product = %product.code))]
    pub fn open(&mut self, product: &Product, cart: &Cart) -> Result<(), DispatchWarning> {
        let remaining = cart.remaining_addable(product);
        if remaining <= 0 {
            debug!("nothing left to add");
            return Err(DispatchWarning::NothingAddable {
                product: product.name.clone(),
            });
        }

        self.state = SelectionState::Choosing(Staged {
            product: product.clone(),
            candidate: 1.min(remaining),
            already_in_cart: cart.requested_qty(product.code),
        });
        Ok(())
    }

    /// Edit the candidate quantity.
    ///
    /// The value is truncated and silently clamped into `[0, ceiling]`.
    /// Returns the resulting candidate.
    ///
    /// # Errors
    ///
    /// Returns `DispatchWarning::NothingSelected` while idle.
    pub fn set_candidate(&mut self, qty: f64) -> Result<i64, DispatchWarning> {
        let SelectionState::Choosing(staged) = &mut self.state else {
            return Err(DispatchWarning::NothingSelected);
        };
        staged.candidate = clamp_quantity(qty, staged.ceiling());
        Ok(staged.candidate)
    }

    /// Commit the candidate to `cart` and return to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns `DispatchWarning::NothingSelected` while idle,
    /// `DispatchWarning::NonPositiveQuantity` for a zero candidate, or
    /// `DispatchWarning::ExceedsRemaining` naming the allowed remainder. On
    /// error the workflow stays in `Choosing`.
    #[instrument(skip(self, cart))]
    pub fn confirm(&mut self, cart: &mut Cart) -> Result<(), DispatchWarning> {
        let SelectionState::Choosing(staged) = &self.state else {
            return Err(DispatchWarning::NothingSelected);
        };

        if staged.candidate <= 0 {
            return Err(DispatchWarning::NonPositiveQuantity);
        }

        let in_cart = cart.requested_qty(staged.product.code);
        if staged.candidate + in_cart > staged.product.total_stock {
            return Err(DispatchWarning::ExceedsRemaining {
                product: staged.product.name.clone(),
                remaining: (staged.product.total_stock - in_cart).max(0),
            });
        }

        cart.add(&staged.product, staged.candidate)?;
        debug!(product = %staged.product.code, qty = staged.candidate, "selection committed");
        self.state = SelectionState::Idle;
        Ok(())
    }

    /// Discard the staged product.
    pub fn cancel(&mut self) {
        self.state = SelectionState::Idle;
    }
}
