//! User-facing validation warnings.
//!
//! Every variant is recoverable: the operation that produced it was aborted
//! without mutating any state, and the message is meant to be shown to the
//! operator as-is.

use thiserror::Error;

use crate::types::ProductCode;

/// A rejected cart, selection or submission request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchWarning {
    /// Requested quantity was zero or negative.
    #[error("Quantity must be greater than zero")]
    NonPositiveQuantity,

    /// Requested quantity would push the product past its available stock.
    #[error("Only {remaining} more unit(s) of {product} can be added")]
    ExceedsRemaining {
        /// Product display name.
        product: String,
        /// Units that can still be added.
        remaining: i64,
    },

    /// The product is already fully requested (or has no stock).
    #[error("No stock left to add for {product}")]
    NothingAddable {
        /// Product display name.
        product: String,
    },

    /// The product is not in the current catalog snapshot.
    #[error("Product {0} is not available")]
    UnknownProduct(ProductCode),

    /// The product has no cart item.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductCode),

    /// A selection action was issued while no product was being edited.
    #[error("No product is being selected")]
    NothingSelected,

    /// Submission attempted with no cart items.
    #[error("Add at least one product before submitting the dispatch")]
    EmptyCart,

    /// Submission attempted with a zero total quantity.
    #[error("The total requested quantity must be greater than zero")]
    ZeroTotal,
}
