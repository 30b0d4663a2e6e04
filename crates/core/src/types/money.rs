//! Decimal money helpers.
//!
//! Prices travel as `rust_decimal::Decimal` end to end; floating point never
//! touches a monetary value.

use rust_decimal::Decimal;

/// Multiply a unit price by an integer quantity.
#[must_use]
pub fn line_total(qty: i64, unit_price: Decimal) -> Decimal {
    Decimal::from(qty) * unit_price
}

/// Quantity-weighted mean of `(quantity, unit_price)` pairs.
///
/// Returns zero when there are no pairs or the total quantity is not
/// positive. Negative quantities count as zero.
#[must_use]
pub fn weighted_average<I>(pairs: I) -> Decimal
where
    I: IntoIterator<Item = (i64, Decimal)>,
{
    let (total_qty, total_value) = pairs.into_iter().fold(
        (0_i64, Decimal::ZERO),
        |(qty_acc, value_acc), (qty, price)| {
            let qty = qty.max(0);
            (qty_acc.saturating_add(qty), value_acc + line_total(qty, price))
        },
    );

    if total_qty <= 0 {
        return Decimal::ZERO;
    }
    total_value
        .checked_div(Decimal::from(total_qty))
        .unwrap_or(Decimal::ZERO)
}
