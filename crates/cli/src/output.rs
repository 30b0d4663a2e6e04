//! Plain-text tables written to stdout.
//!
//! Logs go to stderr, so stdout stays pipeable.

#![allow(clippy::print_stdout)]

use rust_decimal::Decimal;

use lotdispatch_core::{Cart, ConsumptionPlan, Dispatch, DispatchPage, Product, grand_total, group};

fn money(value: Decimal) -> Decimal {
    value.round_dp(2)
}

fn date_or_dash(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

pub fn print_catalog(products: &[Product]) {
    if products.is_empty() {
        println!("No products available.");
        return;
    }
    for product in products {
        println!(
            "{:>6}  {}  {} {}  stock {} {}  avg {}",
            product.code,
            product.name,
            product.presentation,
            product.features,
            product.total_stock,
            product.unit,
            money(product.average_unit_price())
        );
        for batch in &product.batches {
            println!(
                "        {:<16} exp {:<10}  qty {:>6}  @ {}{}",
                batch.label(),
                date_or_dash(batch.expiry),
                batch.quantity,
                money(batch.unit_price),
                if batch.commitment_letter { "  [commitment letter]" } else { "" }
            );
        }
    }
}

pub fn print_forecast(product: &Product, plan: &ConsumptionPlan) {
    println!("{} ({}) - {} requested", product.name, product.code, plan.requested_qty);
    for entry in &plan.entries {
        println!(
            "  {:<16} exp {:<10}  available {:>6}  take {:>6}  left {:>6}{}",
            entry.batch_label,
            date_or_dash(entry.expiry),
            entry.available_qty,
            entry.allocated_qty,
            entry.remaining_qty,
            if entry.commitment_letter { "  [commitment letter]" } else { "" }
        );
    }
    let shortfall = plan.shortfall();
    if shortfall > 0 {
        println!("  short by {shortfall}");
    }
}

pub fn print_cart(cart: &Cart) {
    println!(
        "Cart: {} product(s), {} unit(s), estimated {}",
        cart.len(),
        cart.total_requested_qty(),
        money(cart.estimated_total_value())
    );
}

pub fn print_page(page: &DispatchPage) {
    for dispatch in &page.records {
        println!(
            "{:>6}  {:<10}  {:<24}  {}",
            dispatch.id,
            date_or_dash(dispatch.date),
            dispatch.service_name.as_deref().unwrap_or("-"),
            dispatch.notes.as_deref().unwrap_or("")
        );
    }
    let p = page.pagination;
    println!("Page {} of {} ({} dispatches)", p.page, p.total_pages, p.total);
}

pub fn print_dispatch(dispatch: &Dispatch) {
    println!(
        "Dispatch {}  {}  {}",
        dispatch.id,
        date_or_dash(dispatch.date),
        dispatch.service_name.as_deref().unwrap_or("-")
    );
    if let Some(notes) = &dispatch.notes {
        println!("Notes: {notes}");
    }

    let summaries = group(&dispatch.details);
    for summary in &summaries {
        println!(
            "{:>6}  {} {} {}  {} {}  {}",
            summary.product_code,
            summary.product_name,
            summary.presentation,
            summary.features,
            summary.total_qty,
            summary.unit,
            money(summary.total_line_value)
        );
        for line in &summary.batch_lines {
            println!(
                "        {:<16} exp {:<10}  qty {:>6}  @ {}  = {}",
                line.batch_label,
                date_or_dash(line.expiry),
                line.qty,
                money(line.unit_price),
                money(line.line_total)
            );
        }
    }

    let (qty, value) = grand_total(&summaries);
    println!("Total: {qty} unit(s), {}", money(value));
}
