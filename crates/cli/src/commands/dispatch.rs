//! Dispatch submission, listing and detail.

use lotdispatch_client::{
    AvailabilityFilter, CatalogService, DispatchFilters, DispatchService, DispatchSubmission,
};
use lotdispatch_core::{DispatchId, DispatchSession, DispatchWarning, ProductCode, ServiceId};

use super::{CommandError, connect};
use crate::output;

/// Parse a `CODE:QTY` item argument.
pub fn parse_item(raw: &str) -> Result<(ProductCode, i64), String> {
    let (code, qty) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected CODE:QTY, got '{raw}'"))?;
    let code = code
        .parse::<ProductCode>()
        .map_err(|e| format!("invalid product code '{code}': {e}"))?;
    let qty = qty
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid quantity '{qty}': {e}"))?;
    Ok((code, qty))
}

/// Build a cart from `items`, show its forecast, and submit it.
pub async fn submit(
    items: &[(ProductCode, i64)],
    service: Option<ServiceId>,
    notes: Option<String>,
) -> Result<(), CommandError> {
    let (config, client) = connect()?;
    let products = client.availability(&AvailabilityFilter::default()).await?;
    let mut session = DispatchSession::new(products.into());

    for &(code, qty) in items {
        let product = session
            .catalog()
            .get(code)
            .cloned()
            .ok_or(DispatchWarning::UnknownProduct(code))?;
        session.cart_mut().add(&product, qty)?;
    }

    for item in session.cart().items() {
        if let Some(product) = session.catalog().get(item.product_code)
            && let Some(plan) = session.forecast(item.product_code)
        {
            output::print_forecast(product, &plan);
        }
    }
    output::print_cart(session.cart());

    let submission = DispatchSubmission::new(client, config);
    let dispatch = submission.submit(session.cart(), service, notes).await?;
    session.cart_mut().clear();

    output::print_dispatch(&dispatch);
    Ok(())
}

/// Print one page of dispatches.
pub async fn list(filters: &DispatchFilters) -> Result<(), CommandError> {
    let (_, client) = connect()?;
    let page = client.list(filters).await?;
    output::print_page(&page);
    Ok(())
}

/// Print a dispatch grouped by product.
pub async fn show(id: DispatchId) -> Result<(), CommandError> {
    let (_, client) = connect()?;
    let dispatch = client.get_by_id(id).await?;
    output::print_dispatch(&dispatch);
    Ok(())
}
