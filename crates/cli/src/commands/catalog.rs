//! Availability browsing and allocation forecasts.

use lotdispatch_client::{AvailabilityFilter, CatalogService};
use lotdispatch_core::{DispatchSession, DispatchWarning, ProductCode};

use super::{CommandError, connect};
use crate::output;

/// Print the availability catalog.
pub async fn show(filter: &AvailabilityFilter) -> Result<(), CommandError> {
    let (_, client) = connect()?;
    let products = client.availability(filter).await?;
    tracing::info!(products = products.len(), "Fetched availability");
    output::print_catalog(&products);
    Ok(())
}

/// Stage `qty` of a product and print the batches it would draw from.
///
/// The quantity is clamped to the product's stock like an interactive
/// selection would be.
pub async fn forecast(code: ProductCode, qty: f64) -> Result<(), CommandError> {
    let (_, client) = connect()?;
    let products = client
        .availability(&AvailabilityFilter::product(code))
        .await?;

    let mut session = DispatchSession::new(products.into());
    session.open(code)?;
    let accepted = session.set_candidate(qty)?;
    tracing::info!(requested = qty, accepted, "Staged quantity");
    session.confirm()?;

    let product = session
        .catalog()
        .get(code)
        .ok_or(DispatchWarning::UnknownProduct(code))?;
    if let Some(plan) = session.forecast(code) {
        output::print_forecast(product, &plan);
    }
    Ok(())
}
