//! Query filters for the availability and dispatch listing endpoints.
//!
//! Unset filters are omitted from the query string entirely rather than sent
//! empty.

use chrono::NaiveDate;

use lotdispatch_core::{ProductCode, ServiceId};

/// Optional filters for the availability catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityFilter {
    pub product_code: Option<ProductCode>,
    pub batch: Option<String>,
    pub presentation: Option<String>,
}

impl AvailabilityFilter {
    /// Restrict to one product.
    #[must_use]
    pub const fn product(code: ProductCode) -> Self {
        Self {
            product_code: Some(code),
            batch: None,
            presentation: None,
        }
    }

    /// Query-string pairs for the set filters.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(code) = self.product_code {
            pairs.push(("product_code", code.to_string()));
        }
        push_text(&mut pairs, "batch", self.batch.as_deref());
        push_text(&mut pairs, "presentation", self.presentation.as_deref());
        pairs
    }
}

/// Optional filters for the dispatch listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchFilters {
    pub search: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub service_id: Option<ServiceId>,
}

impl DispatchFilters {
    /// Query-string pairs for the set filters.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "search", self.search.as_deref());
        if let Some(from) = self.date_from {
            pairs.push(("date_from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.date_to {
            pairs.push(("date_to", to.format("%Y-%m-%d").to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(service) = self.service_id {
            pairs.push(("service_id", service.to_string()));
        }
        pairs
    }
}

/// Blank text counts as unset.
fn push_text(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim)
        && !value.is_empty()
    {
        pairs.push((key, value.to_string()));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters_produce_no_pairs() {
        assert!(AvailabilityFilter::default().to_query().is_empty());
        assert!(DispatchFilters::default().to_query().is_empty());
    }

    #[test]
    fn test_availability_filter_pairs() {
        let filter = AvailabilityFilter {
            batch: Some("L-22".to_string()),
            ..AvailabilityFilter::product(ProductCode::new(15))
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("product_code", "15".to_string()),
                ("batch", "L-22".to_string())
            ]
        );
    }

    #[test]
    fn test_dispatch_filters_pairs() {
        let filters = DispatchFilters {
            search: Some("  ".to_string()),
            date_from: NaiveDate::from_ymd_opt(2026, 1, 5),
            page: Some(2),
            service_id: Some(ServiceId::new(4)),
            ..DispatchFilters::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("date_from", "2026-01-05".to_string()),
                ("page", "2".to_string()),
                ("service_id", "4".to_string()),
            ]
        );
    }
}
