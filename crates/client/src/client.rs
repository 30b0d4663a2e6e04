//! HTTP client for the warehouse service.
//!
//! # Endpoints
//!
//! - `GET  inventory/availability` - availability catalog
//! - `GET  dispatches` - paginated dispatch listing
//! - `GET  dispatches/{id}` - one dispatch with its detail rows
//! - `POST dispatches` - create a dispatch

use std::sync::Arc;

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use lotdispatch_core::{Dispatch, DispatchId, DispatchPage, Product};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::query::{AvailabilityFilter, DispatchFilters};
use crate::response::{CreateOutcome, Envelope};
use crate::service::{CatalogService, DispatchService, NewDispatch};

/// Warehouse service client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct WarehouseClient {
    inner: Arc<WarehouseClientInner>,
}

struct WarehouseClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
}

impl std::fmt::Debug for WarehouseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarehouseClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl WarehouseClient {
    /// Create a new warehouse client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(WarehouseClientInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ClientError> {
        let mut url = self.inner.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Send a request and unwrap the response envelope.
    async fn execute(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        let request = match &self.inner.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope>(&body)
                .ok()
                .and_then(|envelope| envelope.message);
            tracing::error!(
                status = %status,
                message = message.as_deref().unwrap_or_default(),
                "Warehouse service request failed"
            );
            return Err(ClientError::server(status.as_u16(), message));
        }

        let envelope: Envelope = serde_json::from_str(&body)?;
        envelope.into_data(status.as_u16())
    }
}

impl CatalogService for WarehouseClient {
    #[instrument(skip(self))]
    async fn availability(&self, filter: &AvailabilityFilter) -> Result<Vec<Product>, ClientError> {
        let url = self.endpoint("inventory/availability", &filter.to_query())?;
        let data = match self.execute(self.inner.client.get(url)).await {
            Err(ClientError::NoData) => return Ok(Vec::new()),
            other => other?,
        };
        let products: Vec<Product> = serde_json::from_value(data)?;
        tracing::debug!(products = products.len(), "Fetched availability");
        Ok(products)
    }
}

impl DispatchService for WarehouseClient {
    #[instrument(skip(self))]
    async fn list(&self, filters: &DispatchFilters) -> Result<DispatchPage, ClientError> {
        let url = self.endpoint("dispatches", &filters.to_query())?;
        let data = self.execute(self.inner.client.get(url)).await?;
        Ok(serde_json::from_value(data)?)
    }

    #[instrument(skip(self), fields(dispatch_id = %id))]
    async fn get_by_id(&self, id: DispatchId) -> Result<Dispatch, ClientError> {
        let url = self.endpoint(&format!("dispatches/{id}"), &[])?;
        let data = self.execute(self.inner.client.get(url)).await?;
        Ok(serde_json::from_value(data)?)
    }

    #[instrument(skip(self, payload), fields(items = payload.items.len()))]
    async fn create(&self, payload: &NewDispatch) -> Result<CreateOutcome, ClientError> {
        let url = self.endpoint("dispatches", &[])?;
        let data = self
            .execute(self.inner.client.post(url).json(payload))
            .await?;
        CreateOutcome::from_data(data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use lotdispatch_core::ProductCode;

    fn client() -> WarehouseClient {
        WarehouseClient::new(&ClientConfig::new("http://warehouse.local/api").unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_without_query() {
        let url = client().endpoint("dispatches/42", &[]).unwrap();
        assert_eq!(url.as_str(), "http://warehouse.local/api/dispatches/42");
    }

    #[test]
    fn test_endpoint_encodes_query() {
        let filter = AvailabilityFilter {
            presentation: Some("Box x 100".to_string()),
            ..AvailabilityFilter::product(ProductCode::new(3))
        };
        let url = client()
            .endpoint("inventory/availability", &filter.to_query())
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://warehouse.local/api/inventory/availability?product_code=3&presentation=Box+x+100"
        );
    }

    #[test]
    fn test_debug_omits_token() {
        let config = ClientConfig::new("http://warehouse.local")
            .unwrap()
            .with_token("tok_123456");
        let client = WarehouseClient::new(&config).unwrap();
        assert!(!format!("{client:?}").contains("tok_123456"));
    }
}
