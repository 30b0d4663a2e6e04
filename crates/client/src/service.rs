//! Service seams between the dispatch workflow and the warehouse backend.
//!
//! [`crate::WarehouseClient`] implements both traits over HTTP; tests plug in
//! in-memory fakes.

use std::future::Future;

use serde::Serialize;

use lotdispatch_core::{Dispatch, DispatchId, DispatchPage, LineItem, Product, ServiceId, UserId};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::query::{AvailabilityFilter, DispatchFilters};
use crate::response::CreateOutcome;

/// Body of a create-dispatch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDispatch {
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<ServiceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<LineItem>,
}

/// Source of the availability catalog.
pub trait CatalogService {
    /// Products with their open batches. Empty when nothing matches.
    fn availability(
        &self,
        filter: &AvailabilityFilter,
    ) -> impl Future<Output = Result<Vec<Product>, ClientError>> + Send;
}

/// Dispatch persistence.
pub trait DispatchService {
    /// One page of dispatches.
    fn list(
        &self,
        filters: &DispatchFilters,
    ) -> impl Future<Output = Result<DispatchPage, ClientError>> + Send;

    /// A dispatch with its detail rows.
    fn get_by_id(
        &self,
        id: DispatchId,
    ) -> impl Future<Output = Result<Dispatch, ClientError>> + Send;

    /// Persist a new dispatch.
    fn create(
        &self,
        payload: &NewDispatch,
    ) -> impl Future<Output = Result<CreateOutcome, ClientError>> + Send;
}

/// The authenticated user, if any.
pub trait UserContext {
    fn current_user(&self) -> Option<UserId>;
}

impl UserContext for Option<UserId> {
    fn current_user(&self) -> Option<UserId> {
        *self
    }
}

impl UserContext for UserId {
    fn current_user(&self) -> Option<UserId> {
        Some(*self)
    }
}

impl UserContext for ClientConfig {
    fn current_user(&self) -> Option<UserId> {
        self.user_id
    }
}
