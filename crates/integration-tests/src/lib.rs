//! Integration tests for Lot Dispatch.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p lotdispatch-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `dispatch_flow` - session, submission and grouping against an in-memory
//!   warehouse
//! - `warehouse_client` - the HTTP client against a mock server
//!
//! This library holds the shared fixtures.

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use rust_decimal::Decimal;

use lotdispatch_client::{ClientError, CreateOutcome, DispatchFilters, DispatchService, NewDispatch};
use lotdispatch_core::{
    Batch, DetailId, Dispatch, DispatchId, DispatchPage, DispatchRecord, InventoryId, Pagination,
    Product, ProductCode, allocate, line_total,
};

/// Build a product whose batches are `(quantity, unit_price)` pairs, in
/// consumption order. Inventory ids are `code * 100 + position`.
#[must_use]
pub fn product(code: i64, name: &str, batches: &[(i64, Decimal)]) -> Product {
    Product {
        code: ProductCode::new(code),
        name: name.to_string(),
        features: "Sterile".to_string(),
        presentation: "Box".to_string(),
        unit: "u".to_string(),
        total_stock: batches.iter().map(|(qty, _)| qty).sum(),
        batches: batches
            .iter()
            .zip(0_i64..)
            .map(|(&(quantity, unit_price), i)| Batch {
                inventory_id: InventoryId::new(code * 100 + i),
                code: Some(format!("L{code}-{i}")),
                expiry: None,
                quantity,
                unit_price,
                commitment_letter: false,
            })
            .collect(),
    }
}

/// How the in-memory warehouse answers a create request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateReply {
    /// Return the full record.
    Full,
    /// Return only the new id.
    Reference,
    /// Return only the new id, then fail to find it.
    ReferenceThenMissing,
}

/// An in-memory warehouse that debits batches greedily, the same way the
/// forecast predicts.
pub struct InMemoryWarehouse {
    products: Vec<Product>,
    reply: CreateReply,
    dispatches: Mutex<Vec<Dispatch>>,
    next_id: AtomicI64,
    create_calls: AtomicI64,
}

impl InMemoryWarehouse {
    #[must_use]
    pub fn new(products: Vec<Product>, reply: CreateReply) -> Self {
        Self {
            products,
            reply,
            dispatches: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(41),
            create_calls: AtomicI64::new(0),
        }
    }

    /// Number of create requests received.
    #[must_use]
    pub fn create_calls(&self) -> i64 {
        self.create_calls.load(Ordering::SeqCst)
    }

    fn persist(&self, payload: &NewDispatch) -> Dispatch {
        let id = DispatchId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let mut details = Vec::new();

        for item in &payload.items {
            let Some(product) = self.products.iter().find(|p| p.code == item.product_code) else {
                continue;
            };
            for (entry, batch) in allocate(&product.batches, item.qty)
                .into_iter()
                .zip(&product.batches)
            {
                if entry.allocated_qty == 0 {
                    continue;
                }
                let detail_id = DetailId::new(i64::try_from(details.len()).unwrap_or(0) + 1);
                details.push(DispatchRecord {
                    detail_id,
                    inventory_id: entry.inventory_id,
                    product_code: product.code,
                    product_name: product.name.clone(),
                    features: product.features.clone(),
                    presentation: product.presentation.clone(),
                    unit: product.unit.clone(),
                    batch_label: batch.code.clone(),
                    expiry: entry.expiry,
                    qty: entry.allocated_qty,
                    unit_price: batch.unit_price,
                    line_total: line_total(entry.allocated_qty, batch.unit_price),
                });
            }
        }

        Dispatch {
            id,
            date: None,
            service_id: payload.service_id,
            service_name: None,
            notes: payload.notes.clone(),
            user_id: Some(payload.user_id),
            details,
        }
    }
}

impl DispatchService for InMemoryWarehouse {
    async fn list(&self, _filters: &DispatchFilters) -> Result<DispatchPage, ClientError> {
        let records = self
            .dispatches
            .lock()
            .map_err(|_| ClientError::UnexpectedResponse("store poisoned".to_string()))?
            .clone();
        let total = u64::try_from(records.len()).unwrap_or(u64::MAX);
        Ok(DispatchPage {
            records,
            pagination: Pagination {
                page: 1,
                limit: 20,
                total,
                total_pages: 1,
            },
        })
    }

    async fn get_by_id(&self, id: DispatchId) -> Result<Dispatch, ClientError> {
        if self.reply == CreateReply::ReferenceThenMissing {
            return Err(ClientError::Server {
                status: 404,
                message: format!("Dispatch {id} not found"),
            });
        }
        self.dispatches
            .lock()
            .map_err(|_| ClientError::UnexpectedResponse("store poisoned".to_string()))?
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or(ClientError::NoData)
    }

    async fn create(&self, payload: &NewDispatch) -> Result<CreateOutcome, ClientError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let dispatch = self.persist(payload);
        let id = dispatch.id;
        self.dispatches
            .lock()
            .map_err(|_| ClientError::UnexpectedResponse("store poisoned".to_string()))?
            .push(dispatch.clone());

        Ok(match self.reply {
            CreateReply::Full => CreateOutcome::Full(dispatch),
            CreateReply::Reference | CreateReply::ReferenceThenMissing => {
                CreateOutcome::Reference(id)
            }
        })
    }
}
