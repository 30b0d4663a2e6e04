//! Domain models for the availability catalog and persisted dispatches.

pub mod catalog;
pub mod dispatch;

pub use catalog::{AvailabilityCatalog, Batch, NO_BATCH_LABEL, Product};
pub use dispatch::{
    BatchLine, Dispatch, DispatchPage, DispatchRecord, DispatchSummary, LineItem, Pagination,
};
