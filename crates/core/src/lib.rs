//! Lot Dispatch Core - lot-aware dispatch allocation and aggregation.
//!
//! This crate holds the domain logic used by every Lot Dispatch component:
//! - `client` - HTTP access to the availability catalog and dispatch service
//! - `cli` - Operator command-line tool
//!
//! # Architecture
//!
//! The core crate contains only types and synchronous logic - no I/O, no
//! HTTP clients. Network-bound work (catalog fetch, submission) lives in the
//! client crate and feeds plain values into the types here.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs and decimal money helpers
//! - [`models`] - Catalog products/batches and persisted dispatch records
//! - [`allocation`] - Greedy batch consumption forecast and its memo cache
//! - [`cart`] - Pending per-product requests with stock validation
//! - [`selection`] - Pick/quantity/commit state machine
//! - [`session`] - Catalog + cart + selection for one operator session
//! - [`aggregate`] - Per-product grouping of persisted batch-level records
//! - [`warning`] - User-facing validation warnings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aggregate;
pub mod allocation;
pub mod cart;
pub mod models;
pub mod selection;
pub mod session;
pub mod types;
pub mod warning;

pub use aggregate::{grand_total, group};
pub use allocation::{AllocationCache, ConsumptionPlan, ConsumptionPlanEntry, allocate};
pub use cart::{Cart, CartItem};
pub use models::*;
pub use selection::{SelectionState, SelectionWorkflow, Staged};
pub use session::DispatchSession;
pub use types::*;
pub use warning::DispatchWarning;
