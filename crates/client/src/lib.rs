//! Lot Dispatch Client - warehouse service access and dispatch submission.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration
//! - [`client`] - `reqwest` client for availability and dispatch endpoints
//! - [`service`] - Traits the workflow depends on, plus the create payload
//! - [`response`] - Envelope unwrapping and create-response normalization
//! - [`query`] - Listing and availability filters
//! - [`submission`] - Cart to persisted dispatch

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod response;
pub mod service;
pub mod submission;

pub use client::WarehouseClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use query::{AvailabilityFilter, DispatchFilters};
pub use response::CreateOutcome;
pub use service::{CatalogService, DispatchService, NewDispatch, UserContext};
pub use submission::DispatchSubmission;
