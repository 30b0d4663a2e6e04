//! Core types for lot dispatch.
//!
//! This module provides type-safe wrappers for identifiers and decimal money
//! helpers shared by the catalog, cart and dispatch models.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{line_total, weighted_average};
