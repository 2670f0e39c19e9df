//! Shared types and models for the Warehouse Inventory Platform
//!
//! This crate contains the API contract types shared between the backend
//! and other components of the system (CLIs, future clients).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
