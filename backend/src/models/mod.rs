//! Database models for the Warehouse Inventory Platform
//!
//! Re-exports request models from the shared crate; row types live with
//! the services that own them.

pub use shared::models::*;
